#![allow(dead_code)]

use elstat_etl::PipelineConfig;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};
use umya_spreadsheet::{self, Spreadsheet, Worksheet};

pub fn write_workbook_to_path<F>(path: &Path, f: F)
where
    F: FnOnce(&mut Spreadsheet),
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create dir");
    }
    let mut book = umya_spreadsheet::new_file();
    f(&mut book);
    umya_spreadsheet::writer::xlsx::write(&book, path).expect("write workbook");
}

pub struct TestWorkspace {
    _tempdir: TempDir,
    root: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let tempdir = tempdir().expect("tempdir");
        let root = tempdir.path().to_path_buf();
        Self {
            _tempdir: tempdir,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn create_workbook<F>(&self, name: &str, f: F) -> PathBuf
    where
        F: FnOnce(&mut Spreadsheet),
    {
        let path = self.path(name);
        write_workbook_to_path(&path, f);
        path
    }

    pub fn config(&self) -> PipelineConfig {
        PipelineConfig {
            assets_root: self.root.clone(),
            prepared_dir: self.root.join("prepared"),
            cache_capacity: 8,
            supported_extensions: vec!["xlsx".to_string()],
            single_workbook: None,
            enabled_datasets: None,
        }
    }

    pub fn config_with<F>(&self, configure: F) -> PipelineConfig
    where
        F: FnOnce(&mut PipelineConfig),
    {
        let mut config = self.config();
        configure(&mut config);
        config
    }
}

pub const SEXES: [&str; 3] = ["Σύνολο", "Άνδρες", "Γυναίκες"];
pub const JOB_AGES: [&str; 3] = ["15-24", "25-54", "65+"];

pub const OCCUPATIONS: [&str; 10] = [
    "Ένοπλες δυνάμεις",
    "Ανώτερα διευθυντικά και διοικητικά στελέχη",
    "Επαγγελματίες",
    "Τεχνικοί και ασκούντες συναφή επαγγέλματα",
    "Υπάλληλοι γραφείου",
    "Απασχολούμενοι στην παροχή υπηρεσιών και πωλητές",
    "Ειδικευμένοι γεωργοί, κτηνοτρόφοι, δασοκόμοι και αλιείς",
    "Ειδικευμένοι τεχνίτες και ασκούντες συναφή επαγγέλματα",
    "Χειριστές βιομηχανικών εγκαταστάσεων, μηχανημάτων και εξοπλισμού",
    "Ανειδίκευτοι εργάτες, χειρώνακτες και μικροεπαγγελματίες",
];

pub const REGIONS: [&str; 13] = [
    "Αττική",
    "Βόρειο Αιγαίο",
    "Νότιο Αιγαίο",
    "Κρήτη",
    "Ανατολική Μακεδονία και Θράκη",
    "Κεντρική Μακεδονία",
    "Δυτική Μακεδονία",
    "Ήπειρος",
    "Θεσσαλία",
    "Ιόνια Νησιά",
    "Δυτική Ελλάδα",
    "Στερεά Ελλάδα",
    "Πελοπόννησος",
];

/// Deterministic fixture value: callers can predict any cell from its period
/// index and column.
pub fn fixture_value(period_idx: usize, col: u32) -> f64 {
    ((period_idx + 1) * 1000 + col as usize) as f64
}

/// Employment by sex and age table. `shift` = 0 builds the pre-2018 layout
/// (headers at rows 3-5), `shift` = 1 the post-2018 one (rows 4-6).
pub fn fill_job_sex_age(sheet: &mut Worksheet, shift: u32, periods: &[&str]) {
    sheet
        .get_cell_mut((1u32, 1u32))
        .set_value("ΕΡΕΥΝΑ ΕΡΓΑΤΙΚΟΥ ΔΥΝΑΜΙΚΟΥ");
    if shift > 0 {
        sheet
            .get_cell_mut((1u32, 2u32))
            .set_value("Απασχολούμενοι και άνεργοι κατά φύλο και ομάδες ηλικιών");
    }

    let level1_row = 3 + shift;
    let level2_row = 4 + shift;
    let level3_row = 5 + shift;
    let data_start = 6 + shift;

    sheet
        .get_cell_mut((2u32, level1_row))
        .set_value("Απασχολούμενοι");
    sheet.get_cell_mut((11u32, level1_row)).set_value("Άνεργοι");

    for block_start in [2u32, 11u32] {
        for (sex_idx, sex) in SEXES.iter().enumerate() {
            let sex_col = block_start + 3 * sex_idx as u32;
            sheet.get_cell_mut((sex_col, level2_row)).set_value(*sex);
            for (age_idx, age) in JOB_AGES.iter().enumerate() {
                let col = sex_col + age_idx as u32;
                sheet.get_cell_mut((col, level3_row)).set_value(*age);
            }
        }
    }

    for (period_idx, period) in periods.iter().enumerate() {
        let row = data_start + period_idx as u32;
        sheet.get_cell_mut((1u32, row)).set_value(*period);
        for col in 2u32..=19 {
            sheet
                .get_cell_mut((col, row))
                .set_value_number(fixture_value(period_idx, col));
        }
    }
}

/// Employed persons by occupation and sex. `first_col` = 2 builds the
/// pre-2020 ranges, 3 the post-2020 ones.
pub fn fill_occup_demo(sheet: &mut Worksheet, first_col: u32, periods: &[&str]) {
    sheet
        .get_cell_mut((1u32, 1u32))
        .set_value("ΕΡΕΥΝΑ ΕΡΓΑΤΙΚΟΥ ΔΥΝΑΜΙΚΟΥ");

    sheet
        .get_cell_mut((first_col, 3u32))
        .set_value("Απασχολούμενοι");
    for (occ_idx, occupation) in OCCUPATIONS.iter().enumerate() {
        let occ_col = first_col + 3 * occ_idx as u32;
        sheet.get_cell_mut((occ_col, 4u32)).set_value(*occupation);
        for (sex_idx, sex) in SEXES.iter().enumerate() {
            let col = occ_col + sex_idx as u32;
            sheet.get_cell_mut((col, 5u32)).set_value(*sex);
        }
    }

    let last_col = first_col + 29;
    for (period_idx, period) in periods.iter().enumerate() {
        let row = 6 + period_idx as u32;
        sheet.get_cell_mut((1u32, row)).set_value(*period);
        for col in first_col..=last_col {
            sheet
                .get_cell_mut((col, row))
                .set_value_number(fixture_value(period_idx, col));
        }
    }
}

/// Employed persons by status and region: three status blocks of thirteen
/// region columns each.
pub fn fill_status_regio(sheet: &mut Worksheet, periods: &[&str]) {
    sheet
        .get_cell_mut((1u32, 1u32))
        .set_value("ΕΡΕΥΝΑ ΕΡΓΑΤΙΚΟΥ ΔΥΝΑΜΙΚΟΥ");

    let statuses = [
        (2u32, "Σύνολο απασχολουμένων"),
        (15u32, "Εργοδότες"),
        (28u32, "Μισθωτοί"),
    ];
    for (block_start, status) in statuses {
        sheet.get_cell_mut((block_start, 3u32)).set_value(status);
        for (region_idx, region) in REGIONS.iter().enumerate() {
            let col = block_start + region_idx as u32;
            sheet.get_cell_mut((col, 4u32)).set_value(*region);
        }
    }

    for (period_idx, period) in periods.iter().enumerate() {
        let row = 5 + period_idx as u32;
        sheet.get_cell_mut((1u32, row)).set_value(*period);
        for col in 2u32..=40 {
            sheet
                .get_cell_mut((col, row))
                .set_value_number(fixture_value(period_idx, col));
        }
    }
}

/// Building activity by region: permits, surface, volume.
pub fn fill_building_activity(sheet: &mut Worksheet) {
    sheet
        .get_cell_mut((1u32, 1u32))
        .set_value("ΟΙΚΟΔΟΜΙΚΗ ΔΡΑΣΤΗΡΙΟΤΗΤΑ");
    sheet.get_cell_mut((2u32, 2u32)).set_value("Άδειες");
    sheet.get_cell_mut((3u32, 2u32)).set_value("Επιφάνεια");
    sheet.get_cell_mut((4u32, 2u32)).set_value("Όγκος");
    sheet.get_cell_mut((2u32, 3u32)).set_value("αριθμός");
    sheet.get_cell_mut((3u32, 3u32)).set_value("χιλ. m²");
    sheet.get_cell_mut((4u32, 3u32)).set_value("χιλ. m³");

    for (region_idx, region) in REGIONS.iter().enumerate() {
        let row = 4 + region_idx as u32;
        sheet.get_cell_mut((1u32, row)).set_value(*region);
        for col in 2u32..=4 {
            sheet
                .get_cell_mut((col, row))
                .set_value_number(fixture_value(region_idx, col));
        }
    }
}
