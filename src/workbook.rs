use crate::config::PipelineConfig;
use crate::model::{CellValue, SheetKind, SourceId, WorkbookDescriptor};
use crate::utils::{hash_path_metadata, path_to_forward_slashes, system_time_to_datetime};
use ahash::AHashMap;
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use umya_spreadsheet::reader::xlsx;
use umya_spreadsheet::{Spreadsheet, Worksheet};

pub struct WorkbookContext {
    pub id: SourceId,
    pub slug: String,
    pub path: PathBuf,
    pub bytes: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub reference_year: Option<i32>,
    spreadsheet: Arc<RwLock<Spreadsheet>>,
    grid_cache: RwLock<HashMap<String, Arc<SheetGrid>>>,
}

impl WorkbookContext {
    pub fn load(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path)
            .with_context(|| format!("unable to read metadata for {:?}", path))?;
        let slug = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "workbook".to_string());
        let bytes = metadata.len();
        let last_modified = metadata.modified().ok().and_then(system_time_to_datetime);
        let id = SourceId(hash_path_metadata(path, &metadata));
        let reference_year = extract_reference_year(&slug);
        let spreadsheet =
            xlsx::read(path).with_context(|| format!("failed to parse workbook {:?}", path))?;

        Ok(Self {
            id,
            slug,
            path: path.to_path_buf(),
            bytes,
            last_modified,
            reference_year,
            spreadsheet: Arc::new(RwLock::new(spreadsheet)),
            grid_cache: RwLock::new(HashMap::new()),
        })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        let book = self.spreadsheet.read();
        book.get_sheet_collection()
            .iter()
            .map(|sheet| sheet.get_name().to_string())
            .collect()
    }

    pub fn describe(&self) -> WorkbookDescriptor {
        WorkbookDescriptor {
            source_id: self.id.clone(),
            slug: self.slug.clone(),
            path: path_to_forward_slashes(&self.path),
            bytes: self.bytes,
            last_modified: self
                .last_modified
                .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
            reference_year: self.reference_year,
        }
    }

    /// First sheet whose name matches the pattern.
    pub fn find_sheet(&self, pattern: &Regex) -> Option<String> {
        self.sheet_names()
            .into_iter()
            .find(|name| pattern.is_match(name))
    }

    pub fn grid(&self, sheet_name: &str) -> Result<Arc<SheetGrid>> {
        if let Some(entry) = self.grid_cache.read().get(sheet_name) {
            return Ok(entry.clone());
        }

        let mut writer = self.grid_cache.write();
        if let Some(entry) = writer.get(sheet_name) {
            return Ok(entry.clone());
        }

        let book = self.spreadsheet.read();
        let sheet = book
            .get_sheet_by_name(sheet_name)
            .ok_or_else(|| anyhow!("sheet {} not found in {}", sheet_name, self.slug))?;
        let entry = Arc::new(compute_grid(sheet));

        writer.insert(sheet_name.to_string(), entry.clone());
        Ok(entry)
    }
}

/// Sparse positional snapshot of one worksheet. Rows and columns are 1-based,
/// matching the addresses a person reads off the spreadsheet.
pub struct SheetGrid {
    pub name: String,
    pub rows: u32,
    pub cols: u32,
    pub non_empty: u32,
    cells: AHashMap<(u32, u32), CellValue>,
}

impl SheetGrid {
    pub fn from_cells<I>(name: impl Into<String>, cells: I) -> Self
    where
        I: IntoIterator<Item = ((u32, u32), CellValue)>,
    {
        let cells: AHashMap<(u32, u32), CellValue> = cells.into_iter().collect();
        let rows = cells.keys().map(|(r, _)| *r).max().unwrap_or(0);
        let cols = cells.keys().map(|(_, c)| *c).max().unwrap_or(0);
        let non_empty = cells.len() as u32;
        Self {
            name: name.into(),
            rows,
            cols,
            non_empty,
            cells,
        }
    }

    pub fn value_at(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    /// Trimmed display text of a cell; `None` when blank.
    pub fn label_at(&self, row: u32, col: u32) -> Option<String> {
        let label = self.value_at(row, col)?.display_label();
        let trimmed = label.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Numeric reading of a cell, accepting text numbers in the Greek
    /// `1.234,5` convention.
    pub fn number_at(&self, row: u32, col: u32) -> Option<f64> {
        match self.value_at(row, col)? {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => parse_number_text(s),
            _ => None,
        }
    }

    pub fn kind(&self) -> SheetKind {
        if self.non_empty == 0 {
            SheetKind::Empty
        } else if self.rows < 5 || self.cols < 3 {
            SheetKind::Metadata
        } else {
            SheetKind::Data
        }
    }
}

fn parse_number_text(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(n) = trimmed.parse::<f64>() {
        return Some(n);
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | ' ' | '-' | '+'))
    {
        return None;
    }
    let cleaned: String = trimmed
        .chars()
        .filter(|c| !matches!(c, '.' | ' '))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned.parse::<f64>().ok()
}

pub fn cell_to_value(cell: &umya_spreadsheet::Cell) -> Option<CellValue> {
    let raw = cell.get_value();
    if raw.is_empty() {
        return None;
    }
    if let Ok(number) = raw.parse::<f64>() {
        return Some(CellValue::Number(number));
    }

    let lower = raw.to_ascii_lowercase();
    if lower == "true" {
        return Some(CellValue::Bool(true));
    }
    if lower == "false" {
        return Some(CellValue::Bool(false));
    }

    Some(CellValue::Text(raw.to_string()))
}

fn compute_grid(sheet: &Worksheet) -> SheetGrid {
    let mut cells = AHashMap::new();
    for cell in sheet.get_cell_collection() {
        let coord = cell.get_coordinate();
        let row = *coord.get_row_num();
        let col = *coord.get_col_num();
        if let Some(value) = cell_to_value(cell) {
            cells.insert((row, col), value);
        }
    }
    let (max_col, max_row) = sheet.get_highest_column_and_row();
    let non_empty = cells.len() as u32;

    SheetGrid {
        name: sheet.get_name().to_string(),
        rows: max_row,
        cols: max_col,
        non_empty,
        cells,
    }
}

static YEAR_IN_SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(19|20)\d{2}").expect("slug year regex"));

/// Reference year baked into ELSTAT file names, e.g. `A0101_SJO01_TS_AN_2019`.
/// The last four-digit year wins; publication codes precede it.
pub fn extract_reference_year(slug: &str) -> Option<i32> {
    YEAR_IN_SLUG_RE
        .find_iter(slug)
        .last()
        .and_then(|m| m.as_str().parse().ok())
}

pub fn scan_workbooks(config: &PipelineConfig) -> Result<Vec<WorkbookDescriptor>> {
    let mut descriptors = Vec::new();

    if let Some(single) = config.single_workbook() {
        descriptors.push(describe_path(single)?);
        return Ok(descriptors);
    }

    use walkdir::WalkDir;

    for entry in WalkDir::new(&config.assets_root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !has_supported_extension(&config.supported_extensions, path) {
            continue;
        }
        if path.starts_with(&config.prepared_dir) {
            continue;
        }
        descriptors.push(describe_path(path)?);
    }

    descriptors.sort_by(|a, b| a.slug.cmp(&b.slug));

    Ok(descriptors)
}

fn describe_path(path: &Path) -> Result<WorkbookDescriptor> {
    let metadata =
        fs::metadata(path).with_context(|| format!("unable to read metadata for {:?}", path))?;
    let slug = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "workbook".to_string());
    Ok(WorkbookDescriptor {
        source_id: SourceId(hash_path_metadata(path, &metadata)),
        reference_year: extract_reference_year(&slug),
        slug,
        path: path_to_forward_slashes(path),
        bytes: metadata.len(),
        last_modified: metadata
            .modified()
            .ok()
            .and_then(system_time_to_datetime)
            .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
    })
}

fn has_supported_extension(allowed: &[String], path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let lower = ext.to_ascii_lowercase();
            allowed.iter().any(|candidate| candidate == &lower)
        })
        .unwrap_or(false)
}
