use criterion::{Criterion, black_box, criterion_group, criterion_main};
use elstat_etl::analyzer;
use elstat_etl::masking::Dimension;
use elstat_etl::model::{CellValue, ColumnBand, LayoutRevision};
use elstat_etl::workbook::SheetGrid;

const BANDS: &[ColumnBand] = &[
    ColumnBand {
        first_col: 2,
        last_col: 10,
        category: "EMP",
        level2: Some(Dimension::Sex),
        level3: Some(Dimension::AgeBand),
    },
    ColumnBand {
        first_col: 11,
        last_col: 19,
        category: "UNE",
        level2: Some(Dimension::Sex),
        level3: Some(Dimension::AgeBand),
    },
];

const LAYOUT: LayoutRevision = LayoutRevision {
    first_year: 2014,
    last_year: 2025,
    header_rows: &[3, 4, 5],
    stub_col: 1,
    data_start_row: 6,
    level1: Some(Dimension::Indicator),
    bands: BANDS,
};

fn build_grid(periods: usize) -> SheetGrid {
    let sexes = ["Σύνολο", "Άνδρες", "Γυναίκες"];
    let ages = ["15-24", "25-54", "65+"];

    let mut cells: Vec<((u32, u32), CellValue)> = vec![
        ((1, 1), CellValue::Text("ΕΡΕΥΝΑ ΕΡΓΑΤΙΚΟΥ ΔΥΝΑΜΙΚΟΥ".into())),
        ((3, 2), CellValue::Text("Απασχολούμενοι".into())),
        ((3, 11), CellValue::Text("Άνεργοι".into())),
    ];
    for block_start in [2u32, 11u32] {
        for (sex_idx, sex) in sexes.iter().enumerate() {
            let sex_col = block_start + 3 * sex_idx as u32;
            cells.push(((4, sex_col), CellValue::Text((*sex).into())));
            for (age_idx, age) in ages.iter().enumerate() {
                cells.push(((5, sex_col + age_idx as u32), CellValue::Text((*age).into())));
            }
        }
    }

    for period_idx in 0..periods {
        let row = 6 + period_idx as u32;
        let year = 2000 + (period_idx / 4) as u32;
        let quarter = period_idx % 4 + 1;
        cells.push((
            (row, 1),
            CellValue::Text(format!("Q{} {}", quarter, year)),
        ));
        for col in 2u32..=19 {
            cells.push(((row, col), CellValue::Number((row * 100 + col) as f64)));
        }
    }

    SheetGrid::from_cells("JOB-SexAge", cells)
}

fn bench_parse_sheet(c: &mut Criterion) {
    let grid = build_grid(200);
    c.bench_function("parse_sheet_200_periods", |b| {
        b.iter(|| {
            let parsed =
                analyzer::parse_sheet(black_box(&grid), &LAYOUT, Dimension::Time, "bench")
                    .expect("parse");
            black_box(parsed)
        })
    });
}

fn bench_header_band(c: &mut Criterion) {
    let grid = build_grid(200);
    c.bench_function("detect_header_band", |b| {
        b.iter(|| black_box(analyzer::detect_header_band(black_box(&grid), 3)))
    });
}

criterion_group!(benches, bench_parse_sheet, bench_header_band);
criterion_main!(benches);
