//! Sheet analysis: header band detection, column-range segmentation and the
//! pivot from positional grids to wide coded records.
//!
//! The layouts are the authority on where things sit; detection exists to
//! flag drift between spreadsheet releases before it corrupts a dataset.

use crate::error::EtlError;
use crate::masking::{self, Dimension};
use crate::model::{CellValue, Frame, HeaderPath, LayoutRevision};
use crate::utils::cell_address;
use crate::workbook::SheetGrid;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::warn;

const MAX_BAND_SCAN_ROWS: u32 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBand {
    pub rows: Vec<u32>,
}

/// Scores the leading rows of a sheet and picks a band of up to `max_rows`
/// consecutive header-like rows: mostly text, many distinct labels, few
/// numbers.
pub fn detect_header_band(grid: &SheetGrid, max_rows: usize) -> Option<HeaderBand> {
    let mut candidates = Vec::new();
    let scan_to = grid.rows.min(MAX_BAND_SCAN_ROWS);
    for row in 1..=scan_to {
        let mut text = 0u32;
        let mut numbers = 0u32;
        let mut non_empty = 0u32;
        let mut unique = HashSet::new();
        for col in 1..=grid.cols {
            if let Some(val) = grid.value_at(row, col) {
                non_empty += 1;
                match val {
                    CellValue::Text(s) => {
                        text += 1;
                        unique.insert(s.clone());
                    }
                    CellValue::Number(_) => numbers += 1,
                    CellValue::Bool(_) | CellValue::Date(_) => text += 1,
                    CellValue::Error(_) => {}
                }
            }
        }
        if non_empty == 0 {
            continue;
        }
        let score = text as f32 + unique.len() as f32 * 0.2 - numbers as f32 * 0.3;
        candidates.push((row, score, text, non_empty));
    }

    let header_candidates: Vec<&(u32, f32, u32, u32)> = candidates
        .iter()
        .filter(|(_, _, text, non_empty)| *text >= 1 && *text * 2 >= *non_empty)
        .collect();

    let best = header_candidates.iter().copied().max_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.0.cmp(&a.0))
    })?;

    let start_row = best.0;
    let start_score = best.1;
    let mut rows = vec![start_row];
    while rows.len() < max_rows {
        let next = *rows.last().expect("band never empty") + 1;
        let Some((_, score, text, non_empty)) =
            candidates.iter().find(|(r, _, _, _)| *r == next)
        else {
            break;
        };
        if *text >= 1 && *text * 2 >= *non_empty && *score >= 0.6 * start_score {
            rows.push(next);
        } else {
            break;
        }
    }

    Some(HeaderBand { rows })
}

/// One run of a forward-filled header level: consecutive columns under the
/// same label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRun {
    pub first_col: u32,
    pub last_col: u32,
    pub label: String,
}

/// Header labels of one row across a column range, with merged/blank cells
/// inheriting the label to their left.
pub fn filled_row_labels(
    grid: &SheetGrid,
    row: u32,
    first_col: u32,
    last_col: u32,
) -> Vec<Option<String>> {
    let mut filled = Vec::with_capacity((last_col - first_col + 1) as usize);
    let mut carry: Option<String> = None;
    for col in first_col..=last_col {
        if let Some(label) = grid.label_at(row, col) {
            carry = Some(label);
        }
        filled.push(carry.clone());
    }
    filled
}

pub fn level_runs(labels: &[Option<String>], first_col: u32) -> Vec<LabelRun> {
    let mut runs: Vec<LabelRun> = Vec::new();
    for (offset, label) in labels.iter().enumerate() {
        let col = first_col + offset as u32;
        let Some(label) = label else { continue };
        match runs.last_mut() {
            Some(run) if &run.label == label && run.last_col + 1 == col => {
                run.last_col = col;
            }
            _ => runs.push(LabelRun {
                first_col: col,
                last_col: col,
                label: label.clone(),
            }),
        }
    }
    runs
}

/// Checks the hardcoded band ladder against what the sheet actually prints:
/// the sheet must be wide enough, the level-1 label spans must align with the
/// band boundaries, and (when the layout names a level-1 dimension) each span
/// label must code to the band's category.
pub fn verify_layout(
    grid: &SheetGrid,
    layout: &LayoutRevision,
    dataset: &str,
) -> Result<(), EtlError> {
    let last_col = layout.last_data_col();
    if grid.cols < last_col {
        return Err(EtlError::LayoutMismatch {
            dataset: dataset.to_string(),
            sheet: grid.name.clone(),
            detail: format!(
                "sheet ends at column {} but the layout expects data through column {}",
                grid.cols, last_col
            ),
        });
    }

    let level1_row = layout.header_rows[0];
    let first_col = layout
        .bands
        .iter()
        .map(|b| b.first_col)
        .min()
        .unwrap_or(layout.stub_col + 1);
    let labels = filled_row_labels(grid, level1_row, first_col, last_col);
    let runs = level_runs(&labels, first_col);

    for band in layout.bands {
        let run = runs
            .iter()
            .find(|run| run.first_col <= band.first_col && band.first_col <= run.last_col)
            .ok_or_else(|| EtlError::LayoutMismatch {
                dataset: dataset.to_string(),
                sheet: grid.name.clone(),
                detail: format!(
                    "no level-1 label over {}",
                    cell_address(band.first_col, level1_row)
                ),
            })?;
        if run.first_col != band.first_col || run.last_col != band.last_col {
            return Err(EtlError::LayoutMismatch {
                dataset: dataset.to_string(),
                sheet: grid.name.clone(),
                detail: format!(
                    "label {:?} spans columns {}-{} but the layout band {} covers {}-{}",
                    run.label,
                    run.first_col,
                    run.last_col,
                    band.category,
                    band.first_col,
                    band.last_col
                ),
            });
        }
        if let Some(dim) = layout.level1 {
            let code = masking::require_code(dim, &run.label)?;
            if code != band.category {
                return Err(EtlError::LayoutMismatch {
                    dataset: dataset.to_string(),
                    sheet: grid.name.clone(),
                    detail: format!(
                        "level-1 label {:?} codes to {} but the band at columns {}-{} expects {}",
                        run.label, code, band.first_col, band.last_col, band.category
                    ),
                });
            }
        }
    }

    Ok(())
}

/// Per-column header paths: band category, then the masked level-2/level-3
/// labels the band declares.
pub fn assemble_hierarchy(
    grid: &SheetGrid,
    layout: &LayoutRevision,
    dataset: &str,
) -> Result<Vec<(u32, HeaderPath)>, EtlError> {
    let level2_row = layout.header_rows.get(1).copied();
    let level3_row = layout.header_rows.get(2).copied();

    let mut columns = Vec::new();
    for band in layout.bands {
        let level2_labels = match (band.level2, level2_row) {
            (Some(_), Some(row)) => {
                Some(filled_row_labels(grid, row, band.first_col, band.last_col))
            }
            _ => None,
        };

        for col in band.first_col..=band.last_col {
            let subcategory = match (band.level2, level2_row, level2_labels.as_ref()) {
                (Some(dim), Some(row), Some(labels)) => {
                    let label = labels[(col - band.first_col) as usize].clone().ok_or_else(
                        || EtlError::LayoutMismatch {
                            dataset: dataset.to_string(),
                            sheet: grid.name.clone(),
                            detail: format!("blank level-2 header at {}", cell_address(col, row)),
                        },
                    )?;
                    Some(masking::require_code(dim, &label)?.to_string())
                }
                _ => None,
            };

            let detail = match (band.level3, level3_row) {
                (Some(dim), Some(row)) => {
                    let label =
                        grid.label_at(row, col)
                            .ok_or_else(|| EtlError::LayoutMismatch {
                                dataset: dataset.to_string(),
                                sheet: grid.name.clone(),
                                detail: format!(
                                    "blank level-3 header at {}",
                                    cell_address(col, row)
                                ),
                            })?;
                    Some(masking::require_code(dim, &label)?.to_string())
                }
                _ => None,
            };

            columns.push((
                col,
                HeaderPath {
                    category: band.category.to_string(),
                    subcategory,
                    detail,
                },
            ));
        }
    }

    Ok(columns)
}

/// Pivots the data block into one wide record per codable stub row. Rows
/// whose stub cannot be coded (footnotes, source lines) are skipped and
/// counted; blank separator rows are ignored silently.
pub fn pivot(
    grid: &SheetGrid,
    layout: &LayoutRevision,
    stub_dim: Dimension,
    hierarchy: &[(u32, HeaderPath)],
    dataset: &str,
) -> (Frame, u32) {
    let mut columns = Vec::with_capacity(hierarchy.len() + 1);
    columns.push(stub_dim.to_string());
    columns.extend(hierarchy.iter().map(|(_, path)| path.column_code()));

    let mut frame = Frame::new(dataset, columns);
    let mut skipped = 0u32;

    for row in layout.data_start_row..=grid.rows {
        let stub_label = grid.label_at(row, layout.stub_col);
        let has_values = hierarchy
            .iter()
            .any(|(col, _)| grid.number_at(row, *col).is_some());

        let Some(raw) = stub_label else {
            if has_values {
                skipped += 1;
            }
            continue;
        };

        let Some(code) = masking::stub_code(stub_dim, &raw) else {
            skipped += 1;
            continue;
        };

        let mut record: Vec<Option<CellValue>> = Vec::with_capacity(hierarchy.len() + 1);
        record.push(Some(CellValue::Text(code)));
        for (col, _) in hierarchy {
            record.push(grid.number_at(row, *col).map(CellValue::Number));
        }
        frame.push_row(record);
    }

    (frame, skipped)
}

/// Full per-sheet analysis: drift check, layout verification, hierarchy
/// assembly, pivot.
pub fn parse_sheet(
    grid: &SheetGrid,
    layout: &LayoutRevision,
    stub_dim: Dimension,
    dataset: &str,
) -> Result<(Frame, u32), EtlError> {
    // Band scoring locks onto the densest header rows, so the reliable drift
    // signal is where the band ends: one release inserting a title row moves
    // the first data row, and that is what corrupts a pivot.
    match detect_header_band(grid, layout.header_rows.len()) {
        Some(band) => {
            let detected_end = *band.rows.last().expect("band never empty");
            if detected_end + 1 != layout.data_start_row {
                warn!(
                    dataset,
                    sheet = %grid.name,
                    detected = ?band.rows,
                    layout = ?layout.header_rows,
                    data_start_row = layout.data_start_row,
                    "header band drift against hardcoded layout"
                );
            }
        }
        None => {
            warn!(dataset, sheet = %grid.name, "no header band detected");
        }
    }

    verify_layout(grid, layout, dataset)?;
    let hierarchy = assemble_hierarchy(grid, layout, dataset)?;
    Ok(pivot(grid, layout, stub_dim, &hierarchy, dataset))
}
