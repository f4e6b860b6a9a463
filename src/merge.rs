//! Merge layer: outer-joins parsed tables on their shared dimension columns
//! and fills every gap with the `_Z` sentinel, the way the published layer
//! tables do.

use crate::error::EtlError;
use crate::model::{CellValue, DatasetFamily, Frame, NOT_APPLICABLE, ParsedDataset};
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashSet};

/// Ordered intersection of column names, first frame's order winning.
pub fn common_columns(frames: &[&Frame]) -> Vec<String> {
    let Some(first) = frames.first() else {
        return Vec::new();
    };
    first
        .columns
        .iter()
        .filter(|column| {
            frames
                .iter()
                .all(|frame| frame.column_index(column).is_some())
        })
        .cloned()
        .collect()
}

/// Full outer join on `on`. Keys keep first-seen order; non-key columns that
/// collide across frames are disambiguated with the owning frame's name.
/// Every cell the join leaves open is filled with the sentinel.
pub fn outer_join(name: &str, frames: &[&Frame], on: &[String]) -> Result<Frame, EtlError> {
    for frame in frames {
        for column in on {
            if frame.column_index(column).is_none() {
                return Err(EtlError::MergeKeyMissing {
                    frame: frame.name.clone(),
                    column: column.clone(),
                });
            }
        }
    }

    let mut columns: Vec<String> = on.to_vec();
    let mut seen: HashSet<String> = on.iter().cloned().collect();
    // (frame index, source column index, output column index)
    let mut mappings: Vec<(usize, usize, usize)> = Vec::new();
    for (frame_idx, frame) in frames.iter().enumerate() {
        for (col_idx, column) in frame.columns.iter().enumerate() {
            if on.contains(column) {
                continue;
            }
            let out_name = if seen.contains(column) {
                format!("{}_{}", column, frame.name)
            } else {
                column.clone()
            };
            seen.insert(out_name.clone());
            mappings.push((frame_idx, col_idx, columns.len()));
            columns.push(out_name);
        }
    }

    let width = columns.len();
    let mut rows: IndexMap<Vec<String>, Vec<Option<CellValue>>> = IndexMap::new();

    for (frame_idx, frame) in frames.iter().enumerate() {
        let key_indices: Vec<usize> = on
            .iter()
            .map(|column| frame.column_index(column).expect("key column validated"))
            .collect();
        let frame_mappings: Vec<(usize, usize)> = mappings
            .iter()
            .filter(|(fi, _, _)| *fi == frame_idx)
            .map(|(_, src, out)| (*src, *out))
            .collect();

        for row in &frame.rows {
            let key: Vec<String> = key_indices
                .iter()
                .map(|idx| {
                    row[*idx]
                        .as_ref()
                        .map(|v| v.display_label())
                        .unwrap_or_else(|| NOT_APPLICABLE.to_string())
                })
                .collect();

            let merged = rows.entry(key.clone()).or_insert_with(|| {
                let mut fresh: Vec<Option<CellValue>> = vec![None; width];
                for (pos, label) in key.iter().enumerate() {
                    fresh[pos] = Some(CellValue::Text(label.clone()));
                }
                fresh
            });

            for (src, out) in &frame_mappings {
                if let Some(value) = &row[*src] {
                    merged[*out] = Some(value.clone());
                }
            }
        }
    }

    let mut out = Frame::new(name, columns);
    for (_, mut row) in rows {
        for cell in row.iter_mut() {
            if cell.is_none() {
                *cell = Some(CellValue::Text(NOT_APPLICABLE.to_string()));
            }
        }
        out.push_row(row);
    }
    Ok(out)
}

/// Wide → long reshape: one `(ids.., SERIES, OBS_VALUE)` row per present,
/// non-sentinel observation.
pub fn stack_long(frame: &Frame, id_columns: &[String]) -> Result<Frame, EtlError> {
    for column in id_columns {
        if frame.column_index(column).is_none() {
            return Err(EtlError::MergeKeyMissing {
                frame: frame.name.clone(),
                column: column.clone(),
            });
        }
    }

    let id_indices: Vec<usize> = id_columns
        .iter()
        .map(|column| frame.column_index(column).expect("id column validated"))
        .collect();

    let mut columns = id_columns.to_vec();
    columns.push("SERIES".to_string());
    columns.push("OBS_VALUE".to_string());
    let mut out = Frame::new(format!("{}_long", frame.name), columns);

    for row in &frame.rows {
        for (idx, column) in frame.columns.iter().enumerate() {
            if id_indices.contains(&idx) {
                continue;
            }
            let Some(value) = &row[idx] else { continue };
            if value.is_sentinel() {
                continue;
            }
            let mut long_row: Vec<Option<CellValue>> = id_indices
                .iter()
                .map(|id_idx| row[*id_idx].clone())
                .collect();
            long_row.push(Some(CellValue::Text(column.clone())));
            long_row.push(Some(value.clone()));
            out.push_row(long_row);
        }
    }

    Ok(out)
}

/// Groups LFS datasets by reference year and outer-joins each year's frames
/// on their common dimension columns into one layer per year.
pub fn lfs_annual_layers(datasets: &[ParsedDataset]) -> Result<Vec<(i32, Frame)>, EtlError> {
    let mut by_year: BTreeMap<i32, Vec<&Frame>> = BTreeMap::new();
    for dataset in datasets {
        if dataset.family != DatasetFamily::Lfs {
            continue;
        }
        by_year
            .entry(dataset.reference_year)
            .or_default()
            .push(&dataset.frame);
    }

    let mut layers = Vec::new();
    for (year, frames) in by_year {
        let on = common_columns(&frames);
        if on.is_empty() {
            return Err(EtlError::MergeKeyMissing {
                frame: frames
                    .first()
                    .map(|f| f.name.clone())
                    .unwrap_or_default(),
                column: "TIME".to_string(),
            });
        }
        let layer = outer_join(&format!("lfs_layer_{}", year), &frames, &on)?;
        layers.push((year, layer));
    }
    Ok(layers)
}
