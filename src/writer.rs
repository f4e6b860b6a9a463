//! Prepared-output writer: wide frames to clean xlsx workbooks, plus the JSON
//! run manifest. Files are staged through a temp file in the target
//! directory and renamed into place.

use crate::model::{CellValue, Frame, PipelineReport};
use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};

pub fn write_frame(frame: &Frame, dir: &Path, file_stem: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("unable to create {:?}", dir))?;

    let mut book = umya_spreadsheet::new_file();
    let sheet = book
        .get_sheet_by_name_mut("Sheet1")
        .ok_or_else(|| anyhow!("fresh workbook is missing its default sheet"))?;

    for (idx, column) in frame.columns.iter().enumerate() {
        sheet
            .get_cell_mut((idx as u32 + 1, 1u32))
            .set_value(column);
    }
    for (row_idx, row) in frame.rows.iter().enumerate() {
        let row_num = row_idx as u32 + 2;
        for (col_idx, cell) in row.iter().enumerate() {
            let col_num = col_idx as u32 + 1;
            match cell {
                Some(CellValue::Number(n)) => {
                    sheet.get_cell_mut((col_num, row_num)).set_value_number(*n);
                }
                Some(value) => {
                    sheet
                        .get_cell_mut((col_num, row_num))
                        .set_value(value.display_label());
                }
                None => {}
            }
        }
    }

    let staged = tempfile::Builder::new()
        .prefix(".stage-")
        .suffix(".xlsx")
        .tempfile_in(dir)
        .with_context(|| format!("unable to stage output in {:?}", dir))?;
    umya_spreadsheet::writer::xlsx::write(&book, staged.path())?;

    let path = dir.join(format!("{}.xlsx", file_stem));
    staged
        .persist(&path)
        .with_context(|| format!("unable to move staged output to {:?}", path))?;
    Ok(path)
}

pub fn write_manifest(report: &PipelineReport, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("unable to create {:?}", dir))?;
    let path = dir.join("manifest.json");
    let json = serde_json::to_string_pretty(report).context("unable to serialize manifest")?;
    fs::write(&path, json).with_context(|| format!("unable to write {:?}", path))?;
    Ok(path)
}
