//! Error taxonomy for the extraction pipeline.
//!
//! Parse-level failures are expressed as typed variants so the pipeline can
//! categorize them in logs and in the run report; I/O and configuration
//! failures propagate with `anyhow` context at the edges.

use crate::masking::Dimension;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EtlError {
    #[error("no sheet in {workbook} matches pattern {pattern}")]
    SheetNotFound { workbook: String, pattern: String },

    #[error("sheet {sheet} in {workbook} holds no tabular data")]
    EmptySheet { workbook: String, sheet: String },

    #[error("layout mismatch for {dataset} on sheet {sheet}: {detail}")]
    LayoutMismatch {
        dataset: String,
        sheet: String,
        detail: String,
    },

    #[error("no header band found on sheet {sheet}")]
    HeaderBandNotFound { sheet: String },

    #[error("unknown {dimension} label {label:?}")]
    UnknownLabel { dimension: Dimension, label: String },

    #[error("{dataset} has no layout revision covering reference year {year}")]
    NoLayoutForYear { dataset: String, year: i32 },

    #[error("cannot derive a reference year from workbook slug {slug:?}")]
    MissingReferenceYear { slug: String },

    #[error("join column {column} missing from frame {frame}")]
    MergeKeyMissing { frame: String, column: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EtlError {
    /// Coarse category used as a structured log field and in report entries.
    pub fn category(&self) -> &'static str {
        match self {
            EtlError::SheetNotFound { .. }
            | EtlError::EmptySheet { .. }
            | EtlError::MissingReferenceYear { .. } => "discovery",
            EtlError::LayoutMismatch { .. }
            | EtlError::HeaderBandNotFound { .. }
            | EtlError::NoLayoutForYear { .. } => "layout",
            EtlError::UnknownLabel { .. } => "masking",
            EtlError::MergeKeyMissing { .. } => "merge",
            EtlError::Io(_) => "io",
        }
    }
}
