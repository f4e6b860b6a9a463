use crate::masking::Dimension;
use serde::{Deserialize, Serialize};

/// Sentinel written for dimension/measure cells a merged table does not carry.
pub const NOT_APPLICABLE: &str = "_Z";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct SourceId(pub String);

impl SourceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Error(String),
    Date(String),
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, CellValue::Text(s) if s == NOT_APPLICABLE)
    }

    /// Render the value the way it reads in the sheet. Whole numbers drop the
    /// fractional part so join keys and stub labels stay stable.
    pub fn display_label(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Bool(b) => b.to_string(),
            CellValue::Error(e) => e.clone(),
            CellValue::Date(d) => d.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkbookDescriptor {
    pub source_id: SourceId,
    pub slug: String,
    pub path: String,
    pub bytes: u64,
    pub last_modified: Option<String>,
    pub reference_year: Option<i32>,
}

/// Coarse sheet triage; parsers only run against `Data` sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetKind {
    Data,
    Metadata,
    Empty,
}

/// Raw header labels for one data column, category level first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPath {
    pub category: String,
    pub subcategory: Option<String>,
    pub detail: Option<String>,
}

impl HeaderPath {
    pub fn column_code(&self) -> String {
        let mut code = self.category.clone();
        if let Some(sub) = &self.subcategory {
            code.push('_');
            code.push_str(sub);
        }
        if let Some(detail) = &self.detail {
            code.push('_');
            code.push_str(detail);
        }
        code
    }
}

/// One fixed column-index range of a spreadsheet revision mapped to a
/// category code. Level-2/3 labels are read from the header band and masked
/// through the named dimensions.
#[derive(Debug, Clone, Copy)]
pub struct ColumnBand {
    pub first_col: u32,
    pub last_col: u32,
    pub category: &'static str,
    pub level2: Option<Dimension>,
    pub level3: Option<Dimension>,
}

impl ColumnBand {
    pub fn width(&self) -> u32 {
        self.last_col.saturating_sub(self.first_col) + 1
    }
}

/// Everything hardcoded about one spreadsheet release: which years it covers,
/// where the header band and the data block sit, and the column-range ladder.
#[derive(Debug, Clone, Copy)]
pub struct LayoutRevision {
    pub first_year: i32,
    pub last_year: i32,
    /// Header band rows, top to bottom; one row per hierarchy level in use.
    pub header_rows: &'static [u32],
    pub stub_col: u32,
    pub data_start_row: u32,
    /// Dimension used to verify the level-1 labels printed over each band.
    pub level1: Option<Dimension>,
    pub bands: &'static [ColumnBand],
}

impl LayoutRevision {
    pub fn applies_to(&self, year: i32) -> bool {
        year >= self.first_year && year <= self.last_year
    }

    pub fn last_data_col(&self) -> u32 {
        self.bands.iter().map(|b| b.last_col).max().unwrap_or(0)
    }
}

/// A named wide table. Rows hold one optional value per column; `None` means
/// the observation is missing in the source, not that it is inapplicable.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<CellValue>>>,
}

impl Frame {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn push_row(&mut self, row: Vec<Option<CellValue>>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetFamily {
    Lfs,
    Construction,
}

impl std::fmt::Display for DatasetFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetFamily::Lfs => write!(f, "lfs"),
            DatasetFamily::Construction => write!(f, "construction"),
        }
    }
}

/// A parsed dataset plus its provenance.
#[derive(Debug, Clone)]
pub struct ParsedDataset {
    pub dataset: String,
    pub family: DatasetFamily,
    pub source: SourceId,
    pub source_slug: String,
    pub reference_year: i32,
    pub frame: Frame,
    pub skipped_rows: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetOutcome {
    pub dataset: String,
    pub family: DatasetFamily,
    pub source_slug: String,
    pub reference_year: i32,
    pub rows: usize,
    pub columns: usize,
    pub skipped_rows: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureNote {
    pub dataset: Option<String>,
    pub source_slug: String,
    pub category: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: String,
    pub generated_at: String,
    pub workbooks_scanned: usize,
    pub datasets: Vec<DatasetOutcome>,
    pub layers: Vec<String>,
    pub outputs: Vec<String>,
    pub failures: Vec<FailureNote>,
}
