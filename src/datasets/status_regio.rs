//! Employed persons by employment status and NUTS-2 region, quarterly time
//! series (table SJO03).

use super::{DatasetParser, glob_set};
use crate::masking::Dimension;
use crate::model::{ColumnBand, DatasetFamily, LayoutRevision};
use globset::GlobSet;
use once_cell::sync::Lazy;
use regex::Regex;

// Thirteen region columns under each status block. Only three status blocks
// survive in the published table; employers and the rest of the
// self-employment split moved to a separate release in 2014.
const BANDS: &[ColumnBand] = &[
    ColumnBand {
        first_col: 2,
        last_col: 14,
        category: "TOT",
        level2: Some(Dimension::Region),
        level3: None,
    },
    ColumnBand {
        first_col: 15,
        last_col: 27,
        category: "EMRS",
        level2: Some(Dimension::Region),
        level3: None,
    },
    ColumnBand {
        first_col: 28,
        last_col: 40,
        category: "SAL",
        level2: Some(Dimension::Region),
        level3: None,
    },
];

const LAYOUTS: &[LayoutRevision] = &[LayoutRevision {
    first_year: 2014,
    last_year: 2025,
    header_rows: &[3, 4],
    stub_col: 1,
    data_start_row: 5,
    level1: Some(Dimension::Status),
    bands: BANDS,
}];

static GLOBS: Lazy<GlobSet> = Lazy::new(|| glob_set(&["*sjo03*", "*status*regio*"]));
static SHEET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)status.*regio|statusregio").expect("sheet regex"));

pub struct StatusRegio;

impl DatasetParser for StatusRegio {
    fn id(&self) -> &'static str {
        "lfs-status-regio"
    }

    fn family(&self) -> DatasetFamily {
        DatasetFamily::Lfs
    }

    fn workbook_globs(&self) -> &GlobSet {
        &GLOBS
    }

    fn sheet_pattern(&self) -> &Regex {
        &SHEET_RE
    }

    fn stub_dimension(&self) -> Dimension {
        Dimension::Time
    }

    fn layouts(&self) -> &'static [LayoutRevision] {
        LAYOUTS
    }
}
