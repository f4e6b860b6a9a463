//! Building activity by NUTS-2 region: permits issued, surface and volume
//! (annual construction release A1302).

use super::{DatasetParser, glob_set};
use crate::masking::Dimension;
use crate::model::{ColumnBand, DatasetFamily, LayoutRevision};
use globset::GlobSet;
use once_cell::sync::Lazy;
use regex::Regex;

// Single-column measures; the row under the measure labels carries units
// ("thousand m²" etc.) and is not a dimension.
const BANDS: &[ColumnBand] = &[
    ColumnBand {
        first_col: 2,
        last_col: 2,
        category: "PERM",
        level2: None,
        level3: None,
    },
    ColumnBand {
        first_col: 3,
        last_col: 3,
        category: "SURF",
        level2: None,
        level3: None,
    },
    ColumnBand {
        first_col: 4,
        last_col: 4,
        category: "VOL",
        level2: None,
        level3: None,
    },
];

const LAYOUTS: &[LayoutRevision] = &[LayoutRevision {
    first_year: 2014,
    last_year: 2025,
    header_rows: &[2, 3],
    stub_col: 1,
    data_start_row: 4,
    level1: Some(Dimension::Measure),
    bands: BANDS,
}];

static GLOBS: Lazy<GlobSet> = Lazy::new(|| glob_set(&["*a1302*", "*build*activ*", "*oikodom*"]));
static SHEET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)build|οικοδομ").expect("sheet regex"));

pub struct BuildingActivity;

impl DatasetParser for BuildingActivity {
    fn id(&self) -> &'static str {
        "bld-activity"
    }

    fn family(&self) -> DatasetFamily {
        DatasetFamily::Construction
    }

    fn workbook_globs(&self) -> &GlobSet {
        &GLOBS
    }

    fn sheet_pattern(&self) -> &Regex {
        &SHEET_RE
    }

    fn stub_dimension(&self) -> Dimension {
        Dimension::Region
    }

    fn layouts(&self) -> &'static [LayoutRevision] {
        LAYOUTS
    }
}
