//! Employed persons by occupation (ISCO-08 major group) and sex, quarterly
//! time series (table SJO02).

use super::{DatasetParser, glob_set};
use crate::masking::Dimension;
use crate::model::{ColumnBand, DatasetFamily, LayoutRevision};
use globset::GlobSet;
use once_cell::sync::Lazy;
use regex::Regex;

// One level-1 block spanning the whole table: occupation groups on the
// second header row (three sex columns each), sex on the third.
const BANDS_2014: &[ColumnBand] = &[ColumnBand {
    first_col: 2,
    last_col: 31,
    category: "EMP",
    level2: Some(Dimension::Occupation),
    level3: Some(Dimension::Sex),
}];

// The 2020 release inserted a row-number column before the data block; every
// range shifts one column right.
const BANDS_2020: &[ColumnBand] = &[ColumnBand {
    first_col: 3,
    last_col: 32,
    category: "EMP",
    level2: Some(Dimension::Occupation),
    level3: Some(Dimension::Sex),
}];

const LAYOUTS: &[LayoutRevision] = &[
    LayoutRevision {
        first_year: 2014,
        last_year: 2019,
        header_rows: &[3, 4, 5],
        stub_col: 1,
        data_start_row: 6,
        level1: Some(Dimension::Indicator),
        bands: BANDS_2014,
    },
    LayoutRevision {
        first_year: 2020,
        last_year: 2025,
        header_rows: &[3, 4, 5],
        stub_col: 1,
        data_start_row: 6,
        level1: Some(Dimension::Indicator),
        bands: BANDS_2020,
    },
];

static GLOBS: Lazy<GlobSet> = Lazy::new(|| glob_set(&["*sjo02*", "*occup*demo*"]));
static SHEET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)occup.*demo|occupation").expect("sheet regex"));

pub struct OccupDemo;

impl DatasetParser for OccupDemo {
    fn id(&self) -> &'static str {
        "lfs-occup-demo"
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
