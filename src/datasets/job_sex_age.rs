//! Employed and unemployed persons by sex and age band, quarterly time
//! series (table SJO01).

use super::{DatasetParser, glob_set};
use crate::masking::Dimension;
use crate::model::{ColumnBand, DatasetFamily, LayoutRevision};
use globset::GlobSet;
use once_cell::sync::Lazy;
use regex::Regex;

// Sex spans three age columns each: Total, Males, Females over the bands
// 15-24 / 25-54 / 65+ of each indicator block.
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

// The 2018 release repeated the survey title above the table, pushing the
// header band and the data block one row down. Column ranges are unchanged.
const LAYOUTS: &[LayoutRevision] = &[
    LayoutRevision {
        first_year: 2014,
        last_year: 2017,
        header_rows: &[3, 4, 5],
        stub_col: 1,
        data_start_row: 6,
        level1: Some(Dimension::Indicator),
        bands: BANDS,
    },
    LayoutRevision {
        first_year: 2018,
        last_year: 2025,
        header_rows: &[4, 5, 6],
        stub_col: 1,
        data_start_row: 7,
        level1: Some(Dimension::Indicator),
        bands: BANDS,
    },
];

static GLOBS: Lazy<GlobSet> = Lazy::new(|| glob_set(&["*sjo01*", "*job*sex*age*"]));
static SHEET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)job.*sex.*age|sexage").expect("sheet regex"));

pub struct JobSexAge;

impl DatasetParser for JobSexAge {
    fn id(&self) -> &'static str {
        "lfs-job-sex-age"
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
