//! Per-dataset parsers: one module per published table, each carrying the
//! hardcoded layout revisions for the spreadsheet releases it covers. The
//! shared analysis engine does the work; a parser contributes its ladder of
//! column ranges, its slug/sheet patterns and its stub dimension.

use crate::analyzer;
use crate::error::EtlError;
use crate::masking::Dimension;
use crate::model::{DatasetFamily, LayoutRevision, ParsedDataset, SheetKind};
use crate::workbook::WorkbookContext;
use globset::{Glob, GlobSet, GlobSetBuilder};
use once_cell::sync::Lazy;
use regex::Regex;

mod building_activity;
mod job_sex_age;
mod occup_demo;
mod status_regio;

pub use building_activity::BuildingActivity;
pub use job_sex_age::JobSexAge;
pub use occup_demo::OccupDemo;
pub use status_regio::StatusRegio;

pub trait DatasetParser: Send + Sync {
    fn id(&self) -> &'static str;
    fn family(&self) -> DatasetFamily;
    /// Glob patterns matched against lowercased workbook slugs.
    fn workbook_globs(&self) -> &GlobSet;
    fn sheet_pattern(&self) -> &Regex;
    fn stub_dimension(&self) -> Dimension;
    fn layouts(&self) -> &'static [LayoutRevision];

    fn matches_slug(&self, slug: &str) -> bool {
        self.workbook_globs().is_match(slug.to_ascii_lowercase())
    }

    fn layout_for(&self, year: i32) -> Option<&'static LayoutRevision> {
        self.layouts().iter().find(|layout| layout.applies_to(year))
    }

    fn parse(&self, ctx: &WorkbookContext) -> Result<ParsedDataset, EtlError> {
        let year = ctx
            .reference_year
            .ok_or_else(|| EtlError::MissingReferenceYear {
                slug: ctx.slug.clone(),
            })?;
        let layout = self
            .layout_for(year)
            .ok_or_else(|| EtlError::NoLayoutForYear {
                dataset: self.id().to_string(),
                year,
            })?;
        let sheet = ctx
            .find_sheet(self.sheet_pattern())
            .ok_or_else(|| EtlError::SheetNotFound {
                workbook: ctx.slug.clone(),
                pattern: self.sheet_pattern().to_string(),
            })?;
        let grid = ctx
            .grid(&sheet)
            .map_err(|_| EtlError::SheetNotFound {
                workbook: ctx.slug.clone(),
                pattern: self.sheet_pattern().to_string(),
            })?;
        if grid.kind() != SheetKind::Data {
            return Err(EtlError::EmptySheet {
                workbook: ctx.slug.clone(),
                sheet,
            });
        }

        let (frame, skipped_rows) =
            analyzer::parse_sheet(&grid, layout, self.stub_dimension(), self.id())?;
        if frame.height() == 0 {
            return Err(EtlError::EmptySheet {
                workbook: ctx.slug.clone(),
                sheet,
            });
        }

        Ok(ParsedDataset {
            dataset: self.id().to_string(),
            family: self.family(),
            source: ctx.id.clone(),
            source_slug: ctx.slug.clone(),
            reference_year: year,
            frame,
            skipped_rows,
        })
    }
}

pub(crate) fn glob_set(patterns: &[&str]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).expect("dataset glob"));
    }
    builder.build().expect("dataset glob set")
}

static REGISTRY: Lazy<Vec<Box<dyn DatasetParser>>> = Lazy::new(|| {
    vec![
        Box::new(JobSexAge) as Box<dyn DatasetParser>,
        Box::new(OccupDemo),
        Box::new(StatusRegio),
        Box::new(BuildingActivity),
    ]
});

pub fn registry() -> &'static [Box<dyn DatasetParser>] {
    &REGISTRY
}

pub fn parsers_for_slug(slug: &str) -> Vec<&'static dyn DatasetParser> {
    registry()
        .iter()
        .filter(|parser| parser.matches_slug(slug))
        .map(|parser| parser.as_ref())
        .collect()
}
