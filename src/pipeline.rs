//! Library-level orchestration: scan the assets root, run every registered
//! parser that claims a workbook, build the per-year LFS layers, write the
//! prepared outputs and the manifest.
//!
//! A single dataset failing stays a warning plus a report entry; the run
//! keeps going. I/O and configuration failures abort.

use crate::config::PipelineConfig;
use crate::datasets;
use crate::merge;
use crate::model::{
    DatasetOutcome, FailureNote, ParsedDataset, PipelineReport, SourceId, WorkbookDescriptor,
};
use crate::utils::make_short_random_id;
use crate::workbook::{WorkbookContext, scan_workbooks};
use crate::writer;
use anyhow::{Context, Result};
use chrono::Utc;
use lru::LruCache;
use parking_lot::RwLock;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

pub struct PipelineState {
    config: Arc<PipelineConfig>,
    cache: RwLock<LruCache<SourceId, Arc<WorkbookContext>>>,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

impl PipelineState {
    pub fn new(config: Arc<PipelineConfig>) -> Self {
        let capacity = NonZeroUsize::new(config.cache_capacity.max(1)).expect("capacity >= 1");
        Self {
            config,
            cache: RwLock::new(LruCache::new(capacity)),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> Arc<PipelineConfig> {
        self.config.clone()
    }

    pub fn open(&self, descriptor: &WorkbookDescriptor) -> Result<Arc<WorkbookContext>> {
        if let Some(ctx) = self.cache.write().get(&descriptor.source_id) {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(ctx.clone());
        }
        self.cache_misses.fetch_add(1, Ordering::Relaxed);

        let ctx = Arc::new(WorkbookContext::load(Path::new(&descriptor.path))?);
        self.cache
            .write()
            .put(descriptor.source_id.clone(), ctx.clone());
        Ok(ctx)
    }

    pub fn cache_stats(&self) -> (u64, u64) {
        (
            self.cache_hits.load(Ordering::Relaxed),
            self.cache_misses.load(Ordering::Relaxed),
        )
    }
}

pub fn run_pipeline(config: PipelineConfig) -> Result<PipelineReport> {
    let config = Arc::new(config);
    config.ensure_assets_root()?;
    let state = PipelineState::new(config.clone());

    let run_id = make_short_random_id("run", 8);
    info!(
        run_id = %run_id,
        assets = %config.assets_root.display(),
        "starting extraction run"
    );

    let descriptors = scan_workbooks(&config)?;
    if descriptors.is_empty() {
        info!("scan complete: no workbooks discovered");
    } else {
        let sample = descriptors
            .iter()
            .take(3)
            .map(|descriptor| descriptor.slug.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        info!(
            workbook_count = descriptors.len(),
            sample = %sample,
            "scan discovered workbooks"
        );
    }

    let mut parsed: Vec<ParsedDataset> = Vec::new();
    let mut failures: Vec<FailureNote> = Vec::new();

    for descriptor in &descriptors {
        let parsers: Vec<_> = datasets::parsers_for_slug(&descriptor.slug)
            .into_iter()
            .filter(|parser| config.is_dataset_enabled(parser.id()))
            .collect();
        if parsers.is_empty() {
            debug!(slug = %descriptor.slug, "no parser claims workbook");
            continue;
        }

        let ctx = match state.open(descriptor) {
            Ok(ctx) => ctx,
            Err(error) => {
                warn!(slug = %descriptor.slug, ?error, "failed to open workbook; skipping");
                failures.push(FailureNote {
                    dataset: None,
                    source_slug: descriptor.slug.clone(),
                    category: "io".to_string(),
                    error: format!("{:#}", error),
                });
                continue;
            }
        };

        for parser in parsers {
            match parser.parse(&ctx) {
                Ok(dataset) => {
                    info!(
                        dataset = parser.id(),
                        slug = %descriptor.slug,
                        reference_year = dataset.reference_year,
                        rows = dataset.frame.height(),
                        skipped_rows = dataset.skipped_rows,
                        "parsed dataset"
                    );
                    parsed.push(dataset);
                }
                Err(error) => {
                    warn!(
                        dataset = parser.id(),
                        slug = %descriptor.slug,
                        category = error.category(),
                        %error,
                        "dataset failed; skipping"
                    );
                    failures.push(FailureNote {
                        dataset: Some(parser.id().to_string()),
                        source_slug: descriptor.slug.clone(),
                        category: error.category().to_string(),
                        error: error.to_string(),
                    });
                }
            }
        }
    }

    let layers = match merge::lfs_annual_layers(&parsed) {
        Ok(layers) => layers,
        Err(error) => {
            warn!(category = error.category(), %error, "layer merge failed");
            failures.push(FailureNote {
                dataset: None,
                source_slug: String::new(),
                category: error.category().to_string(),
                error: error.to_string(),
            });
            Vec::new()
        }
    };

    let mut outputs = Vec::new();
    for dataset in &parsed {
        let stem = format!("{}_{}", dataset.dataset, dataset.reference_year);
        let path = writer::write_frame(&dataset.frame, &config.prepared_dir, &stem)
            .with_context(|| format!("unable to write prepared output for {}", dataset.dataset))?;
        outputs.push(crate::utils::path_to_forward_slashes(&path));
    }
    for (_, layer) in &layers {
        let path = writer::write_frame(layer, &config.prepared_dir, &layer.name)
            .with_context(|| format!("unable to write layer {}", layer.name))?;
        outputs.push(crate::utils::path_to_forward_slashes(&path));

        match merge::stack_long(layer, &["TIME".to_string()]) {
            Ok(long) => {
                let path = writer::write_frame(&long, &config.prepared_dir, &long.name)
                    .with_context(|| format!("unable to write layer {}", long.name))?;
                outputs.push(crate::utils::path_to_forward_slashes(&path));
            }
            Err(error) => {
                warn!(layer = %layer.name, category = error.category(), %error, "long reshape failed");
                failures.push(FailureNote {
                    dataset: None,
                    source_slug: layer.name.clone(),
                    category: error.category().to_string(),
                    error: error.to_string(),
                });
            }
        }
    }

    let report = PipelineReport {
        run_id: run_id.clone(),
        generated_at: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        workbooks_scanned: descriptors.len(),
        datasets: parsed
            .iter()
            .map(|dataset| DatasetOutcome {
                dataset: dataset.dataset.clone(),
                family: dataset.family,
                source_slug: dataset.source_slug.clone(),
                reference_year: dataset.reference_year,
                rows: dataset.frame.height(),
                columns: dataset.frame.width(),
                skipped_rows: dataset.skipped_rows,
            })
            .collect(),
        layers: layers.iter().map(|(_, layer)| layer.name.clone()).collect(),
        outputs,
        failures,
    };
    writer::write_manifest(&report, &config.prepared_dir)?;

    let (hits, misses) = state.cache_stats();
    info!(
        run_id = %run_id,
        datasets = report.datasets.len(),
        layers = report.layers.len(),
        failures = report.failures.len(),
        cache_hits = hits,
        cache_misses = misses,
        "extraction run complete"
    );

    Ok(report)
}
