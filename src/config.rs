use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_CACHE_CAPACITY: usize = 5;
const DEFAULT_EXTENSIONS: &[&str] = &["xlsx"];
const DEFAULT_ASSETS_ROOT: &str = "assets";
const DEFAULT_PREPARED_SUBDIR: &str = "prepared";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub assets_root: PathBuf,
    pub prepared_dir: PathBuf,
    pub cache_capacity: usize,
    pub supported_extensions: Vec<String>,
    pub single_workbook: Option<PathBuf>,
    pub enabled_datasets: Option<HashSet<String>>,
}

impl PipelineConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            assets_root: cli_assets_root,
            prepared_dir: cli_prepared_dir,
            cache_capacity: cli_cache_capacity,
            extensions: cli_extensions,
            workbook: cli_single_workbook,
            datasets: cli_datasets,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            assets_root: file_assets_root,
            prepared_dir: file_prepared_dir,
            cache_capacity: file_cache_capacity,
            extensions: file_extensions,
            single_workbook: file_single_workbook,
            datasets: file_datasets,
        } = file_config;

        let single_workbook = cli_single_workbook.or(file_single_workbook);

        let assets_root = cli_assets_root
            .or(file_assets_root)
            .or_else(|| {
                single_workbook.as_ref().and_then(|path| {
                    if path.is_absolute() {
                        path.parent().map(|parent| parent.to_path_buf())
                    } else {
                        None
                    }
                })
            })
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_ROOT));

        let prepared_dir = cli_prepared_dir
            .or(file_prepared_dir)
            .unwrap_or_else(|| assets_root.join(DEFAULT_PREPARED_SUBDIR));

        let cache_capacity = cli_cache_capacity
            .or(file_cache_capacity)
            .unwrap_or(DEFAULT_CACHE_CAPACITY)
            .max(1);

        let supported_extensions = normalize_extensions(cli_extensions.or(file_extensions))?;

        let single_workbook = single_workbook.map(|path| {
            if path.is_absolute() {
                path
            } else {
                assets_root.join(path)
            }
        });
        if let Some(workbook_path) = single_workbook.as_ref() {
            validate_single_workbook(workbook_path, &supported_extensions)?;
        }

        let enabled_datasets = cli_datasets
            .or(file_datasets)
            .map(|datasets| {
                datasets
                    .into_iter()
                    .map(|dataset| dataset.to_ascii_lowercase())
                    .filter(|dataset| !dataset.is_empty())
                    .collect::<HashSet<_>>()
            })
            .filter(|set| !set.is_empty());

        Ok(Self {
            assets_root,
            prepared_dir,
            cache_capacity,
            supported_extensions,
            single_workbook,
            enabled_datasets,
        })
    }

    pub fn ensure_assets_root(&self) -> Result<()> {
        anyhow::ensure!(
            self.assets_root.exists(),
            "assets root {:?} does not exist",
            self.assets_root
        );
        anyhow::ensure!(
            self.assets_root.is_dir(),
            "assets root {:?} is not a directory",
            self.assets_root
        );
        if let Some(workbook) = self.single_workbook.as_ref() {
            anyhow::ensure!(
                workbook.exists(),
                "configured workbook {:?} does not exist",
                workbook
            );
            anyhow::ensure!(
                workbook.is_file(),
                "configured workbook {:?} is not a file",
                workbook
            );
        }
        Ok(())
    }

    pub fn resolve_path<P: AsRef<Path>>(&self, relative: P) -> PathBuf {
        let relative = relative.as_ref();
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            self.assets_root.join(relative)
        }
    }

    pub fn single_workbook(&self) -> Option<&Path> {
        self.single_workbook.as_deref()
    }

    pub fn is_dataset_enabled(&self, dataset: &str) -> bool {
        match &self.enabled_datasets {
            Some(set) => set.contains(&dataset.to_ascii_lowercase()),
            None => true,
        }
    }
}

fn normalize_extensions(raw: Option<Vec<String>>) -> Result<Vec<String>> {
    let mut extensions = raw
        .unwrap_or_else(|| {
            DEFAULT_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect()
        })
        .into_iter()
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect::<Vec<_>>();

    extensions.sort();
    extensions.dedup();

    anyhow::ensure!(
        !extensions.is_empty(),
        "at least one workbook extension must be provided"
    );
    Ok(extensions)
}

fn validate_single_workbook(path: &Path, extensions: &[String]) -> Result<()> {
    anyhow::ensure!(path.exists(), "configured workbook {:?} does not exist", path);
    anyhow::ensure!(path.is_file(), "configured workbook {:?} is not a file", path);
    let allowed = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .map(|ext| extensions.contains(&ext))
        .unwrap_or(false);
    anyhow::ensure!(
        allowed,
        "configured workbook {:?} is outside the allowed extensions {:?}",
        path,
        extensions
    );
    Ok(())
}

#[derive(Parser, Debug, Default, Clone)]
#[command(name = "elstat-etl", about = "ELSTAT workbook extraction pipeline", version)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "ELSTAT_ETL_ASSETS",
        value_name = "DIR",
        help = "Assets root containing downloaded workbooks"
    )]
    pub assets_root: Option<PathBuf>,

    #[arg(
        long,
        env = "ELSTAT_ETL_PREPARED",
        value_name = "DIR",
        help = "Directory for prepared datasets (defaults to <assets>/prepared)"
    )]
    pub prepared_dir: Option<PathBuf>,

    #[arg(
        long,
        env = "ELSTAT_ETL_CACHE_CAPACITY",
        value_name = "N",
        help = "Maximum number of workbooks kept in memory",
        value_parser = clap::value_parser!(usize)
    )]
    pub cache_capacity: Option<usize>,

    #[arg(
        long,
        env = "ELSTAT_ETL_EXTENSIONS",
        value_name = "EXT",
        value_delimiter = ',',
        help = "Comma-separated list of allowed workbook extensions"
    )]
    pub extensions: Option<Vec<String>>,

    #[arg(
        long,
        env = "ELSTAT_ETL_WORKBOOK",
        value_name = "FILE",
        help = "Lock the run to a single workbook path"
    )]
    pub workbook: Option<PathBuf>,

    #[arg(
        long,
        env = "ELSTAT_ETL_DATASETS",
        value_name = "DATASET",
        value_delimiter = ',',
        help = "Restrict the run to the provided dataset ids"
    )]
    pub datasets: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    assets_root: Option<PathBuf>,
    prepared_dir: Option<PathBuf>,
    cache_capacity: Option<usize>,
    extensions: Option<Vec<String>>,
    single_workbook: Option<PathBuf>,
    datasets: Option<Vec<String>>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
