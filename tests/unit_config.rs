use elstat_etl::config::{CliArgs, PipelineConfig};
use std::path::PathBuf;

mod support;

use support::TestWorkspace;

#[test]
fn defaults_apply_without_args_or_file() {
    let config = PipelineConfig::from_args(CliArgs::default()).expect("config");
    assert_eq!(config.assets_root, PathBuf::from("assets"));
    assert_eq!(config.prepared_dir, PathBuf::from("assets/prepared"));
    assert_eq!(config.cache_capacity, 5);
    assert_eq!(config.supported_extensions, vec!["xlsx".to_string()]);
    assert!(config.single_workbook.is_none());
    assert!(config.is_dataset_enabled("lfs-job-sex-age"));
}

#[test]
fn yaml_file_feeds_missing_values() {
    let workspace = TestWorkspace::new();
    let config_path = workspace.path("pipeline.yaml");
    std::fs::write(
        &config_path,
        "assets_root: /data/elstat\ncache_capacity: 9\ndatasets:\n  - bld-activity\n",
    )
    .expect("write config");

    let args = CliArgs {
        config: Some(config_path),
        ..CliArgs::default()
    };
    let config = PipelineConfig::from_args(args).expect("config");
    assert_eq!(config.assets_root, PathBuf::from("/data/elstat"));
    assert_eq!(config.prepared_dir, PathBuf::from("/data/elstat/prepared"));
    assert_eq!(config.cache_capacity, 9);
    assert!(config.is_dataset_enabled("bld-activity"));
    assert!(!config.is_dataset_enabled("lfs-job-sex-age"));
}

#[test]
fn cli_values_override_file_values() {
    let workspace = TestWorkspace::new();
    let config_path = workspace.path("pipeline.json");
    std::fs::write(
        &config_path,
        r#"{"assets_root": "/data/file", "cache_capacity": 9}"#,
    )
    .expect("write config");

    let args = CliArgs {
        config: Some(config_path),
        assets_root: Some(PathBuf::from("/data/cli")),
        ..CliArgs::default()
    };
    let config = PipelineConfig::from_args(args).expect("config");
    assert_eq!(config.assets_root, PathBuf::from("/data/cli"));
    assert_eq!(config.cache_capacity, 9);
}

#[test]
fn extensions_are_normalized_and_deduped() {
    let args = CliArgs {
        extensions: Some(vec![
            ".XLSX".to_string(),
            "xlsx".to_string(),
            " xls ".to_string(),
            String::new(),
        ]),
        ..CliArgs::default()
    };
    let config = PipelineConfig::from_args(args).expect("config");
    assert_eq!(
        config.supported_extensions,
        vec!["xls".to_string(), "xlsx".to_string()]
    );
}

#[test]
fn blank_extension_list_is_rejected() {
    let args = CliArgs {
        extensions: Some(vec!["  ".to_string()]),
        ..CliArgs::default()
    };
    assert!(PipelineConfig::from_args(args).is_err());
}

#[test]
fn dataset_filter_is_case_insensitive() {
    let args = CliArgs {
        datasets: Some(vec!["LFS-Job-Sex-Age".to_string()]),
        ..CliArgs::default()
    };
    let config = PipelineConfig::from_args(args).expect("config");
    assert!(config.is_dataset_enabled("lfs-job-sex-age"));
    assert!(!config.is_dataset_enabled("lfs-occup-demo"));
}

#[test]
fn single_workbook_must_exist() {
    let args = CliArgs {
        workbook: Some(PathBuf::from("/definitely/not/there.xlsx")),
        ..CliArgs::default()
    };
    assert!(PipelineConfig::from_args(args).is_err());
}

#[test]
fn single_workbook_must_match_extensions() {
    let workspace = TestWorkspace::new();
    let path = workspace.path("notes.txt");
    std::fs::write(&path, b"not a workbook").expect("write");

    let args = CliArgs {
        assets_root: Some(workspace.root().to_path_buf()),
        workbook: Some(path),
        ..CliArgs::default()
    };
    assert!(PipelineConfig::from_args(args).is_err());
}

#[test]
fn single_workbook_resolves_relative_to_assets_root() {
    let workspace = TestWorkspace::new();
    let path = workspace.path("book.xlsx");
    support::write_workbook_to_path(&path, |_| {});

    let args = CliArgs {
        assets_root: Some(workspace.root().to_path_buf()),
        workbook: Some(PathBuf::from("book.xlsx")),
        ..CliArgs::default()
    };
    let config = PipelineConfig::from_args(args).expect("config");
    assert_eq!(config.single_workbook, Some(path));
    config.ensure_assets_root().expect("assets root");
}

#[test]
fn resolve_path_joins_relative_paths() {
    let config = PipelineConfig::from_args(CliArgs {
        assets_root: Some(PathBuf::from("/data/elstat")),
        ..CliArgs::default()
    })
    .expect("config");
    assert_eq!(
        config.resolve_path("lfs/a.xlsx"),
        PathBuf::from("/data/elstat/lfs/a.xlsx")
    );
    assert_eq!(
        config.resolve_path("/abs/a.xlsx"),
        PathBuf::from("/abs/a.xlsx")
    );
}
