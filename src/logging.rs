//! Structured logging for extraction runs: JSON lines under a scheduler,
//! pretty output on a developer console, optional daily-rolled files.

use anyhow::{Context, Result};
use std::env;
use std::io;
use std::path::PathBuf;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    File,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub output: LogOutput,
    /// Directory for log files when output is `File`.
    pub log_dir: PathBuf,
    pub log_file_prefix: String,
    pub environment: String,
    pub enable_rotation: bool,
}

fn is_production(environment: &str) -> bool {
    environment == "production" || environment == "prod"
}

fn env_lower(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.to_lowercase())
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("ENV"))
            .unwrap_or_else(|_| "development".to_string());
        let format = if is_production(&environment) {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        };

        Self {
            format,
            output: LogOutput::Stderr,
            log_dir: PathBuf::from("logs"),
            log_file_prefix: "elstat-etl".to_string(),
            environment,
            enable_rotation: true,
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        match env_lower("LOG_FORMAT").as_deref() {
            Some("json") => config.format = LogFormat::Json,
            Some("pretty") => config.format = LogFormat::Pretty,
            _ => {}
        }
        match env_lower("LOG_OUTPUT").as_deref() {
            Some("stdout") => config.output = LogOutput::Stdout,
            Some("stderr") => config.output = LogOutput::Stderr,
            Some("file") => config.output = LogOutput::File,
            _ => {}
        }
        if let Ok(log_dir) = env::var("LOG_DIR") {
            config.log_dir = PathBuf::from(log_dir);
        }

        config
    }

    fn writer(&self) -> Result<(NonBlocking, WorkerGuard)> {
        let pair = match self.output {
            LogOutput::Stdout => tracing_appender::non_blocking(io::stdout()),
            LogOutput::Stderr => tracing_appender::non_blocking(io::stderr()),
            LogOutput::File => {
                std::fs::create_dir_all(&self.log_dir)
                    .context("failed to create log directory")?;
                let appender = if self.enable_rotation {
                    tracing_appender::rolling::daily(&self.log_dir, &self.log_file_prefix)
                } else {
                    tracing_appender::rolling::never(&self.log_dir, &self.log_file_prefix)
                };
                tracing_appender::non_blocking(appender)
            }
        };
        Ok(pair)
    }
}

/// Install the global subscriber. The returned guard must stay alive for the
/// whole run so buffered log lines are flushed.
pub fn init_logging(config: LoggingConfig) -> Result<WorkerGuard> {
    let default_level = if is_production(&config.environment) {
        "info"
    } else {
        "debug"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (writer, guard) = config.writer()?;
    let registry = tracing_subscriber::registry().with(env_filter);
    match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(writer))
            .try_init()
            .context("failed to initialize logging")?,
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(writer))
            .try_init()
            .context("failed to initialize logging")?,
    }

    Ok(guard)
}
