// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Unified logging initialization
//!
//! Console output is always enabled. With the `file-logging` feature a
//! timestamped run folder receives a combined JSON log:
//! ```text
//! ./logs/
//!   └── run_20250101_120000/
//!       └── drivehud.log
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;

/// Keeps log writers alive; logs are flushed when this is dropped
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder receiving file logs, if file logging is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Initialize the global subscriber
///
/// # Arguments
/// * `debug_flags` - Per-crate debug flags
/// * `base_level` - Level for everything not named by a flag (e.g. `info`)
/// * `log_dir` - Base directory for file logs; ignored without `file-logging`
/// * `retention_runs` - Keep N most recent run folders (default: 10)
pub fn init_logging(
    debug_flags: &CrateDebugFlags,
    base_level: &str,
    log_dir: Option<PathBuf>,
    retention_runs: Option<usize>,
) -> Result<LoggingGuard> {
    let filter = debug_flags.to_filter_string(base_level);
    let env_filter = EnvFilter::try_new(&filter)
        .with_context(|| format!("Invalid log filter '{}'", filter))?;

    let mut layers = Vec::new();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(debug_flags.any_enabled())
        .with_thread_names(true)
        .with_filter(env_filter.clone())
        .boxed();
    layers.push(console_layer);

    #[cfg(feature = "file-logging")]
    let (file_guard, run_folder) = match log_dir {
        Some(base) => {
            let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
            let run_folder = base.join(format!("run_{}", timestamp));
            std::fs::create_dir_all(&run_folder).with_context(|| {
                format!("Failed to create log directory: {}", run_folder.display())
            })?;
            cleanup_old_runs(&base, retention_runs.unwrap_or(10))?;

            let appender = tracing_appender::rolling::daily(&run_folder, "drivehud.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(env_filter)
                .boxed();
            layers.push(file_layer);
            (Some(guard), Some(run_folder))
        }
        None => (None, None),
    };

    #[cfg(not(feature = "file-logging"))]
    let run_folder: Option<PathBuf> = {
        let _ = (log_dir, retention_runs);
        None
    };

    Registry::default()
        .with(layers)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    Ok(LoggingGuard {
        #[cfg(feature = "file-logging")]
        _file_guard: file_guard,
        log_dir: run_folder,
    })
}

/// Initialize console logging at `info` with the given debug flags
pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    init_logging(debug_flags, "info", None, None)
}

/// Remove all but the newest `keep` run folders
///
/// Run folder names embed a sortable timestamp (`run_YYYYmmdd_HHMMSS`), so
/// lexical order is chronological.
#[cfg(feature = "file-logging")]
fn cleanup_old_runs(base_log_dir: &Path, keep: usize) -> Result<()> {
    let mut runs: Vec<PathBuf> = std::fs::read_dir(base_log_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_dir()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .and_then(|n| n.strip_prefix("run_"))
                    .map(|ts| chrono::NaiveDateTime::parse_from_str(ts, "%Y%m%d_%H%M%S").is_ok())
                    .unwrap_or(false)
        })
        .collect();

    runs.sort();

    if runs.len() > keep {
        let excess = runs.len() - keep;
        for path in runs.iter().take(excess) {
            if let Err(e) = std::fs::remove_dir_all(path) {
                eprintln!(
                    "Warning: Failed to remove old log directory {}: {}",
                    path.display(),
                    e
                );
            }
        }
    }

    Ok(())
}
