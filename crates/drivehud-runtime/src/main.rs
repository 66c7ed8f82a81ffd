// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use drivehud_config::{
    apply_cli_overrides, apply_environment_overrides, load_config, validate_config, ConfigError,
    DrivehudConfig,
};
use drivehud_observability::{init_logging, parse_debug_flags_from};
use drivehud_runtime::{Collaborators, Runtime};
use tracing::{info, warn};

/// drivehud - telemetry and camera-frame core of the in-vehicle dashboard
#[derive(Parser, Debug)]
#[command(name = "drivehud", version, author, long_about = None)]
struct Args {
    /// Path to drivehud.toml (searched for when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Frame producer socket
    #[arg(long)]
    vision_socket: Option<PathBuf>,

    /// Base log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Milliseconds between ticks
    #[arg(long)]
    tick_interval_ms: Option<u64>,

    /// Backlight brightness file
    #[arg(long)]
    backlight_path: Option<PathBuf>,

    /// Ambient light file (illuminance as text)
    #[arg(long)]
    light_sensor_path: Option<PathBuf>,

    /// Show speeds in km/h
    #[arg(long)]
    metric: bool,

    /// Debug logging for one crate (repeatable), e.g. `--debug drivehud-bus`
    #[arg(long = "debug", value_name = "CRATE")]
    debug: Vec<String>,

    /// Debug logging for every drivehud crate
    #[arg(long)]
    debug_all: bool,
}

impl Args {
    fn overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        if let Some(path) = &self.vision_socket {
            overrides.insert("vision_socket".to_string(), path.display().to_string());
        }
        if let Some(level) = &self.log_level {
            overrides.insert("log_level".to_string(), level.clone());
        }
        if let Some(ms) = self.tick_interval_ms {
            overrides.insert("tick_interval_ms".to_string(), ms.to_string());
        }
        if let Some(path) = &self.backlight_path {
            overrides.insert("backlight_path".to_string(), path.display().to_string());
        }
        if let Some(path) = &self.light_sensor_path {
            overrides.insert("light_sensor_path".to_string(), path.display().to_string());
        }
        if self.metric {
            overrides.insert("is_metric".to_string(), "true".to_string());
        }
        overrides
    }

    fn debug_args(&self) -> Vec<String> {
        let mut args: Vec<String> = self
            .debug
            .iter()
            .map(|name| format!("--debug-{}", name))
            .collect();
        if self.debug_all {
            args.push("--debug-all".to_string());
        }
        args
    }
}

/// Load the configuration; a missing file falls back to defaults
fn load(args: &Args) -> Result<(DrivehudConfig, Option<String>)> {
    let overrides = args.overrides();
    match load_config(args.config.as_deref(), Some(&overrides)) {
        Ok(config) => Ok((config, None)),
        Err(ConfigError::FileNotFound(searched)) if args.config.is_none() => {
            let mut config = DrivehudConfig::default();
            apply_environment_overrides(&mut config);
            apply_cli_overrides(&mut config, &overrides);
            validate_config(&config).context("Invalid configuration overrides")?;
            Ok((config, Some(searched)))
        }
        Err(e) => Err(e).context("Failed to load configuration"),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let (config, missing) = load(&args)?;

    let flags = parse_debug_flags_from(args.debug_args());
    let _logging = init_logging(
        &flags,
        &config.system.log_level,
        config.system.log_dir.clone(),
        None,
    )?;

    if let Some(searched) = missing {
        warn!("[RUNTIME] Using built-in defaults. {}", searched);
    }
    info!("[RUNTIME] drivehud {}", drivehud_runtime::VERSION);
    info!(
        "[RUNTIME] Frame channel: {}",
        config.endpoints.vision_socket.display()
    );

    let collaborators = Collaborators::headless(&config);
    let runtime = Runtime::new(config);

    let store = runtime.store();
    ctrlc::set_handler(move || {
        info!("[RUNTIME] Shutdown signal received");
        store.request_shutdown();
    })
    .context("Failed to install signal handler")?;

    let context = zmq::Context::new();
    let channels = runtime
        .connect_channels(&context)
        .context("Failed to subscribe to telemetry channels")?;

    runtime.run(channels, collaborators)
}
