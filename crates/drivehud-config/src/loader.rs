// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{validate_config, ConfigError, ConfigResult, DrivehudConfig, CONFIG_FILE_NAME};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Find the drivehud configuration file
///
/// Search order:
/// 1. `DRIVEHUD_CONFIG_PATH` environment variable
/// 2. Current working directory: `./drivehud.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("DRIVEHUD_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by DRIVEHUD_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();

    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd;
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent.to_path_buf();
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet DRIVEHUD_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found, contains invalid TOML, or fails validation
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<DrivehudConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: DrivehudConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    validate_config(&config)?;
    Ok(config)
}

fn parse_flag(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `DRIVEHUD_LOG_LEVEL` -> `system.log_level`
/// - `DRIVEHUD_LOG_DIR` -> `system.log_dir`
/// - `DRIVEHUD_VISION_SOCKET` -> `endpoints.vision_socket`
/// - `DRIVEHUD_TICK_INTERVAL_MS` -> `timing.tick_interval_ms`
/// - `DRIVEHUD_VISION_RETRY_MS` -> `timing.vision_retry_ms`
/// - `DRIVEHUD_BACKLIGHT_PATH` -> `display.backlight_path`
/// - `DRIVEHUD_LIGHT_SENSOR_PATH` -> `display.light_sensor_path`
/// - `DRIVEHUD_IS_METRIC` -> `vehicle.is_metric`
/// - `DRIVEHUD_PASSIVE` -> `vehicle.passive`
pub fn apply_environment_overrides(config: &mut DrivehudConfig) {
    if let Ok(value) = env::var("DRIVEHUD_LOG_LEVEL") {
        config.system.log_level = value;
    }
    if let Ok(value) = env::var("DRIVEHUD_LOG_DIR") {
        config.system.log_dir = Some(PathBuf::from(value));
    }

    if let Ok(value) = env::var("DRIVEHUD_VISION_SOCKET") {
        config.endpoints.vision_socket = PathBuf::from(value);
    }

    if let Ok(value) = env::var("DRIVEHUD_TICK_INTERVAL_MS") {
        if let Ok(ms) = value.parse::<u64>() {
            config.timing.tick_interval_ms = ms;
        }
    }
    if let Ok(value) = env::var("DRIVEHUD_VISION_RETRY_MS") {
        if let Ok(ms) = value.parse::<u64>() {
            config.timing.vision_retry_ms = ms;
        }
    }

    if let Ok(value) = env::var("DRIVEHUD_BACKLIGHT_PATH") {
        config.display.backlight_path = PathBuf::from(value);
    }
    if let Ok(value) = env::var("DRIVEHUD_LIGHT_SENSOR_PATH") {
        config.display.light_sensor_path = Some(PathBuf::from(value));
    }

    if let Ok(value) = env::var("DRIVEHUD_IS_METRIC") {
        config.vehicle.is_metric = parse_flag(&value);
    }
    if let Ok(value) = env::var("DRIVEHUD_PASSIVE") {
        config.vehicle.passive = parse_flag(&value);
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Map of CLI arguments (e.g., `{"vision_socket": "/tmp/v", "tick_interval_ms": "50"}`)
pub fn apply_cli_overrides(config: &mut DrivehudConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("log_level") {
        config.system.log_level = value.clone();
    }
    if let Some(value) = cli_args.get("vision_socket") {
        config.endpoints.vision_socket = PathBuf::from(value);
    }
    if let Some(value) = cli_args.get("tick_interval_ms") {
        if let Ok(ms) = value.parse::<u64>() {
            config.timing.tick_interval_ms = ms;
        }
    }
    if let Some(value) = cli_args.get("vision_retry_ms") {
        if let Ok(ms) = value.parse::<u64>() {
            config.timing.vision_retry_ms = ms;
        }
    }
    if let Some(value) = cli_args.get("backlight_path") {
        config.display.backlight_path = PathBuf::from(value);
    }
    if let Some(value) = cli_args.get("light_sensor_path") {
        config.display.light_sensor_path = Some(PathBuf::from(value));
    }
    if let Some(value) = cli_args.get("is_metric") {
        config.vehicle.is_metric = parse_flag(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom.toml");
        File::create(&config_path).unwrap();

        env::set_var("DRIVEHUD_CONFIG_PATH", config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("DRIVEHUD_CONFIG_PATH");

        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_find_config_file_env_var_missing() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        env::set_var("DRIVEHUD_CONFIG_PATH", "/nonexistent/drivehud.toml");
        let result = find_config_file();
        env::remove_var("DRIVEHUD_CONFIG_PATH");

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_minimal_config() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        env::remove_var("DRIVEHUD_TICK_INTERVAL_MS");
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[timing]").unwrap();
        writeln!(file, "tick_interval_ms = 50").unwrap();
        writeln!(file, "[vehicle]").unwrap();
        writeln!(file, "is_metric = true").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();

        assert_eq!(config.timing.tick_interval_ms, 50);
        assert_eq!(config.timing.vision_retry_ms, 100);
        assert!(config.vehicle.is_metric);
        assert_eq!(config.endpoints.vehicle_state, "tcp://127.0.0.1:8007");
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&config_path, "[timing\ntick_interval_ms = ").unwrap();

        let result = load_config(Some(&config_path), None);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = DrivehudConfig::default();

        env::set_var("DRIVEHUD_VISION_SOCKET", "/run/vision.sock");
        env::set_var("DRIVEHUD_IS_METRIC", "yes");
        env::set_var("DRIVEHUD_LIGHT_SENSOR_PATH", "/sys/bus/iio/devices/iio:device0/in_illuminance_input");

        apply_environment_overrides(&mut config);

        env::remove_var("DRIVEHUD_VISION_SOCKET");
        env::remove_var("DRIVEHUD_IS_METRIC");
        env::remove_var("DRIVEHUD_LIGHT_SENSOR_PATH");

        assert_eq!(config.endpoints.vision_socket, PathBuf::from("/run/vision.sock"));
        assert!(config.vehicle.is_metric);
        assert!(config
            .display
            .light_sensor_path
            .as_deref()
            .is_some_and(|p| p.ends_with("in_illuminance_input")));
    }

    #[test]
    fn test_override_precedence() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[timing]").unwrap();
        writeln!(file, "tick_interval_ms = 40").unwrap();
        writeln!(file, "vision_retry_ms = 100").unwrap();

        env::set_var("DRIVEHUD_TICK_INTERVAL_MS", "45");
        env::set_var("DRIVEHUD_VISION_RETRY_MS", "250");

        let mut cli_args = HashMap::new();
        cli_args.insert("tick_interval_ms".to_string(), "20".to_string());

        let config = load_config(Some(&config_path), Some(&cli_args)).unwrap();

        env::remove_var("DRIVEHUD_TICK_INTERVAL_MS");
        env::remove_var("DRIVEHUD_VISION_RETRY_MS");

        // CLI wins for tick interval, env wins for retry (no CLI override)
        assert_eq!(config.timing.tick_interval_ms, 20);
        assert_eq!(config.timing.vision_retry_ms, 250);
    }
}
