// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `drivehud.toml`. Every section has defaults matching the stock vehicle
//! image, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DrivehudConfig {
    pub system: SystemConfig,
    pub endpoints: EndpointsConfig,
    pub timing: TimingConfig,
    pub display: DisplayConfig,
    pub vehicle: VehicleConfig,
}

/// Process-level settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    pub log_level: String,
    /// Directory for rolling log files (only used with `file-logging`)
    pub log_dir: Option<PathBuf>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

/// Fixed local endpoints of the producer processes
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointsConfig {
    /// Unix-domain socket of the frame producer
    pub vision_socket: PathBuf,
    pub vehicle_state: String,
    pub radar_state: String,
    pub calibration_state: String,
    pub model_output: String,
    pub planner_trajectory: String,
    pub thermal_state: String,
    /// Single-byte overlay/bypass control channel
    pub control: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            vision_socket: PathBuf::from("/tmp/vision_socket"),
            vehicle_state: "tcp://127.0.0.1:8007".to_string(),
            radar_state: "tcp://127.0.0.1:8012".to_string(),
            calibration_state: "tcp://127.0.0.1:8019".to_string(),
            model_output: "tcp://127.0.0.1:8009".to_string(),
            planner_trajectory: "tcp://127.0.0.1:8035".to_string(),
            thermal_state: "tcp://127.0.0.1:8005".to_string(),
            control: "tcp://127.0.0.1:8037".to_string(),
        }
    }
}

impl EndpointsConfig {
    /// All pub/sub endpoints with their names, for conflict detection
    pub fn all_pubsub(&self) -> Vec<(&str, &str)> {
        vec![
            ("vehicle_state", self.vehicle_state.as_str()),
            ("radar_state", self.radar_state.as_str()),
            ("calibration_state", self.calibration_state.as_str()),
            ("model_output", self.model_output.as_str()),
            ("planner_trajectory", self.planner_trajectory.as_str()),
            ("thermal_state", self.thermal_state.as_str()),
            ("control", self.control.as_str()),
        ]
    }
}

/// Loop cadences
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Sleep between main ticks
    pub tick_interval_ms: u64,
    /// Flat delay between frame-channel connection attempts
    pub vision_retry_ms: u64,
    /// How long shutdown waits for the ambient-light thread before detaching it
    pub sensor_join_timeout_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 30,
            vision_retry_ms: 100,
            sensor_join_timeout_ms: 500,
        }
    }
}

impl TimingConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn vision_retry(&self) -> Duration {
        Duration::from_millis(self.vision_retry_ms)
    }

    pub fn sensor_join_timeout(&self) -> Duration {
        Duration::from_millis(self.sensor_join_timeout_ms)
    }
}

/// Backlight and ambient-light scaling
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub backlight_path: PathBuf,
    /// Illuminance file polled for ambient light; none means a dark cabin
    pub light_sensor_path: Option<PathBuf>,
    /// Linear gain applied to the raw light reading
    pub light_sensor_gain: f32,
    /// Offset added after the gain; also the initial smoothed value
    pub light_sensor_offset: f32,
    /// Weight of the newest sample in the exponential filter
    pub light_smoothing: f32,
    pub max_brightness: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            backlight_path: PathBuf::from("/sys/class/leds/lcd-backlight/brightness"),
            light_sensor_path: None,
            light_sensor_gain: 1.3,
            light_sensor_offset: 5.0,
            light_smoothing: 0.01,
            max_brightness: 255.0,
        }
    }
}

/// Per-vehicle parameters
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct VehicleConfig {
    pub is_metric: bool,
    /// Passive (no-control) installation
    pub passive: bool,
}
