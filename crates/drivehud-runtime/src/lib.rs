// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! # drivehud-runtime
//!
//! Runs the dashboard core on four OS threads:
//!
//! | Thread | Work |
//! |--------|------|
//! | main | tick loop: drain inputs, wake/power, backlight, draw |
//! | `vision-connector` | frame channel connect + subscribe, hand-off |
//! | `light-sensor` | blocking ambient-light reads |
//! | `idle-color` | status-keyed background color |
//!
//! Every loop checks the store's shutdown flag once per iteration.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod headless;
pub mod idle_color;
pub mod light_sensor;
pub mod runtime;
pub mod ui_loop;

pub use headless::{
    DarkSensor, FileLightSensor, HeadlessRenderer, LoggingDisplayPower, LoggingIdleSurface, NoTouch,
};
pub use idle_color::IdleColorSupervisor;
pub use light_sensor::{spawn_light_sensor, SensorHandle, SENSOR_RETRY_DELAY};
pub use runtime::{endpoints, Collaborators, Runtime};
pub use ui_loop::{TickOutputs, UiLoop};
