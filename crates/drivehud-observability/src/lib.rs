// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! # drivehud-observability
//!
//! Logging initialization shared by every drivehud binary, with per-crate
//! debug flag support.
//!
//! ## Features
//! - `file-logging`: JSON log files in timestamped run folders, with retention

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Known drivehud crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "drivehud",
    "drivehud-config",
    "drivehud-transports",
    "drivehud-scene",
    "drivehud-vision",
    "drivehud-bus",
    "drivehud-runtime",
];

/// Convert a crate name into the target prefix `tracing` records for it
///
/// Targets are module paths, so `drivehud-vision` logs as `drivehud_vision::...`.
pub fn crate_target(crate_name: &str) -> String {
    crate_name.replace('-', "_")
}
