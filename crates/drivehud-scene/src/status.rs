// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Operating status and its transitions
//!
//! Status is derived, never written by event handlers directly: vehicle-state
//! and thermal events run through the two functions below and the result is
//! applied with [`crate::Scene::apply_status`].

use serde::{Deserialize, Serialize};

/// Discrete operating mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Status {
    #[default]
    Stopped,
    Disengaged,
    Engaged,
    Warning,
    Alert,
}

impl Status {
    /// Flat color shown on the idle surface for this status
    pub fn idle_color(self) -> IdleColor {
        match self {
            Status::Stopped => IdleColor::from_rgb(0x07, 0x23, 0x39),
            Status::Disengaged => IdleColor::from_rgb(0x17, 0x33, 0x49),
            Status::Engaged => IdleColor::from_rgb(0x17, 0x86, 0x44),
            Status::Warning => IdleColor::from_rgb(0xDA, 0x6F, 0x25),
            Status::Alert => IdleColor::from_rgb(0xC9, 0x22, 0x31),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Stopped => "stopped",
            Status::Disengaged => "disengaged",
            Status::Engaged => "engaged",
            Status::Warning => "warning",
            Status::Alert => "alert",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert classification carried by vehicle-state events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertStatus {
    #[default]
    Normal,
    UserPrompt,
    Critical,
}

/// Opaque 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl IdleColor {
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `0xRRGGBB`
    pub fn to_hex(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }
}

/// Status after a vehicle-state event
///
/// Alert classification wins over engagement.
pub fn status_after_vehicle_state(alert_status: AlertStatus, engaged: bool) -> Status {
    match alert_status {
        AlertStatus::Critical => Status::Alert,
        AlertStatus::UserPrompt => Status::Warning,
        AlertStatus::Normal if engaged => Status::Engaged,
        AlertStatus::Normal => Status::Disengaged,
    }
}

/// Status after a thermal event
///
/// Not started forces `Stopped`. Starting only lifts `Stopped` to
/// `Disengaged`; an active drive status is left alone.
pub fn status_after_thermal(current: Status, started: bool) -> Status {
    match (started, current) {
        (false, _) => Status::Stopped,
        (true, Status::Stopped) => Status::Disengaged,
        (true, other) => other,
    }
}
