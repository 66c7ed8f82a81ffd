// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Screen wake countdown

/// Ticks of inactivity before the display sleeps (30 s at 30 ticks/s)
pub const WAKE_TIMEOUT_TICKS: u32 = 900;

/// Display power edge to forward to [`crate::DisplayPower`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerTransition {
    On,
    Off,
}

impl PowerTransition {
    pub fn is_on(self) -> bool {
        matches!(self, PowerTransition::On)
    }
}

/// Awake flag and inactivity countdown
///
/// Both operations return the edge they caused, so power is switched
/// exactly once per transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WakeState {
    pub awake: bool,
    pub countdown: u32,
}

impl WakeState {
    /// Qualifying activity: restart the countdown and wake up
    pub fn activity(&mut self) -> Option<PowerTransition> {
        self.countdown = WAKE_TIMEOUT_TICKS;
        if self.awake {
            return None;
        }
        self.awake = true;
        Some(PowerTransition::On)
    }

    /// One tick elapsed
    pub fn tick(&mut self) -> Option<PowerTransition> {
        if self.countdown == 0 {
            return None;
        }
        self.countdown -= 1;
        if self.countdown == 0 && self.awake {
            self.awake = false;
            return Some(PowerTransition::Off);
        }
        None
    }
}
