// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Shared nanosecond clock
//!
//! Monotonic time since boot, the clock producers stamp `log_mono_time` from.
//! Alert aging compares the two, so wall-clock adjustments never move the
//! alert window.

use nix::time::{clock_gettime, ClockId};

#[cfg(any(target_os = "linux", target_os = "android"))]
const BOOT_CLOCK: ClockId = ClockId::CLOCK_BOOTTIME;
#[cfg(not(any(target_os = "linux", target_os = "android")))]
const BOOT_CLOCK: ClockId = ClockId::CLOCK_MONOTONIC;

/// Nanoseconds since boot; 0 if the clock cannot be read
pub fn now_nanos() -> u64 {
    match clock_gettime(BOOT_CLOCK) {
        Ok(ts) => (ts.tv_sec() as u64)
            .saturating_mul(1_000_000_000)
            .saturating_add(ts.tv_nsec() as u64),
        Err(_) => 0,
    }
}
