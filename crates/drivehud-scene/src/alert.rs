// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Alert text and its display window

use std::time::Duration;

use crate::status::AlertStatus;

/// How long a posted alert stays active
pub const ALERT_TTL: Duration = Duration::from_secs(20);

const ALERT_TTL_NANOS: u64 = ALERT_TTL.as_nanos() as u64;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertState {
    pub text1: String,
    pub text2: String,
    pub status: AlertStatus,
    /// Log timestamp of the vehicle-state event that posted the texts
    pub posted_at: u64,
}

impl AlertState {
    /// Active within `ALERT_TTL` of posting and only with a headline
    ///
    /// Computed on every call; `now` and `posted_at` share the nanosecond
    /// clock of [`crate::clock::now_nanos`].
    pub fn is_active(&self, now: u64) -> bool {
        !self.text1.is_empty() && now.saturating_sub(self.posted_at) < ALERT_TTL_NANOS
    }
}
