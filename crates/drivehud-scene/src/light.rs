// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Ambient light sample and backlight smoothing

use std::sync::atomic::{AtomicU32, Ordering};

/// Latest raw light reading, shared between the sensor thread and the tick loop
///
/// Stored as the bit pattern of an `f32`.
#[derive(Debug, Default)]
pub struct AmbientLight(AtomicU32);

impl AmbientLight {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }
}

/// Exponential filter turning raw light readings into backlight levels
#[derive(Debug, Clone)]
pub struct BrightnessFilter {
    gain: f32,
    offset: f32,
    smoothing: f32,
    max: f32,
    smoothed: f32,
}

impl Default for BrightnessFilter {
    fn default() -> Self {
        Self::new(1.3, 5.0, 0.01, 255.0)
    }
}

impl BrightnessFilter {
    /// The filter starts at `offset`, the level of a dark room
    pub fn new(gain: f32, offset: f32, smoothing: f32, max: f32) -> Self {
        Self {
            gain,
            offset,
            smoothing,
            max,
            smoothed: offset,
        }
    }

    /// Feed one raw reading; returns the new smoothed level
    pub fn update(&mut self, raw: f32) -> f32 {
        let raw = if raw.is_finite() { raw.max(0.0) } else { 0.0 };
        let clipped = (raw * self.gain + self.offset).min(self.max);
        self.smoothed = clipped * self.smoothing + self.smoothed * (1.0 - self.smoothing);
        self.smoothed
    }

    pub fn smoothed(&self) -> f32 {
        self.smoothed
    }

    /// Integer level for the backlight device
    pub fn level(&self) -> u32 {
        self.smoothed.round().clamp(0.0, self.max) as u32
    }
}
