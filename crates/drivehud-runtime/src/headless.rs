// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Collaborators for running without a display stack
//!
//! Used by the `drivehud` binary: the scene is tracked and logged, nothing is
//! rasterized.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use drivehud_scene::{
    DisplayPower, IdleColor, IdleSurface, LightSensor, Renderer, Scene, StreamKind, TouchInput,
};
use tracing::{debug, info, trace};

/// Draws between summary lines (about ten seconds at the stock tick)
const SUMMARY_EVERY: u64 = 300;

/// Counts draws and frame notifications
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    draws: u64,
    frames: u64,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for HeadlessRenderer {
    fn draw(&mut self, scene: &Scene, now: u64) {
        self.draws += 1;
        if self.draws % SUMMARY_EVERY == 0 {
            debug!(
                "[RUNTIME] status={} v_ego={:.1} alert={} vision={} frames={}",
                scene.status(),
                scene.vehicle.v_ego,
                scene.alert_active(now),
                scene.vision_connected,
                self.frames
            );
        }
    }

    fn frame_ready(&mut self, stream: StreamKind, scene: &Scene) {
        self.frames += 1;
        trace!(
            "[RUNTIME] {} frame in slot {:?}",
            stream,
            scene.frames.get(stream).map(|frame| frame.slot())
        );
    }
}

/// Logs power edges instead of switching a panel
#[derive(Debug, Default)]
pub struct LoggingDisplayPower;

impl DisplayPower for LoggingDisplayPower {
    fn set_power(&mut self, on: bool) -> io::Result<()> {
        info!("[RUNTIME] Display {}", if on { "on" } else { "off" });
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct LoggingIdleSurface;

impl IdleSurface for LoggingIdleSurface {
    fn present(&mut self, color: IdleColor) -> io::Result<()> {
        info!("[RUNTIME] Idle color #{:06X}", color.to_hex());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct NoTouch;

impl TouchInput for NoTouch {
    fn poll_touch(&mut self) -> bool {
        false
    }
}

/// Reads an illuminance value from a text file, e.g. an IIO `in_illuminance_input`
#[derive(Debug)]
pub struct FileLightSensor {
    path: PathBuf,
    interval: Duration,
}

impl FileLightSensor {
    pub fn new(path: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            path: path.into(),
            interval,
        }
    }
}

impl LightSensor for FileLightSensor {
    fn read(&mut self) -> io::Result<f32> {
        thread::sleep(self.interval);
        let text = fs::read_to_string(&self.path)?;
        text.trim().parse::<f32>().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{}: {:?} is not a number ({})", self.path.display(), text.trim(), e),
            )
        })
    }
}

/// Always dark; paces itself like a real sensor
#[derive(Debug)]
pub struct DarkSensor {
    interval: Duration,
}

impl DarkSensor {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl LightSensor for DarkSensor {
    fn read(&mut self) -> io::Result<f32> {
        thread::sleep(self.interval);
        Ok(0.0)
    }
}
