// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Collaborator boundaries
//!
//! Rasterization, display power, touch decoding and the light sensor live
//! outside this workspace. The core talks to them only through these traits.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::scene::{Scene, StreamKind};
use crate::status::IdleColor;

/// Consumer of the scene
///
/// Both methods run on the tick thread inside the Scene Store lock scope, so
/// frame references and their geometry are consistent for the whole call.
pub trait Renderer: Send {
    /// Draw one frame of the dashboard; `now` is [`crate::clock::now_nanos`]
    fn draw(&mut self, scene: &Scene, now: u64);

    /// New pixel data arrived for the active stream
    fn frame_ready(&mut self, stream: StreamKind, scene: &Scene);
}

/// Display power primitive
pub trait DisplayPower: Send {
    fn set_power(&mut self, on: bool) -> io::Result<()>;
}

/// Backlight level sink
pub trait Backlight: Send {
    fn set_brightness(&mut self, level: u32) -> io::Result<()>;
}

/// Secondary surface painted with the status color
pub trait IdleSurface: Send {
    fn present(&mut self, color: IdleColor) -> io::Result<()>;
}

/// Touch screen, polled once per tick without blocking
pub trait TouchInput: Send {
    fn poll_touch(&mut self) -> bool;
}

/// Ambient light hardware; `read` blocks until the next sample
pub trait LightSensor: Send {
    fn read(&mut self) -> io::Result<f32>;
}

/// Backlight driven through the sysfs LED class
///
/// Identical consecutive levels are written once. A failed write leaves the
/// last level untouched so the next tick retries.
#[derive(Debug)]
pub struct SysfsBacklight {
    path: PathBuf,
    last: Option<u32>,
}

impl SysfsBacklight {
    pub const DEFAULT_PATH: &'static str = "/sys/class/leds/lcd-backlight/brightness";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_level(&self) -> Option<u32> {
        self.last
    }
}

impl Default for SysfsBacklight {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PATH)
    }
}

impl Backlight for SysfsBacklight {
    fn set_brightness(&mut self, level: u32) -> io::Result<()> {
        if self.last == Some(level) {
            return Ok(());
        }
        fs::write(&self.path, level.to_string())?;
        self.last = Some(level);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sysfs_backlight_writes_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brightness");
        let mut backlight = SysfsBacklight::new(&path);

        backlight.set_brightness(128).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "128");
        assert_eq!(backlight.last_level(), Some(128));
    }

    #[test]
    fn test_sysfs_backlight_skips_repeats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brightness");
        let mut backlight = SysfsBacklight::new(&path);

        backlight.set_brightness(40).unwrap();
        fs::write(&path, "tampered").unwrap();
        backlight.set_brightness(40).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "tampered");

        backlight.set_brightness(41).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "41");
    }

    #[test]
    fn test_sysfs_backlight_failure_retries() {
        let dir = tempfile::tempdir().unwrap();
        let mut backlight = SysfsBacklight::new(dir.path().join("missing/brightness"));

        assert!(backlight.set_brightness(10).is_err());
        assert_eq!(backlight.last_level(), None);
    }
}
