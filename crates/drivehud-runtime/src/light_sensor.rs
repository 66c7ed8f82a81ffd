// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Ambient-light thread
//!
//! Blocks on the sensor and publishes each reading through the store's
//! atomic scalar; the tick thread never waits on it. Shutdown joins with a
//! bounded wait because a sensor read can block indefinitely.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError};
use drivehud_scene::{LightSensor, SceneStore};
use tracing::{debug, warn};

/// Pause after a failed read before trying again
pub const SENSOR_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Handle to a running ambient-light thread
pub struct SensorHandle {
    handle: JoinHandle<()>,
    // Disconnects when the thread body returns or unwinds
    done: Receiver<()>,
}

impl SensorHandle {
    /// Wait up to `timeout` for the thread to finish
    ///
    /// Returns false if the thread was still blocked and has been detached.
    pub fn join_timeout(self, timeout: Duration) -> bool {
        match self.done.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "[RUNTIME] Light sensor thread still busy after {:?}, detaching",
                    timeout
                );
                false
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if self.handle.join().is_err() {
                    warn!("[RUNTIME] Light sensor thread panicked");
                }
                true
            }
        }
    }
}

/// Start polling `sensor` on a thread named `light-sensor`
pub fn spawn_light_sensor(
    store: Arc<SceneStore>,
    mut sensor: Box<dyn LightSensor>,
) -> io::Result<SensorHandle> {
    let (done_tx, done) = channel::bounded(1);

    let handle = thread::Builder::new()
        .name("light-sensor".to_string())
        .spawn(move || {
            let mut failing = false;
            while !store.is_shutdown() {
                match sensor.read() {
                    Ok(value) => {
                        store.ambient_light().store(value);
                        failing = false;
                    }
                    Err(e) => {
                        if !failing {
                            warn!("[RUNTIME] Light sensor read failed: {}", e);
                            failing = true;
                        } else {
                            debug!("[RUNTIME] Light sensor read failed: {}", e);
                        }
                        thread::sleep(SENSOR_RETRY_DELAY);
                    }
                }
            }
            let _ = done_tx.send(());
        })?;

    Ok(SensorHandle { handle, done })
}
