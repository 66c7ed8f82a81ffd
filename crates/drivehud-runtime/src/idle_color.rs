// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Idle-color supervisor
//!
//! Presents the status-keyed background color once at start and again after
//! every status change. The surface call happens with the lock released.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use drivehud_scene::{IdleSurface, SceneStore, Status};
use tracing::{debug, warn};

pub struct IdleColorSupervisor {
    store: Arc<SceneStore>,
    surface: Box<dyn IdleSurface>,
}

impl IdleColorSupervisor {
    pub fn new(store: Arc<SceneStore>, surface: Box<dyn IdleSurface>) -> Self {
        Self { store, surface }
    }

    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("idle-color".to_string())
            .spawn(move || self.run())
    }

    /// Loop until shutdown
    pub fn run(mut self) {
        let mut presented: Option<Status> = None;

        loop {
            let status = {
                let mut scene = self.store.lock();
                // Shutdown is set under the same lock, so this cannot miss it
                while !self.store.is_shutdown() && presented == Some(scene.status()) {
                    self.store.wait_status_change(&mut scene);
                }
                if self.store.is_shutdown() {
                    break;
                }
                scene.status()
            };

            let color = status.idle_color();
            match self.surface.present(color) {
                Ok(()) => debug!("[RUNTIME] Idle color #{:06X} for {}", color.to_hex(), status),
                Err(e) => warn!("[RUNTIME] Idle color for {} not presented: {}", status, e),
            }
            presented = Some(status);
        }

        debug!("[RUNTIME] Idle-color supervisor stopped");
    }
}
