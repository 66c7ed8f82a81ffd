// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Scene Store: the single lock around the shared scene
//!
//! Any reader of related fields (a frame reference and its geometry, the
//! alert texts and their timestamp) holds the guard for the whole read.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::debug;

use crate::light::AmbientLight;
use crate::scene::Scene;

pub struct SceneStore {
    scene: Mutex<Scene>,
    status_changed: Condvar,
    shutdown: AtomicBool,
    ambient_light: AmbientLight,
}

impl SceneStore {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene: Mutex::new(scene),
            status_changed: Condvar::new(),
            shutdown: AtomicBool::new(false),
            ambient_light: AmbientLight::new(0.0),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, Scene> {
        self.scene.lock()
    }

    /// Wake every thread waiting for a status change
    pub fn notify_status_change(&self) {
        self.status_changed.notify_all();
    }

    /// Release the guard until the next status change or shutdown broadcast
    ///
    /// Callers check [`SceneStore::is_shutdown`] under the same guard before
    /// waiting, so a shutdown request is never missed.
    pub fn wait_status_change(&self, guard: &mut MutexGuard<'_, Scene>) {
        self.status_changed.wait(guard);
    }

    /// Set the shutdown flag and broadcast
    ///
    /// Takes the lock, so it must not be called while holding a guard.
    pub fn request_shutdown(&self) {
        let _guard = self.scene.lock();
        if !self.shutdown.swap(true, Ordering::SeqCst) {
            debug!("Shutdown requested");
        }
        self.status_changed.notify_all();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub fn ambient_light(&self) -> &AmbientLight {
        &self.ambient_light
    }
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new(Scene::default())
    }
}
