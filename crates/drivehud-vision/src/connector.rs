// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Frame channel connection supervisor
//!
//! A dedicated thread retries connect + subscribe on a flat cadence while the
//! scene says the frame channel is down. A subscribed client is installed in
//! the scene and handed to the tick thread, which owns it from then on.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::Sender;
use drivehud_scene::SceneStore;
use tracing::{debug, info};

use crate::client::FrameChannelClient;
use crate::error::VisionResult;

pub struct VisionConnector {
    store: Arc<SceneStore>,
    socket_path: PathBuf,
    retry_interval: Duration,
    handoff: Sender<FrameChannelClient>,
}

impl VisionConnector {
    pub fn new(
        store: Arc<SceneStore>,
        socket_path: impl Into<PathBuf>,
        retry_interval: Duration,
        handoff: Sender<FrameChannelClient>,
    ) -> Self {
        Self {
            store,
            socket_path: socket_path.into(),
            retry_interval,
            handoff,
        }
    }

    /// Run the supervisor on its own named thread
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("vision-connector".to_string())
            .spawn(move || self.run())
    }

    /// Loop until shutdown or until the tick thread stops accepting clients
    pub fn run(self) {
        let mut attempts: u64 = 0;

        while !self.store.is_shutdown() {
            let connected = self.store.lock().vision_connected;

            if !connected {
                attempts += 1;
                match self.attempt() {
                    Ok(client) => {
                        {
                            let mut scene = self.store.lock();
                            client.install(&mut scene);
                        }
                        info!(
                            "[VISION] Connected to {} after {} attempt(s)",
                            self.socket_path.display(),
                            attempts
                        );
                        attempts = 0;
                        if self.handoff.send(client).is_err() {
                            debug!("[VISION] Tick thread gone, connector exiting");
                            self.store.lock().vision_connected = false;
                            break;
                        }
                    }
                    Err(e) => {
                        debug!("[VISION] Connection attempt {} failed: {}", attempts, e);
                    }
                }
            }

            thread::sleep(self.retry_interval);
        }

        debug!("[VISION] Connector stopped");
    }

    fn attempt(&self) -> VisionResult<FrameChannelClient> {
        let mut client = FrameChannelClient::new();
        client.connect(&self.socket_path)?;
        client.subscribe()?;
        Ok(client)
    }
}
