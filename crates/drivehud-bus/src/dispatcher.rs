// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Event Bus Dispatcher
//!
//! Drains every ready input once per tick. Each iteration polls with a zero
//! timeout and services exactly one input, in priority order:
//! frame channel, then control channel, then the first ready typed channel.
//! The drain ends when a poll finds nothing ready.

use drivehud_scene::{PowerTransition, Renderer, Scene};
use drivehud_vision::FrameChannelClient;
use tracing::{debug, warn};

use crate::apply::apply_envelope;
use crate::channels::{Channel, ChannelSet};
use crate::envelope::Envelope;

/// What one drain did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Poll rounds that found something ready
    pub iterations: usize,
    pub envelopes: usize,
    pub frames: usize,
    /// Messages dropped as malformed
    pub dropped: usize,
    pub status_changed: bool,
    /// An activity channel was ready at least once
    pub activity: bool,
    /// Power edge caused by that activity, to forward to the display
    pub power: Option<PowerTransition>,
    /// The frame channel failed and its client was discarded
    pub vision_lost: bool,
}

#[derive(Debug, Default)]
pub struct EventDispatcher {
    dropped_total: u64,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages dropped since start
    pub fn dropped_total(&self) -> u64 {
        self.dropped_total
    }

    /// Drain all ready inputs into the scene
    ///
    /// Runs inside the Scene Store lock scope. A failed frame channel client
    /// is torn down and removed from `vision`; the connector brings up a new one.
    pub fn drain<C: ChannelSet + ?Sized>(
        &mut self,
        scene: &mut Scene,
        vision: &mut Option<FrameChannelClient>,
        channels: &mut C,
        renderer: &mut dyn Renderer,
    ) -> DrainReport {
        let mut report = DrainReport::default();

        loop {
            let frame_fd = vision.as_ref().and_then(FrameChannelClient::raw_fd);
            let ready = match channels.poll(frame_fd) {
                Ok(ready) => ready,
                Err(e) => {
                    warn!("[BUS] Poll failed, skipping rest of drain: {}", e);
                    break;
                }
            };
            if !ready.any() {
                break;
            }
            report.iterations += 1;

            if ready.activity() {
                report.activity = true;
                if let Some(edge) = scene.wake.activity() {
                    report.power = Some(edge);
                }
            }

            if ready.frame {
                self.service_frame(scene, vision, renderer, &mut report);
                continue;
            }

            if ready.is_ready(Channel::Control) {
                if !self.service_control(scene, channels, &mut report) {
                    break;
                }
                continue;
            }

            match ready.first_typed() {
                Some(channel) => {
                    if !self.service_typed(scene, channels, channel, &mut report) {
                        break;
                    }
                }
                None => break,
            }
        }

        self.dropped_total += report.dropped as u64;
        report
    }

    fn service_frame(
        &mut self,
        scene: &mut Scene,
        vision: &mut Option<FrameChannelClient>,
        renderer: &mut dyn Renderer,
        report: &mut DrainReport,
    ) {
        let Some(client) = vision.as_mut() else {
            return;
        };
        match client.service(scene) {
            Ok(stream) => {
                report.frames += 1;
                if scene.frames.is_active(stream) {
                    renderer.frame_ready(stream, scene);
                }
            }
            Err(_) => {
                // service() already logged and cleared the scene
                *vision = None;
                report.vision_lost = true;
            }
        }
    }

    /// Returns false when the channel failed and the drain should stop
    fn service_control<C: ChannelSet + ?Sized>(
        &mut self,
        scene: &mut Scene,
        channels: &mut C,
        report: &mut DrainReport,
    ) -> bool {
        match channels.recv(Channel::Control) {
            Ok(Some(bytes)) if bytes.len() == 1 => {
                if scene.overlay_mode != bytes[0] {
                    debug!("[BUS] Overlay mode {} -> {}", scene.overlay_mode, bytes[0]);
                }
                scene.overlay_mode = bytes[0];
                true
            }
            Ok(Some(bytes)) => {
                warn!(
                    "[BUS] Dropped control message of {} bytes (expected 1)",
                    bytes.len()
                );
                report.dropped += 1;
                true
            }
            Ok(None) => true,
            Err(e) => {
                warn!("[BUS] Receive on control failed: {}", e);
                false
            }
        }
    }

    /// Returns false when the channel failed and the drain should stop
    fn service_typed<C: ChannelSet + ?Sized>(
        &mut self,
        scene: &mut Scene,
        channels: &mut C,
        channel: Channel,
        report: &mut DrainReport,
    ) -> bool {
        let bytes = match channels.recv(channel) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return true,
            Err(e) => {
                warn!("[BUS] Receive on {} failed: {}", channel, e);
                return false;
            }
        };

        match Envelope::decode(&bytes) {
            Ok(envelope) => {
                report.envelopes += 1;
                if apply_envelope(scene, &envelope) {
                    debug!("[BUS] Status -> {} ({})", scene.status(), envelope.event.kind());
                    report.status_changed = true;
                }
            }
            Err(e) => {
                warn!("[BUS] Dropped message on {}: {}", channel, e);
                report.dropped += 1;
            }
        }
        true
    }
}
