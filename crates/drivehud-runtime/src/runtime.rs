// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Thread topology
//!
//! ```text
//! main (tick loop) ──owns──▶ FrameChannelClient ◀──handoff── vision-connector
//!        │                                                        │
//!        └──────────────── SceneStore (lock + condvar) ───────────┤
//!                                 │                               │
//!                 idle-color ◀────┘ (status changes)              │
//!                 light-sensor ──▶ ambient light atomic ──────────┘
//! ```

use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::Result;
use drivehud_bus::{Channel, ChannelSet, ZmqChannelSet};
use drivehud_config::{DrivehudConfig, EndpointsConfig};
use drivehud_scene::{
    Backlight, BrightnessFilter, DisplayPower, IdleSurface, LightSensor, Renderer, Scene,
    SceneStore, SysfsBacklight, TouchInput,
};
use drivehud_transports::TransportResult;
use drivehud_vision::VisionConnector;
use tracing::{info, warn};

use crate::headless::{
    DarkSensor, FileLightSensor, HeadlessRenderer, LoggingDisplayPower, LoggingIdleSurface, NoTouch,
};
use crate::idle_color::IdleColorSupervisor;
use crate::light_sensor::{spawn_light_sensor, SENSOR_RETRY_DELAY};
use crate::ui_loop::{TickOutputs, UiLoop};

/// Everything outside the core that the runtime drives
pub struct Collaborators {
    pub renderer: Box<dyn Renderer>,
    pub power: Box<dyn DisplayPower>,
    pub backlight: Box<dyn Backlight>,
    pub idle_surface: Box<dyn IdleSurface>,
    pub touch: Box<dyn TouchInput>,
    pub light_sensor: Box<dyn LightSensor>,
}

impl Collaborators {
    /// Logging stand-ins plus the sysfs backlight from the configuration
    pub fn headless(config: &DrivehudConfig) -> Self {
        let light_sensor: Box<dyn LightSensor> = match &config.display.light_sensor_path {
            Some(path) => Box::new(FileLightSensor::new(path, SENSOR_RETRY_DELAY)),
            None => Box::new(DarkSensor::new(SENSOR_RETRY_DELAY)),
        };
        Self {
            renderer: Box::new(HeadlessRenderer::new()),
            power: Box::new(LoggingDisplayPower),
            backlight: Box::new(SysfsBacklight::new(&config.display.backlight_path)),
            idle_surface: Box::new(LoggingIdleSurface),
            touch: Box::new(NoTouch),
            light_sensor,
        }
    }
}

/// Pub/sub endpoints in channel order
pub fn endpoints(config: &EndpointsConfig) -> Vec<(Channel, String)> {
    vec![
        (Channel::VehicleState, config.vehicle_state.clone()),
        (Channel::CalibrationState, config.calibration_state.clone()),
        (Channel::ModelOutput, config.model_output.clone()),
        (Channel::RadarState, config.radar_state.clone()),
        (Channel::PlannerTrajectory, config.planner_trajectory.clone()),
        (Channel::ThermalState, config.thermal_state.clone()),
        (Channel::Control, config.control.clone()),
    ]
}

pub struct Runtime {
    config: DrivehudConfig,
    store: Arc<SceneStore>,
}

impl Runtime {
    pub fn new(config: DrivehudConfig) -> Self {
        let scene = Scene::new(config.vehicle.is_metric, config.vehicle.passive);
        Self {
            config,
            store: Arc::new(SceneStore::new(scene)),
        }
    }

    pub fn config(&self) -> &DrivehudConfig {
        &self.config
    }

    /// Shared store; `request_shutdown` on it stops every thread
    pub fn store(&self) -> Arc<SceneStore> {
        Arc::clone(&self.store)
    }

    /// Subscribe to every configured pub/sub endpoint
    pub fn connect_channels(&self, context: &zmq::Context) -> TransportResult<ZmqChannelSet> {
        ZmqChannelSet::connect(context, &endpoints(&self.config.endpoints))
    }

    /// Start the worker threads and tick on the calling thread until shutdown
    pub fn run<C: ChannelSet>(self, channels: C, collaborators: Collaborators) -> Result<()> {
        let Collaborators {
            renderer,
            power,
            backlight,
            idle_surface,
            touch,
            light_sensor,
        } = collaborators;
        let timing = &self.config.timing;
        let display = &self.config.display;

        let (handoff_tx, handoff_rx) = crossbeam::channel::unbounded();
        let mut ui = UiLoop::new(
            Arc::clone(&self.store),
            channels,
            handoff_rx,
            TickOutputs {
                renderer,
                power,
                backlight,
                touch,
            },
            BrightnessFilter::new(
                display.light_sensor_gain,
                display.light_sensor_offset,
                display.light_smoothing,
                display.max_brightness,
            ),
            timing.tick_interval(),
        );

        let idle = IdleColorSupervisor::new(Arc::clone(&self.store), idle_surface)
            .spawn()
            .map_err(|e| self.abort(e, "idle-color"))?;
        let sensor = spawn_light_sensor(Arc::clone(&self.store), light_sensor)
            .map_err(|e| self.abort(e, "light-sensor"))?;
        let connector = VisionConnector::new(
            Arc::clone(&self.store),
            &self.config.endpoints.vision_socket,
            timing.vision_retry(),
            handoff_tx,
        )
        .spawn()
        .map_err(|e| self.abort(e, "vision-connector"))?;
        info!("[RUNTIME] Worker threads started");

        ui.run();

        // Leave the panel on for whatever runs next
        ui.finish();
        self.store.request_shutdown();

        join("idle-color", idle);
        join("vision-connector", connector);
        sensor.join_timeout(timing.sensor_join_timeout());

        info!("[RUNTIME] Shutdown complete");
        Ok(())
    }

    /// Stop threads already started; they exit on their own
    fn abort(&self, error: std::io::Error, thread: &str) -> anyhow::Error {
        self.store.request_shutdown();
        anyhow::Error::new(error).context(format!("Failed to spawn {} thread", thread))
    }
}

fn join(name: &str, handle: JoinHandle<()>) {
    if handle.join().is_err() {
        warn!("[RUNTIME] {} thread panicked", name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_follow_channel_order() {
        let config = EndpointsConfig::default();
        let endpoints = endpoints(&config);
        let channels: Vec<Channel> = endpoints.iter().map(|(c, _)| *c).collect();
        assert_eq!(channels, Channel::ALL.to_vec());
        assert_eq!(endpoints[6].1, config.control);
    }

    #[test]
    fn test_scene_takes_vehicle_settings() {
        let mut config = DrivehudConfig::default();
        config.vehicle.is_metric = true;
        config.vehicle.passive = true;
        let runtime = Runtime::new(config);

        let store = runtime.store();
        let scene = store.lock();
        assert!(scene.is_metric);
        assert!(scene.passive);
        assert!(!scene.vision_connected);
    }
}
