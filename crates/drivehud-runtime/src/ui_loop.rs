// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Main tick loop
//!
//! One tick, all inside a single Scene Store lock scope:
//! 1. adopt a freshly subscribed frame channel client, if one was handed over
//! 2. filter the ambient light and update the backlight
//! 3. drain every ready input through the dispatcher
//! 4. draw, if the display is awake
//! 5. poll touch, then count down the wake timer
//!
//! Power edges from steps 3 and 5 are forwarded to the display exactly once.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::Receiver;
use drivehud_bus::{ChannelSet, DrainReport, EventDispatcher};
use drivehud_scene::{
    now_nanos, Backlight, BrightnessFilter, DisplayPower, PowerTransition, Renderer, SceneStore,
    TouchInput,
};
use drivehud_vision::FrameChannelClient;
use tracing::{debug, info, warn};

/// Collaborators driven from the tick thread
pub struct TickOutputs {
    pub renderer: Box<dyn Renderer>,
    pub power: Box<dyn DisplayPower>,
    pub backlight: Box<dyn Backlight>,
    pub touch: Box<dyn TouchInput>,
}

pub struct UiLoop<C: ChannelSet> {
    store: Arc<SceneStore>,
    channels: C,
    dispatcher: EventDispatcher,
    vision: Option<FrameChannelClient>,
    handoff: Receiver<FrameChannelClient>,
    outputs: TickOutputs,
    brightness: BrightnessFilter,
    backlight_failing: bool,
    tick_interval: Duration,
    ticks: u64,
}

impl<C: ChannelSet> UiLoop<C> {
    pub fn new(
        store: Arc<SceneStore>,
        channels: C,
        handoff: Receiver<FrameChannelClient>,
        outputs: TickOutputs,
        brightness: BrightnessFilter,
        tick_interval: Duration,
    ) -> Self {
        Self {
            store,
            channels,
            dispatcher: EventDispatcher::new(),
            vision: None,
            handoff,
            outputs,
            brightness,
            backlight_failing: false,
            tick_interval,
            ticks: 0,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Whether the tick thread currently owns a streaming client
    pub fn has_vision(&self) -> bool {
        self.vision.is_some()
    }

    pub fn dropped_total(&self) -> u64 {
        self.dispatcher.dropped_total()
    }

    /// Run one tick
    pub fn tick(&mut self) -> DrainReport {
        let store = Arc::clone(&self.store);
        let mut scene = store.lock();
        let now = now_nanos();
        self.ticks += 1;

        while let Ok(client) = self.handoff.try_recv() {
            if self.vision.replace(client).is_some() {
                debug!("[RUNTIME] Replaced a frame channel client still in hand");
            }
        }

        scene.smoothed_light = self.brightness.update(store.ambient_light().load());
        update_backlight(
            self.outputs.backlight.as_mut(),
            self.brightness.level(),
            &mut self.backlight_failing,
        );

        let report = self.dispatcher.drain(
            &mut scene,
            &mut self.vision,
            &mut self.channels,
            self.outputs.renderer.as_mut(),
        );
        if report.status_changed {
            store.notify_status_change();
        }
        if let Some(edge) = report.power {
            switch_power(self.outputs.power.as_mut(), edge);
        }

        if scene.wake.awake {
            self.outputs.renderer.draw(&scene, now);
        }

        if self.outputs.touch.poll_touch() {
            if let Some(edge) = scene.wake.activity() {
                switch_power(self.outputs.power.as_mut(), edge);
            }
        }
        if let Some(edge) = scene.wake.tick() {
            switch_power(self.outputs.power.as_mut(), edge);
        }

        report
    }

    /// Turn the display on and restart the inactivity countdown
    pub fn wake(&mut self) {
        let edge = self.store.lock().wake.activity();
        if let Some(edge) = edge {
            switch_power(self.outputs.power.as_mut(), edge);
        }
    }

    /// Tick until shutdown is requested
    pub fn run(&mut self) {
        info!(
            "[RUNTIME] Tick loop started ({:?} interval)",
            self.tick_interval
        );
        self.wake();

        while !self.store.is_shutdown() {
            self.tick();
            thread::sleep(self.tick_interval);
        }

        info!(
            "[RUNTIME] Tick loop stopped after {} ticks ({} messages dropped)",
            self.ticks,
            self.dispatcher.dropped_total()
        );
    }

    /// Leave the display on and release the channels
    pub fn finish(mut self) {
        self.wake();
    }
}

fn switch_power(power: &mut dyn DisplayPower, edge: PowerTransition) {
    let on = edge.is_on();
    match power.set_power(on) {
        Ok(()) => debug!("[RUNTIME] Display power {}", if on { "on" } else { "off" }),
        Err(e) => warn!("[RUNTIME] Display power switch failed: {}", e),
    }
}

/// Only the first failure of a streak is a warning
fn update_backlight(backlight: &mut dyn Backlight, level: u32, failing: &mut bool) {
    match backlight.set_brightness(level) {
        Ok(()) => *failing = false,
        Err(e) => {
            if !*failing {
                warn!("[RUNTIME] Backlight update to {} failed: {}", level, e);
            }
            *failing = true;
        }
    }
}
