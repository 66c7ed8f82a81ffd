// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Scene data model

use std::fmt;
use std::sync::{Arc, Weak};

use serde::{Deserialize, Serialize};

use crate::alert::AlertState;
use crate::status::Status;
use crate::wake::WakeState;

/// Points per lane line, path and planner trajectory
pub const MODEL_POINTS: usize = 50;

/// Camera stream carried by the frame channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamKind {
    /// Road-facing camera
    Primary,
    /// Driver-facing camera
    Secondary,
}

impl StreamKind {
    pub const ALL: [StreamKind; 2] = [StreamKind::Primary, StreamKind::Secondary];

    pub fn as_str(self) -> &'static str {
        match self {
            StreamKind::Primary => "primary",
            StreamKind::Secondary => "secondary",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel memory of one slot, owned by the frame channel client
pub trait FrameBuffer: Send + Sync {
    fn bytes(&self) -> &[u8];
}

/// Non-owning reference to the slot currently held for a stream
#[derive(Clone)]
pub struct FrameRef {
    slot: usize,
    buffer: Weak<dyn FrameBuffer>,
}

impl FrameRef {
    pub fn new(slot: usize, buffer: &Arc<dyn FrameBuffer>) -> Self {
        Self {
            slot,
            buffer: Arc::downgrade(buffer),
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Pixel memory, or `None` once the owning ring was torn down
    pub fn upgrade(&self) -> Option<Arc<dyn FrameBuffer>> {
        self.buffer.upgrade()
    }

    /// True when this reference names exactly `buffer`
    pub fn points_to(&self, buffer: &Arc<dyn FrameBuffer>) -> bool {
        self.buffer.as_ptr() as *const () == Arc::as_ptr(buffer) as *const ()
    }
}

impl PartialEq for FrameRef {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot
            && self.buffer.as_ptr() as *const () == other.buffer.as_ptr() as *const ()
    }
}

impl fmt::Debug for FrameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameRef")
            .field("slot", &self.slot)
            .field("live", &(self.buffer.strong_count() > 0))
            .finish()
    }
}

/// Box inside the full frame that the transformed image covers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionOfInterest {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// How one stream's buffers map to display space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
    /// Bytes per row
    pub stride: u32,
    pub transformed_width: u32,
    pub transformed_height: u32,
    pub roi: RegionOfInterest,
}

/// Frame fields of the scene
#[derive(Debug, Clone, Default)]
pub struct FrameState {
    /// Selects the secondary stream as the active view
    pub front_view: bool,
    pub primary: Option<FrameRef>,
    pub secondary: Option<FrameRef>,
    pub primary_geometry: Option<FrameGeometry>,
    pub secondary_geometry: Option<FrameGeometry>,
}

impl FrameState {
    pub fn active_stream(&self) -> StreamKind {
        if self.front_view {
            StreamKind::Secondary
        } else {
            StreamKind::Primary
        }
    }

    pub fn is_active(&self, stream: StreamKind) -> bool {
        self.active_stream() == stream
    }

    /// Frame the renderer should draw; `None` means a blank frame
    pub fn active(&self) -> Option<&FrameRef> {
        self.get(self.active_stream())
    }

    pub fn get(&self, stream: StreamKind) -> Option<&FrameRef> {
        match stream {
            StreamKind::Primary => self.primary.as_ref(),
            StreamKind::Secondary => self.secondary.as_ref(),
        }
    }

    pub fn set(&mut self, stream: StreamKind, frame: Option<FrameRef>) {
        match stream {
            StreamKind::Primary => self.primary = frame,
            StreamKind::Secondary => self.secondary = frame,
        }
    }

    pub fn geometry(&self, stream: StreamKind) -> Option<&FrameGeometry> {
        match stream {
            StreamKind::Primary => self.primary_geometry.as_ref(),
            StreamKind::Secondary => self.secondary_geometry.as_ref(),
        }
    }

    pub fn set_geometry(&mut self, stream: StreamKind, geometry: FrameGeometry) {
        match stream {
            StreamKind::Primary => self.primary_geometry = Some(geometry),
            StreamKind::Secondary => self.secondary_geometry = Some(geometry),
        }
    }

    /// Drop both frame references; geometry is kept for the next connection
    pub fn clear(&mut self) {
        self.primary = None;
        self.secondary = None;
    }
}

/// Vehicle fields fed by vehicle-state and thermal events
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleView {
    pub v_cruise: f32,
    pub v_ego: f32,
    pub curvature: f32,
    pub engaged: bool,
    pub awareness_status: f32,
    /// Drive start, log timestamp in nanoseconds
    pub started_ts: u64,
}

/// One model polyline with its confidence
#[derive(Debug, Clone, PartialEq)]
pub struct LaneLine {
    pub points: [f32; MODEL_POINTS],
    pub prob: f32,
    pub std: f32,
}

impl Default for LaneLine {
    fn default() -> Self {
        Self {
            points: [0.0; MODEL_POINTS],
            prob: 0.0,
            std: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModelLead {
    pub dist: f32,
    pub prob: f32,
    pub std: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelView {
    pub path: LaneLine,
    pub left_lane: LaneLine,
    pub right_lane: LaneLine,
    pub lead: ModelLead,
    /// Log timestamp of the last model output
    pub timestamp: u64,
}

/// Planner trajectory in car coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub x: [f32; MODEL_POINTS],
    pub y: [f32; MODEL_POINTS],
}

impl Default for Trajectory {
    fn default() -> Self {
        Self {
            x: [0.0; MODEL_POINTS],
            y: [0.0; MODEL_POINTS],
        }
    }
}

/// Radar lead vehicle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LeadView {
    pub present: bool,
    pub d_rel: f32,
    pub y_rel: f32,
    pub v_rel: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalibrationStatus {
    #[default]
    Uncalibrated,
    Calibrated,
    Invalid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    pub status: CalibrationStatus,
    pub percent: u8,
    /// Transformed box to frame
    pub warp: [[f32; 3]; 3],
    /// Camera pose; rows of a 3x4 matrix
    pub extrinsic: [[f32; 4]; 3],
    /// World-space overlays stay hidden until a calibration with valid matrices arrives
    pub world_objects_visible: bool,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            status: CalibrationStatus::Uncalibrated,
            percent: 0,
            warp: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            extrinsic: [[0.0; 4]; 3],
            world_objects_visible: false,
        }
    }
}

/// The shared snapshot
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub frames: FrameState,
    pub vehicle: VehicleView,
    pub model: ModelView,
    pub trajectory: Trajectory,
    pub lead: LeadView,
    pub calibration: Calibration,
    pub alert: AlertState,
    status: Status,
    pub is_metric: bool,
    /// Display-only mode, no engagement possible
    pub passive: bool,
    /// Raw byte from the control channel
    pub overlay_mode: u8,
    pub wake: WakeState,
    pub smoothed_light: f32,
    pub vision_connected: bool,
}

impl Scene {
    pub fn new(is_metric: bool, passive: bool) -> Self {
        Self {
            is_metric,
            passive,
            ..Default::default()
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Apply a status derived by the status machine; returns whether it changed
    pub fn apply_status(&mut self, status: Status) -> bool {
        if self.status == status {
            return false;
        }
        self.status = status;
        true
    }

    pub fn alert_active(&self, now: u64) -> bool {
        self.alert.is_active(now)
    }
}
