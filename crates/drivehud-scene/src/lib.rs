// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! # drivehud-scene
//!
//! The shared snapshot every dashboard thread reads or writes, plus the small
//! state machines derived from it.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │  SceneStore                          │
//! │   Mutex<Scene>  ← tick + connector   │
//! │   Condvar       ← status changes     │
//! │   AtomicBool    ← shutdown           │
//! │   AtomicU32     ← ambient light (f32)│
//! └──────────────────────────────────────┘
//! ```
//!
//! Frame buffers are owned elsewhere; the scene only holds [`FrameRef`]s,
//! which are weak and go dead when the owning slot ring is dropped.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod alert;
pub mod boundary;
pub mod clock;
pub mod light;
pub mod scene;
pub mod status;
pub mod store;
pub mod wake;

pub use alert::{AlertState, ALERT_TTL};
pub use boundary::{
    Backlight, DisplayPower, IdleSurface, LightSensor, Renderer, SysfsBacklight, TouchInput,
};
pub use clock::now_nanos;
pub use light::{AmbientLight, BrightnessFilter};
pub use scene::{
    Calibration, CalibrationStatus, FrameBuffer, FrameGeometry, FrameRef, FrameState, LaneLine,
    LeadView, ModelLead, ModelView, RegionOfInterest, Scene, StreamKind, Trajectory, VehicleView,
    MODEL_POINTS,
};
pub use status::{
    status_after_thermal, status_after_vehicle_state, AlertStatus, IdleColor, Status,
};
pub use store::SceneStore;
pub use wake::{PowerTransition, WakeState, WAKE_TIMEOUT_TICKS};
