// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! # drivehud-bus
//!
//! Telemetry side of the dashboard: typed envelopes arriving on six pub/sub
//! channels plus a one-byte control channel, and the dispatcher that drains
//! them (and the frame channel) into the scene once per tick.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use drivehud_bus::{Channel, EventDispatcher, ZmqChannelSet};
//!
//! let context = zmq::Context::new();
//! let endpoints = vec![(Channel::VehicleState, "tcp://127.0.0.1:8007".to_string())];
//! let channels = ZmqChannelSet::connect(&context, &endpoints)?;
//! let dispatcher = EventDispatcher::new();
//! # let _ = (channels, dispatcher);
//! # Ok::<(), drivehud_transports::TransportError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod apply;
pub mod channels;
pub mod dispatcher;
pub mod envelope;

pub use apply::apply_envelope;
pub use channels::{Channel, ChannelSet, Readiness, ZmqChannelSet};
pub use dispatcher::{DrainReport, EventDispatcher};
pub use envelope::{
    CalibrationState, DecodeError, Envelope, Event, LeadData, ModelOutput, PathPoly,
    PlannerTrajectory, RadarState, ThermalState, VehicleState, EXTRINSIC_LEN, WARP_LEN,
};
