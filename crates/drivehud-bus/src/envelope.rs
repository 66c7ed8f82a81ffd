// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Telemetry envelopes
//!
//! Every typed channel carries one bincode-encoded [`Envelope`] per message.
//! Decoding checks array shapes and finiteness, so the apply step can copy
//! fields into the scene without further checks.

use drivehud_scene::{AlertStatus, CalibrationStatus, MODEL_POINTS};
use drivehud_transports::common::{decode, encode};
use drivehud_transports::TransportResult;
use serde::{Deserialize, Serialize};

/// Entries in the row-major 3x3 warp matrix
pub const WARP_LEN: usize = 9;
/// Entries in the row-major 3x4 extrinsic matrix
pub const EXTRINSIC_LEN: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Undecodable envelope: {0}")]
    Malformed(String),

    #[error("{field} has {got} values, expected {expected}")]
    BadShape {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{field} contains non-finite values")]
    NonFinite { field: &'static str },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Producer timestamp, nanoseconds on the shared clock
    pub log_mono_time: u64,
    pub event: Event,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    VehicleState(VehicleState),
    RadarState(RadarState),
    CalibrationState(CalibrationState),
    ModelOutput(ModelOutput),
    PlannerTrajectory(PlannerTrajectory),
    ThermalState(ThermalState),
    ControlByte(u8),
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::VehicleState(_) => "VehicleState",
            Event::RadarState(_) => "RadarState",
            Event::CalibrationState(_) => "CalibrationState",
            Event::ModelOutput(_) => "ModelOutput",
            Event::PlannerTrajectory(_) => "PlannerTrajectory",
            Event::ThermalState(_) => "ThermalState",
            Event::ControlByte(_) => "ControlByte",
        }
    }
}

/// Controls state: speeds, engagement and alert texts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub v_cruise: f32,
    pub v_ego: f32,
    pub curvature: f32,
    pub enabled: bool,
    /// Show the driver-facing stream instead of the road stream
    pub rear_view_cam: bool,
    pub alert_text1: String,
    pub alert_text2: String,
    pub alert_status: AlertStatus,
    pub awareness_status: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RadarState {
    pub lead_status: bool,
    pub d_rel: f32,
    pub y_rel: f32,
    pub v_rel: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationState {
    pub cal_status: CalibrationStatus,
    pub cal_perc: u8,
    pub warp_matrix: Vec<f32>,
    pub extrinsic_matrix: Vec<f32>,
}

/// One polyline of the model output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPoly {
    pub points: Vec<f32>,
    pub prob: f32,
    pub std: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadData {
    pub dist: f32,
    pub prob: f32,
    pub std: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    pub path: PathPoly,
    pub left_lane: PathPoly,
    pub right_lane: PathPoly,
    pub lead: LeadData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerTrajectory {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThermalState {
    pub started: bool,
    pub started_ts: u64,
}

impl Envelope {
    pub fn new(log_mono_time: u64, event: Event) -> Self {
        Self {
            log_mono_time,
            event,
        }
    }

    /// Wire form used by publishers
    pub fn encode(&self) -> TransportResult<Vec<u8>> {
        encode(self)
    }

    /// Decode and validate one channel message
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let envelope: Envelope =
            decode(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))?;
        envelope.validate()?;
        Ok(envelope)
    }

    fn validate(&self) -> Result<(), DecodeError> {
        match &self.event {
            Event::CalibrationState(cal) => {
                check_values("warp_matrix", &cal.warp_matrix, WARP_LEN)?;
                check_values("extrinsic_matrix", &cal.extrinsic_matrix, EXTRINSIC_LEN)
            }
            Event::ModelOutput(model) => {
                check_shape("path", &model.path.points, MODEL_POINTS)?;
                check_shape("left_lane", &model.left_lane.points, MODEL_POINTS)?;
                check_shape("right_lane", &model.right_lane.points, MODEL_POINTS)
            }
            Event::PlannerTrajectory(plan) => {
                check_shape("x", &plan.x, MODEL_POINTS)?;
                check_shape("y", &plan.y, MODEL_POINTS)
            }
            Event::VehicleState(_)
            | Event::RadarState(_)
            | Event::ThermalState(_)
            | Event::ControlByte(_) => Ok(()),
        }
    }
}

fn check_shape(field: &'static str, values: &[f32], expected: usize) -> Result<(), DecodeError> {
    if values.len() != expected {
        return Err(DecodeError::BadShape {
            field,
            expected,
            got: values.len(),
        });
    }
    Ok(())
}

/// Matrices must also be finite to be usable for projection
fn check_values(field: &'static str, values: &[f32], expected: usize) -> Result<(), DecodeError> {
    check_shape(field, values, expected)?;
    if values.iter().any(|v| !v.is_finite()) {
        return Err(DecodeError::NonFinite { field });
    }
    Ok(())
}
