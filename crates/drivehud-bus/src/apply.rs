// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Per-kind scene updates
//!
//! Each update overwrites the fields it owns, so applying the same envelope
//! twice leaves the scene as applying it once.

use drivehud_scene::{
    status_after_thermal, status_after_vehicle_state, LaneLine, Scene, MODEL_POINTS,
};

use crate::envelope::{
    CalibrationState, Envelope, Event, ModelOutput, PathPoly, PlannerTrajectory, RadarState,
    ThermalState, VehicleState,
};

/// Apply one validated envelope; returns whether the status changed
pub fn apply_envelope(scene: &mut Scene, envelope: &Envelope) -> bool {
    let ts = envelope.log_mono_time;
    match &envelope.event {
        Event::VehicleState(state) => apply_vehicle_state(scene, state, ts),
        Event::RadarState(radar) => {
            apply_radar_state(scene, radar);
            false
        }
        Event::CalibrationState(cal) => {
            apply_calibration(scene, cal);
            false
        }
        Event::ModelOutput(model) => {
            apply_model_output(scene, model, ts);
            false
        }
        Event::PlannerTrajectory(plan) => {
            apply_trajectory(scene, plan);
            false
        }
        Event::ThermalState(thermal) => apply_thermal(scene, thermal),
        Event::ControlByte(mode) => {
            scene.overlay_mode = *mode;
            false
        }
    }
}

fn apply_vehicle_state(scene: &mut Scene, state: &VehicleState, ts: u64) -> bool {
    scene.vehicle.v_cruise = state.v_cruise;
    scene.vehicle.v_ego = state.v_ego;
    scene.vehicle.curvature = state.curvature;
    scene.vehicle.engaged = state.enabled;
    scene.vehicle.awareness_status = state.awareness_status;
    scene.frames.front_view = state.rear_view_cam;

    scene.alert.text1.clone_from(&state.alert_text1);
    scene.alert.text2.clone_from(&state.alert_text2);
    scene.alert.status = state.alert_status;
    scene.alert.posted_at = ts;

    scene.apply_status(status_after_vehicle_state(
        state.alert_status,
        state.enabled,
    ))
}

fn apply_radar_state(scene: &mut Scene, radar: &RadarState) {
    scene.lead.present = radar.lead_status;
    scene.lead.d_rel = radar.d_rel;
    scene.lead.y_rel = radar.y_rel;
    scene.lead.v_rel = radar.v_rel;
}

fn apply_calibration(scene: &mut Scene, cal: &CalibrationState) {
    let calibration = &mut scene.calibration;
    calibration.status = cal.cal_status;
    calibration.percent = cal.cal_perc;
    for (row, values) in calibration.warp.iter_mut().zip(cal.warp_matrix.chunks_exact(3)) {
        row.copy_from_slice(values);
    }
    for (row, values) in calibration
        .extrinsic
        .iter_mut()
        .zip(cal.extrinsic_matrix.chunks_exact(4))
    {
        row.copy_from_slice(values);
    }
    calibration.world_objects_visible = true;
}

fn copy_line(line: &mut LaneLine, poly: &PathPoly) {
    line.points.copy_from_slice(&poly.points[..MODEL_POINTS]);
    line.prob = poly.prob;
    line.std = poly.std;
}

fn apply_model_output(scene: &mut Scene, model: &ModelOutput, ts: u64) {
    copy_line(&mut scene.model.path, &model.path);
    copy_line(&mut scene.model.left_lane, &model.left_lane);
    copy_line(&mut scene.model.right_lane, &model.right_lane);
    scene.model.lead.dist = model.lead.dist;
    scene.model.lead.prob = model.lead.prob;
    scene.model.lead.std = model.lead.std;
    scene.model.timestamp = ts;
}

fn apply_trajectory(scene: &mut Scene, plan: &PlannerTrajectory) {
    scene.trajectory.x.copy_from_slice(&plan.x[..MODEL_POINTS]);
    scene.trajectory.y.copy_from_slice(&plan.y[..MODEL_POINTS]);
}

fn apply_thermal(scene: &mut Scene, thermal: &ThermalState) -> bool {
    scene.vehicle.started_ts = thermal.started_ts;
    scene.apply_status(status_after_thermal(scene.status(), thermal.started))
}
