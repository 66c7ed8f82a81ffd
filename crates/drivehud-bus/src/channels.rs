// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Subscribed channels and their readiness

use std::fmt;
use std::os::unix::io::RawFd;

use drivehud_transports::{
    ClientConfig, Subscriber, Transport, TransportError, TransportResult, ZmqSub,
};
use tracing::info;

/// One pub/sub channel
///
/// Declaration order of the typed channels is their service priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    VehicleState,
    CalibrationState,
    ModelOutput,
    RadarState,
    PlannerTrajectory,
    ThermalState,
    Control,
}

impl Channel {
    pub const ALL: [Channel; 7] = [
        Channel::VehicleState,
        Channel::CalibrationState,
        Channel::ModelOutput,
        Channel::RadarState,
        Channel::PlannerTrajectory,
        Channel::ThermalState,
        Channel::Control,
    ];

    /// Typed channels in service order
    pub const TYPED: [Channel; 6] = [
        Channel::VehicleState,
        Channel::CalibrationState,
        Channel::ModelOutput,
        Channel::RadarState,
        Channel::PlannerTrajectory,
        Channel::ThermalState,
    ];

    /// Traffic on this channel keeps the display awake
    pub fn counts_as_activity(self) -> bool {
        !matches!(self, Channel::ThermalState | Channel::Control)
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::VehicleState => "vehicle_state",
            Channel::CalibrationState => "calibration_state",
            Channel::ModelOutput => "model_output",
            Channel::RadarState => "radar_state",
            Channel::PlannerTrajectory => "planner_trajectory",
            Channel::ThermalState => "thermal_state",
            Channel::Control => "control",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of one zero-timeout poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    pub frame: bool,
    channels: [bool; 7],
}

impl Readiness {
    pub fn set(&mut self, channel: Channel) {
        self.channels[channel.index()] = true;
    }

    pub fn with(mut self, channel: Channel) -> Self {
        self.set(channel);
        self
    }

    pub fn is_ready(&self, channel: Channel) -> bool {
        self.channels[channel.index()]
    }

    pub fn any(&self) -> bool {
        self.frame || self.channels.iter().any(|ready| *ready)
    }

    /// Any of the activity channels is ready
    pub fn activity(&self) -> bool {
        Channel::ALL
            .iter()
            .any(|c| c.counts_as_activity() && self.is_ready(*c))
    }

    /// Highest-priority ready typed channel
    pub fn first_typed(&self) -> Option<Channel> {
        Channel::TYPED.into_iter().find(|c| self.is_ready(*c))
    }
}

/// The set of inputs the dispatcher drains
pub trait ChannelSet {
    /// Zero-timeout poll over every channel plus the frame descriptor, if any
    fn poll(&mut self, frame_fd: Option<RawFd>) -> TransportResult<Readiness>;

    /// Take one message from a channel; `None` if nothing is queued
    fn recv(&mut self, channel: Channel) -> TransportResult<Option<Vec<u8>>>;
}

/// ZMQ SUB sockets, one per channel
pub struct ZmqChannelSet {
    subs: Vec<(Channel, ZmqSub)>,
}

impl ZmqChannelSet {
    /// Connect and subscribe (empty filter) to every endpoint
    pub fn connect(
        context: &zmq::Context,
        endpoints: &[(Channel, String)],
    ) -> TransportResult<Self> {
        let mut subs = Vec::with_capacity(endpoints.len());
        for (channel, address) in endpoints {
            let mut sub = ZmqSub::new(context.clone(), ClientConfig::new(address.as_str()))?;
            sub.start()?;
            subs.push((*channel, sub));
        }
        info!("[BUS] Subscribed to {} channels", subs.len());
        Ok(Self { subs })
    }

    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.subs.iter().map(|(channel, _)| *channel)
    }
}

impl ChannelSet for ZmqChannelSet {
    fn poll(&mut self, frame_fd: Option<RawFd>) -> TransportResult<Readiness> {
        let mut items = Vec::with_capacity(self.subs.len() + 1);
        for (_, sub) in &self.subs {
            items.push(sub.poll_item(zmq::POLLIN)?);
        }
        if let Some(fd) = frame_fd {
            items.push(zmq::PollItem::from_fd(fd, zmq::POLLIN));
        }

        zmq::poll(&mut items, 0)?;

        let mut readiness = Readiness::default();
        for ((channel, _), item) in self.subs.iter().zip(&items) {
            if item.is_readable() {
                readiness.set(*channel);
            }
        }
        if frame_fd.is_some() {
            // Hang-up and errors count as ready so the reader sees end of stream
            readiness.frame = items
                .last()
                .map(|item| item.is_readable() || item.is_error())
                .unwrap_or(false);
        }
        Ok(readiness)
    }

    fn recv(&mut self, channel: Channel) -> TransportResult<Option<Vec<u8>>> {
        let (_, sub) = self
            .subs
            .iter()
            .find(|(c, _)| *c == channel)
            .ok_or_else(|| {
                TransportError::InvalidConfig(format!("channel {} is not subscribed", channel))
            })?;
        Ok(sub.try_receive()?.map(|(_topic, data)| data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thermal_and_control_are_not_activity() {
        let ready = Readiness::default()
            .with(Channel::ThermalState)
            .with(Channel::Control);
        assert!(ready.any());
        assert!(!ready.activity());

        for channel in &Channel::TYPED[..5] {
            assert!(Readiness::default().with(*channel).activity());
        }
    }

    #[test]
    fn test_typed_priority_order() {
        let ready = Readiness::default()
            .with(Channel::ThermalState)
            .with(Channel::RadarState)
            .with(Channel::ModelOutput);
        assert_eq!(ready.first_typed(), Some(Channel::ModelOutput));
        assert_eq!(Readiness::default().with(Channel::Control).first_typed(), None);
    }

    #[test]
    fn test_frame_alone_is_ready() {
        let ready = Readiness {
            frame: true,
            ..Default::default()
        };
        assert!(ready.any());
        assert!(!ready.activity());
    }

    #[test]
    fn test_zmq_set_idle_poll_is_empty() {
        let context = zmq::Context::new();
        let endpoints = vec![
            (Channel::VehicleState, "inproc://bus-idle-vehicle".to_string()),
            (Channel::Control, "inproc://bus-idle-control".to_string()),
        ];
        let mut set = ZmqChannelSet::connect(&context, &endpoints).unwrap();
        assert_eq!(set.channels().count(), 2);

        let ready = set.poll(None).unwrap();
        assert!(!ready.any());
        assert!(set.recv(Channel::VehicleState).unwrap().is_none());
        assert!(set.recv(Channel::RadarState).is_err());
    }
}
