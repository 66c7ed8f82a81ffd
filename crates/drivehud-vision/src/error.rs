// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Frame channel errors
//!
//! Every variant ends the connection; the connector retries on its own cadence.

use std::path::PathBuf;

use drivehud_scene::StreamKind;
use drivehud_transports::TransportError;

pub type VisionResult<T> = Result<T, VisionError>;

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("Frame channel transport failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("Unexpected reply: expected {expected}, got {got}")]
    UnexpectedReply { expected: String, got: String },

    #[error("Slot {slot} out of range for {stream} stream ({count} slots)")]
    SlotOutOfRange {
        stream: StreamKind,
        slot: usize,
        count: usize,
    },

    #[error("Slot {slot} of {stream} stream acquired while still leased")]
    SlotStillLeased { stream: StreamKind, slot: usize },

    #[error("Failed to map slot buffer {path}: {source}")]
    Map {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Frame channel is not connected")]
    NotConnected,
}

impl VisionError {
    /// Orderly close by the producer rather than a fault
    pub fn is_peer_closed(&self) -> bool {
        matches!(self, VisionError::Transport(TransportError::ConnectionClosed))
    }
}
