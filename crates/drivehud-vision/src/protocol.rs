// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Frame channel wire protocol
//!
//! ```text
//! client                         producer
//!   Subscribe{Primary}    ──►
//!   Subscribe{Secondary}  ──►
//!                         ◄──  BufferDescriptors{Primary}
//!                         ◄──  BufferDescriptors{Secondary}
//!                         ◄──  Acquire{stream, slot}
//!   Release{stream, prev} ──►
//! ```
//!
//! Each packet travels as a length-prefixed bincode frame over the IPC stream.

use std::path::PathBuf;

use drivehud_scene::{FrameGeometry, StreamKind};
use serde::{Deserialize, Serialize};

/// Slots per stream ring
pub const SLOT_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VisionPacket {
    /// Client asks for a stream; tear-buffered delivery hands out whole slots
    Subscribe {
        stream: StreamKind,
        tear_buffered: bool,
    },
    /// Producer describes the ring it will fill for a stream
    BufferDescriptors(StreamBufs),
    /// Producer finished a frame in `slot`
    Acquire { stream: StreamKind, slot: u32 },
    /// Client gives `slot` back
    Release { stream: StreamKind, slot: u32 },
}

impl VisionPacket {
    pub fn kind(&self) -> &'static str {
        match self {
            VisionPacket::Subscribe { .. } => "Subscribe",
            VisionPacket::BufferDescriptors(_) => "BufferDescriptors",
            VisionPacket::Acquire { .. } => "Acquire",
            VisionPacket::Release { .. } => "Release",
        }
    }
}

/// Ring description sent in reply to a subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamBufs {
    pub stream: StreamKind,
    pub slot_count: u32,
    /// Bytes in each slot
    pub slot_size: u64,
    /// One memory-mappable file per slot, e.g. under `/dev/shm`
    pub shared_handles: Vec<PathBuf>,
    pub geometry: FrameGeometry,
}
