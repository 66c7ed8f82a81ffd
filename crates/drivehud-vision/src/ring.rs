// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Per-stream slot rings
//!
//! A ring owns the mapped slot buffers of one stream and the index of the
//! slot currently leased to the UI. The scene only ever holds weak
//! references into it, so dropping the ring invalidates them all at once.

use std::fs::File;
use std::sync::Arc;

use drivehud_scene::{FrameBuffer, FrameGeometry, FrameRef, StreamKind};
use memmap2::Mmap;

use crate::error::{VisionError, VisionResult};
use crate::protocol::{StreamBufs, SLOT_COUNT};

/// Read-only mapping of one producer slot
pub struct MappedSlot {
    mmap: Mmap,
}

impl MappedSlot {
    fn open(path: &std::path::Path, min_len: u64) -> VisionResult<Self> {
        let map_err = |source| VisionError::Map {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(map_err)?;
        let len = file.metadata().map_err(map_err)?.len();
        if len < min_len {
            return Err(map_err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("slot is {} bytes, descriptor promised {}", len, min_len),
            )));
        }

        // The producer only writes a slot while the UI does not hold it
        let mmap = unsafe { Mmap::map(&file) }.map_err(map_err)?;
        Ok(Self { mmap })
    }
}

impl FrameBuffer for MappedSlot {
    fn bytes(&self) -> &[u8] {
        &self.mmap
    }
}

pub struct SlotRing {
    stream: StreamKind,
    slots: Vec<Arc<dyn FrameBuffer>>,
    leased: Option<usize>,
    geometry: FrameGeometry,
}

impl SlotRing {
    /// Map every slot named by a descriptor reply
    pub fn map(bufs: &StreamBufs) -> VisionResult<Self> {
        if bufs.slot_count as usize != SLOT_COUNT || bufs.shared_handles.len() != SLOT_COUNT {
            return Err(VisionError::ProtocolViolation(format!(
                "{} stream offered {} slots with {} handles, expected {}",
                bufs.stream,
                bufs.slot_count,
                bufs.shared_handles.len(),
                SLOT_COUNT
            )));
        }
        if bufs.slot_size == 0 {
            return Err(VisionError::ProtocolViolation(format!(
                "{} stream offered empty slots",
                bufs.stream
            )));
        }

        let slots = bufs
            .shared_handles
            .iter()
            .map(|path| {
                MappedSlot::open(path, bufs.slot_size).map(|s| Arc::new(s) as Arc<dyn FrameBuffer>)
            })
            .collect::<VisionResult<Vec<_>>>()?;

        Self::from_buffers(bufs.stream, slots, bufs.geometry)
    }

    /// Build a ring over buffers that are already in memory
    pub fn from_buffers(
        stream: StreamKind,
        slots: Vec<Arc<dyn FrameBuffer>>,
        geometry: FrameGeometry,
    ) -> VisionResult<Self> {
        if slots.len() != SLOT_COUNT {
            return Err(VisionError::ProtocolViolation(format!(
                "{} stream ring needs {} slots, got {}",
                stream,
                SLOT_COUNT,
                slots.len()
            )));
        }
        Ok(Self {
            stream,
            slots,
            leased: None,
            geometry,
        })
    }

    pub fn stream(&self) -> StreamKind {
        self.stream
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    /// Slot currently held by the UI
    pub fn leased(&self) -> Option<usize> {
        self.leased
    }

    pub fn slot(&self, index: usize) -> Option<&Arc<dyn FrameBuffer>> {
        self.slots.get(index)
    }

    /// Check an acquire before anything is sent; returns the slot to release
    ///
    /// A slot that is still leased cannot be handed out again, since the
    /// producer must have had it back first.
    pub fn prepare_acquire(&self, slot: usize) -> VisionResult<Option<usize>> {
        if slot >= self.slots.len() {
            return Err(VisionError::SlotOutOfRange {
                stream: self.stream,
                slot,
                count: self.slots.len(),
            });
        }
        if self.leased == Some(slot) {
            return Err(VisionError::SlotStillLeased {
                stream: self.stream,
                slot,
            });
        }
        Ok(self.leased)
    }

    /// Record `slot` as leased once the previous one has been released
    pub fn commit_acquire(&mut self, slot: usize) -> FrameRef {
        self.leased = Some(slot);
        FrameRef::new(slot, &self.slots[slot])
    }
}
