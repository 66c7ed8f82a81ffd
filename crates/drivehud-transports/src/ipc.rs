// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Local IPC stream (Unix-domain socket, client side)
//!
//! Packets are framed by [`crate::common::codec`]. Reads go straight to the
//! socket without user-space buffering, so poll readiness on [`IpcStream::raw_fd`]
//! always reflects whether a packet is waiting.

use std::net::Shutdown;
use std::os::unix::io::{AsRawFd, RawFd};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::common::{read_frame, write_frame, TransportError, TransportResult, MAX_PACKET_SIZE};

/// Connected, framed Unix-domain stream
#[derive(Debug)]
pub struct IpcStream {
    stream: UnixStream,
    peer: String,
}

impl IpcStream {
    /// Connect to a listening socket at `path`
    pub fn connect(path: &Path) -> TransportResult<Self> {
        let stream = UnixStream::connect(path).map_err(|e| {
            TransportError::ConnectFailed(format!("{}: {}", path.display(), e))
        })?;
        debug!("[IPC] Connected to {}", path.display());
        Ok(Self {
            stream,
            peer: path.display().to_string(),
        })
    }

    /// Wrap an already connected stream (e.g. one end of `UnixStream::pair`)
    pub fn from_stream(stream: UnixStream) -> Self {
        Self {
            stream,
            peer: "<unnamed>".to_string(),
        }
    }

    /// Bound how long [`IpcStream::recv`] waits for the rest of a packet;
    /// `None` blocks indefinitely
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> TransportResult<()> {
        self.stream.set_read_timeout(timeout)?;
        Ok(())
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Send one packet
    pub fn send<T: Serialize>(&mut self, packet: &T) -> TransportResult<()> {
        write_frame(&mut self.stream, packet).map_err(|e| match e {
            TransportError::Io(io) => TransportError::SendFailed(io.to_string()),
            other => other,
        })
    }

    /// Block until one packet arrives, or the read timeout expires
    ///
    /// A timeout may leave a partial packet consumed; the stream is then out
    /// of sync and must be closed.
    pub fn recv<T: DeserializeOwned>(&mut self) -> TransportResult<T> {
        read_frame(&mut self.stream, MAX_PACKET_SIZE)
    }

    /// Descriptor for readiness polling
    pub fn raw_fd(&self) -> RawFd {
        self.stream.as_raw_fd()
    }

    /// Close both directions; later reads and writes fail
    pub fn close(&self) {
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            debug!("[IPC] Shutdown of {} reported: {}", self.peer, e);
        }
    }
}

impl AsRawFd for IpcStream {
    fn as_raw_fd(&self) -> RawFd {
        self.raw_fd()
    }
}
