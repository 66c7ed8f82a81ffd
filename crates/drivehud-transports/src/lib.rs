// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! # drivehud-transports
//!
//! Transport layer for the dashboard core:
//!
//! ### ZMQ (ZeroMQ)
//! - **Client**: SUB sockets for the typed telemetry channels and the
//!   single-byte control channel
//!
//! ### Local IPC
//! - **Client**: Unix-domain stream carrying length-prefixed bincode packets,
//!   used by the frame channel
//!
//! Both expose their file descriptor or poll item so a single zero-timeout
//! `zmq::poll` can watch every input at once.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod common;
pub mod ipc;
pub mod traits;
pub mod zmq;

pub use common::{
    ClientConfig, TransportConfig, TransportError, TransportResult, MAX_PACKET_SIZE,
};
pub use ipc::IpcStream;
pub use traits::{Subscriber, Transport};
pub use zmq::ZmqSub;

pub mod prelude {
    pub use crate::common::{ClientConfig, TransportConfig, TransportError, TransportResult};
    pub use crate::ipc::IpcStream;
    pub use crate::traits::{Subscriber, Transport};
    pub use crate::zmq::ZmqSub;
}
