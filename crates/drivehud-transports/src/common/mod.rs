//! Common types and utilities for all transports

pub mod codec;
pub mod config;
pub mod error;

pub use codec::{decode, encode, read_frame, write_frame, MAX_PACKET_SIZE};
pub use config::{ClientConfig, TransportConfig, DEFAULT_MAX_MESSAGE_SIZE};
pub use error::{TransportError, TransportResult};
