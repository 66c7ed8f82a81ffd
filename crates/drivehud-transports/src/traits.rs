// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Transport trait definitions
//!
//! These traits define the common interface for the transports the
//! dashboard consumes. Sockets move between threads but are never shared,
//! so the bound is `Send` only.

use crate::common::TransportResult;

/// Base transport trait - implemented by all transports
pub trait Transport: Send {
    /// Start the transport
    fn start(&mut self) -> TransportResult<()>;

    /// Stop the transport
    fn stop(&mut self) -> TransportResult<()>;

    /// Check if transport is running
    fn is_running(&self) -> bool;

    /// Get transport name/type
    fn transport_type(&self) -> &str;
}

/// Publish-Subscribe pattern (Subscriber side)
///
/// Used for receiving broadcast messages from publishers.
pub trait Subscriber: Transport {
    /// Subscribe to a topic
    fn subscribe(&mut self, topic: &[u8]) -> TransportResult<()>;

    /// Unsubscribe from a topic
    fn unsubscribe(&mut self, topic: &[u8]) -> TransportResult<()>;

    /// Receive a published message (blocking)
    fn receive(&self) -> TransportResult<(Vec<u8>, Vec<u8>)>; // (topic, data)

    /// Receive a message if one is queued, without blocking
    fn try_receive(&self) -> TransportResult<Option<(Vec<u8>, Vec<u8>)>>;
}
