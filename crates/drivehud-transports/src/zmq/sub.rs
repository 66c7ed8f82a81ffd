//! ZMQ SUB pattern (client-side publish-subscribe)
//!
//! SUB sockets are used for receiving broadcast messages from PUB servers.
//! Subscribers can filter messages by topic.

use crate::common::{ClientConfig, TransportError, TransportResult};
use crate::traits::{Subscriber, Transport};
use tracing::{debug, info};

/// ZMQ SUB socket implementation (subscriber)
pub struct ZmqSub {
    context: zmq::Context,
    config: ClientConfig,
    socket: Option<zmq::Socket>,
}

impl ZmqSub {
    /// Create a new SUB socket
    pub fn new(context: zmq::Context, config: ClientConfig) -> TransportResult<Self> {
        config.base.validate()?;

        Ok(Self {
            context,
            config,
            socket: None,
        })
    }

    /// Create with default context
    pub fn with_address(address: impl Into<String>) -> TransportResult<Self> {
        let context = zmq::Context::new();
        let config = ClientConfig::new(address);
        Self::new(context, config)
    }

    /// Address this subscriber connects to
    pub fn address(&self) -> &str {
        &self.config.base.address
    }

    /// Poll item for use with `zmq::poll` alongside other sockets and fds
    pub fn poll_item(&self, events: zmq::PollEvents) -> TransportResult<zmq::PollItem<'_>> {
        let sock = self.socket.as_ref().ok_or(TransportError::NotRunning)?;
        Ok(sock.as_poll_item(events))
    }

    /// Receive one message: `Ok(None)` only when non-blocking and nothing is queued
    fn recv_parts(&self, flags: i32) -> TransportResult<Option<(Vec<u8>, Vec<u8>)>> {
        let sock = self.socket.as_ref().ok_or(TransportError::NotRunning)?;

        // Receive multipart message: [topic, data]
        let mut topic_msg = zmq::Message::new();
        match sock.recv(&mut topic_msg, flags) {
            Ok(()) => {}
            Err(zmq::Error::EAGAIN) => return Ok(None),
            Err(e) => return Err(TransportError::ReceiveFailed(e.to_string())),
        }

        let (topic, data) = if sock.get_rcvmore()? {
            let mut data_msg = zmq::Message::new();
            sock.recv(&mut data_msg, 0)
                .map_err(|e| TransportError::ReceiveFailed(e.to_string()))?;
            (topic_msg.to_vec(), data_msg.to_vec())
        } else {
            // Single-part message (no topic separator)
            (Vec::new(), topic_msg.to_vec())
        };

        // Extra frames have no meaning here; drain them so the next read starts clean
        while sock.get_rcvmore()? {
            let mut extra = zmq::Message::new();
            sock.recv(&mut extra, 0)
                .map_err(|e| TransportError::ReceiveFailed(e.to_string()))?;
            debug!(
                "[ZMQ-SUB] Discarded trailing frame of {} bytes from {}",
                extra.len(),
                self.config.base.address
            );
        }

        if let Some(max_size) = self.config.base.max_message_size {
            if data.len() > max_size {
                return Err(TransportError::MessageTooLarge {
                    size: data.len(),
                    max_size,
                });
            }
        }

        Ok(Some((topic, data)))
    }
}

impl Transport for ZmqSub {
    fn start(&mut self) -> TransportResult<()> {
        if self.socket.is_some() {
            return Err(TransportError::AlreadyRunning);
        }

        // Create SUB socket
        let socket = self.context.socket(zmq::SUB)?;

        // Set socket options
        let linger_ms = self
            .config
            .base
            .linger
            .map(|d| d.as_millis() as i32)
            .unwrap_or(0);
        socket.set_linger(linger_ms)?;
        socket.set_rcvhwm(self.config.base.recv_hwm as i32)?;
        socket.set_conflate(false)?; // Keep all messages

        // Connect socket
        socket
            .connect(&self.config.base.address)
            .map_err(|e| TransportError::ConnectFailed(e.to_string()))?;

        for topic in &self.config.subscriptions {
            socket.set_subscribe(topic)?;
        }

        self.socket = Some(socket);

        info!("[ZMQ-SUB] Connected to {}", self.config.base.address);

        Ok(())
    }

    fn stop(&mut self) -> TransportResult<()> {
        self.socket = None;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.socket.is_some()
    }

    fn transport_type(&self) -> &str {
        "zmq-sub"
    }
}

impl Subscriber for ZmqSub {
    fn subscribe(&mut self, topic: &[u8]) -> TransportResult<()> {
        let sock = self.socket.as_ref().ok_or(TransportError::NotRunning)?;
        sock.set_subscribe(topic)?;
        Ok(())
    }

    fn unsubscribe(&mut self, topic: &[u8]) -> TransportResult<()> {
        let sock = self.socket.as_ref().ok_or(TransportError::NotRunning)?;
        sock.set_unsubscribe(topic)?;
        Ok(())
    }

    fn receive(&self) -> TransportResult<(Vec<u8>, Vec<u8>)> {
        self.recv_parts(0)?.ok_or(TransportError::Timeout)
    }

    fn try_receive(&self) -> TransportResult<Option<(Vec<u8>, Vec<u8>)>> {
        self.recv_parts(zmq::DONTWAIT)
    }
}
