//! Common configuration types for transports

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest packet accepted on any transport unless configured otherwise
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Generic transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Address to connect to (`tcp://`, `ipc://`, `inproc://` or a socket path)
    pub address: String,

    /// High water mark for receive buffer (0 = unlimited)
    pub recv_hwm: usize,

    /// Linger time on close (None = immediate)
    pub linger: Option<Duration>,

    /// Maximum message size (None = unlimited)
    pub max_message_size: Option<usize>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            address: "tcp://127.0.0.1:8007".to_string(),
            recv_hwm: 1000,
            linger: None,
            max_message_size: Some(DEFAULT_MAX_MESSAGE_SIZE),
        }
    }
}

impl TransportConfig {
    /// Create a new config with the given address
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    /// Set receive high water mark
    pub fn with_recv_hwm(mut self, hwm: usize) -> Self {
        self.recv_hwm = hwm;
        self
    }

    /// Set linger time
    pub fn with_linger(mut self, linger: Duration) -> Self {
        self.linger = Some(linger);
        self
    }

    /// Set maximum message size
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = Some(size);
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.address.is_empty() {
            return Err("Address cannot be empty".to_string());
        }

        if let Some(max_size) = self.max_message_size {
            if max_size == 0 {
                return Err("Maximum message size must be greater than 0".to_string());
            }
        }

        Ok(())
    }
}

/// Client-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base transport config
    #[serde(flatten)]
    pub base: TransportConfig,

    /// Topic filters installed on start; an empty filter receives everything
    pub subscriptions: Vec<Vec<u8>>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base: TransportConfig::default(),
            subscriptions: vec![Vec::new()],
        }
    }
}

impl ClientConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            base: TransportConfig::new(address),
            ..Default::default()
        }
    }
}
