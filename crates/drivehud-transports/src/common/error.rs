//! Common error types for all transports

use std::fmt;

/// Result type alias for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Transport-agnostic error type
#[derive(Debug)]
pub enum TransportError {
    /// Failed to connect client socket
    ConnectFailed(String),

    /// Failed to send message
    SendFailed(String),

    /// Failed to receive message
    ReceiveFailed(String),

    /// Timeout occurred
    Timeout,

    /// Peer closed the connection (end of stream)
    ConnectionClosed,

    /// Transport is not running
    NotRunning,

    /// Transport is already running
    AlreadyRunning,

    /// Invalid configuration
    InvalidConfig(String),

    /// Message too large
    MessageTooLarge { size: usize, max_size: usize },

    /// Invalid message format
    InvalidMessage(String),

    /// ZMQ library error
    Zmq(zmq::Error),

    /// I/O error
    Io(std::io::Error),

    /// Serialization error
    Serialization(String),
}

impl TransportError {
    /// True for errors that mean the peer is gone rather than a single bad message
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            Self::ConnectionClosed | Self::Io(_) | Self::ReceiveFailed(_) | Self::SendFailed(_)
        )
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectFailed(msg) => write!(f, "Connect failed: {}", msg),
            Self::SendFailed(msg) => write!(f, "Send failed: {}", msg),
            Self::ReceiveFailed(msg) => write!(f, "Receive failed: {}", msg),
            Self::Timeout => write!(f, "Operation timed out"),
            Self::ConnectionClosed => write!(f, "Connection closed"),
            Self::NotRunning => write!(f, "Transport is not running"),
            Self::AlreadyRunning => write!(f, "Transport is already running"),
            Self::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Self::MessageTooLarge { size, max_size } => {
                write!(f, "Message too large: {} bytes (max: {})", size, max_size)
            }
            Self::InvalidMessage(msg) => write!(f, "Invalid message: {}", msg),
            Self::Zmq(e) => write!(f, "ZMQ error: {}", e),
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Zmq(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<zmq::Error> for TransportError {
    fn from(err: zmq::Error) -> Self {
        match err {
            zmq::Error::EAGAIN => Self::Timeout,
            _ => Self::Zmq(err),
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => Self::ConnectionClosed,
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => Self::Timeout,
            _ => Self::Io(err),
        }
    }
}

impl From<bincode::Error> for TransportError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<String> for TransportError {
    fn from(msg: String) -> Self {
        Self::InvalidConfig(msg)
    }
}
