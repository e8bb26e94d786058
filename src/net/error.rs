//! Network error types

use std::fmt;

/// Failures surfaced while setting up or using the network channels.
///
/// Errors inside a running receiver loop are logged and handled locally
/// (one bad message is dropped, a dead socket ends that loop); only setup
/// and outbound-send failures reach callers.
#[derive(Debug, Clone, PartialEq)]
pub enum NetError {
    /// Binding a local socket failed.
    Bind { endpoint: String, message: String },
    /// Configuring an already-bound socket failed.
    Socket { endpoint: String, message: String },
    /// An outbound datagram could not be sent.
    Send { endpoint: String, message: String },
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetError::Bind { endpoint, message } => {
                write!(f, "failed to bind {}: {}", endpoint, message)
            }
            NetError::Socket { endpoint, message } => {
                write!(f, "failed to configure socket {}: {}", endpoint, message)
            }
            NetError::Send { endpoint, message } => {
                write!(f, "failed to send to {}: {}", endpoint, message)
            }
        }
    }
}

impl std::error::Error for NetError {}

/// Result type for network operations.
pub type NetResult<T> = Result<T, NetError>;
