//! Outbound selection uplink
//!
//! Target selections travel upstream as a single raw UTF-8 datagram
//! holding the selected body's display name, fire and forget.

use crate::net::error::{NetError, NetResult};
use std::net::UdpSocket;

/// Bound-once UDP sender for selection messages.
pub struct SelectionUplink {
    socket: UdpSocket,
    target: String,
}

impl SelectionUplink {
    /// Bind an ephemeral local port for sending to `target`
    /// (`host:port` of the upstream pointing process).
    pub fn new(target: impl Into<String>) -> NetResult<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0").map_err(|e| NetError::Bind {
            endpoint: "0.0.0.0:0".to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            socket,
            target: target.into(),
        })
    }

    /// Send one selection. Best-effort: the caller logs a failure and
    /// moves on, there is no retry.
    pub fn send_selection(&self, name: &str) -> NetResult<()> {
        self.socket
            .send_to(name.as_bytes(), &self.target)
            .map_err(|e| NetError::Send {
                endpoint: self.target.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}
