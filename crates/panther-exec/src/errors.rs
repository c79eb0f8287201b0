//! Exec session error types.

use thiserror::Error;

/// Errors from exec sessions and the workflows built on them.
///
/// `Clone` so a terminal error can be delivered to every subscriber of a
/// result stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The WebSocket handshake failed.
    #[error("failed to open exec session at {url}: {message}")]
    Connect {
        /// Endpoint that was dialled.
        url: String,
        /// Underlying failure.
        message: String,
    },

    /// The connection failed after it was established.
    #[error("exec transport error: {message}")]
    Transport {
        /// Underlying failure.
        message: String,
    },

    /// `send` was called on a session that was never connected.
    #[error("exec session is not connected; call connect() first")]
    NotConnected,

    /// The connection has terminated.
    #[error("exec session is closed")]
    Closed,

    /// The session already made its single connection attempt.
    #[error("exec session was already used; create a new session to reconnect")]
    Spent,

    /// The order could not be serialised.
    #[error("failed to encode order: {message}")]
    Encode {
        /// Serializer message.
        message: String,
    },

    /// A workflow was asked to dispatch nothing.
    #[error("order has no commands")]
    EmptyOrder,
}

impl SessionError {
    /// Whether recreating the session could help.
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. } | Self::Transport { .. } | Self::Closed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_display() {
        let err = SessionError::Connect {
            url: "ws://localhost:8080/api/v1/exec?mode=cmd".into(),
            message: "connection refused".into(),
        };
        assert!(err.to_string().contains("mode=cmd"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn not_connected_display() {
        assert!(SessionError::NotConnected.to_string().contains("connect()"));
    }

    #[test]
    fn connection_failures() {
        assert!(SessionError::Closed.is_connection_failure());
        assert!(
            SessionError::Transport {
                message: "reset".into()
            }
            .is_connection_failure()
        );
        assert!(!SessionError::NotConnected.is_connection_failure());
        assert!(!SessionError::EmptyOrder.is_connection_failure());
    }
}
