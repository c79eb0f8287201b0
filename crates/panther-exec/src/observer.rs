//! Lifecycle notifications for exec sessions.

use std::fmt;

use tracing::{error, info, warn};
use url::Url;

use crate::errors::SessionError;

/// How a connection ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Close code 1000.
    Normal,
    /// The server went away without a close handshake (or sent 1006).
    PeerGone,
    /// Any other close code, with the server's reason.
    Other {
        /// Close code from the frame (1005 when the frame had none).
        code: u16,
        /// Reason text from the frame.
        reason: String,
    },
}

impl CloseOutcome {
    /// Classify a received close code.
    pub fn from_code(code: u16, reason: &str) -> Self {
        match code {
            1000 => Self::Normal,
            1006 => Self::PeerGone,
            _ => Self::Other {
                code,
                reason: reason.to_string(),
            },
        }
    }

    /// Whether the server closed with code 1000.
    pub fn is_normal(&self) -> bool {
        matches!(self, Self::Normal)
    }
}

impl fmt::Display for CloseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => f.write_str("closed normally"),
            Self::PeerGone => f.write_str("server has gone"),
            Self::Other { code, reason } if reason.is_empty() => write!(f, "closed ({code})"),
            Self::Other { code, reason } => write!(f, "closed ({code}): {reason}"),
        }
    }
}

/// Receives session lifecycle events.
///
/// Every method has an empty default, so implementors override only what
/// they need. Calls happen on the session's reader task and must not block.
pub trait SessionObserver: Send + Sync {
    /// The handshake completed.
    fn opened(&self, _mode: &'static str, _url: &Url) {}

    /// The connection ended with a close outcome.
    fn closed(&self, _mode: &'static str, _outcome: &CloseOutcome) {}

    /// The connection failed with a transport error.
    fn failed(&self, _mode: &'static str, _error: &SessionError) {}

    /// An inbound frame was dropped because it did not decode.
    fn malformed(&self, _mode: &'static str, _reason: &str) {}
}

/// Default observer: writes each event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn opened(&self, mode: &'static str, url: &Url) {
        info!(mode, %url, "exec session initiated");
    }

    fn closed(&self, mode: &'static str, outcome: &CloseOutcome) {
        match outcome {
            CloseOutcome::Normal => info!(mode, "exec session terminated normally"),
            CloseOutcome::PeerGone => {
                error!(mode, "exec session abnormally terminated: server has gone");
            }
            CloseOutcome::Other { code, reason } => {
                info!(mode, code, reason = %reason, "exec session terminated");
            }
        }
    }

    fn failed(&self, mode: &'static str, error: &SessionError) {
        error!(mode, error = %error, "exec session failed");
    }

    fn malformed(&self, mode: &'static str, reason: &str) {
        warn!(mode, reason, "dropping undecodable exec frame");
    }
}
