//! Session modes.
//!
//! The mode is a type parameter of [`Session`](crate::Session), so the result
//! message type is fixed at compile time: a `scan` session yields scan
//! batches, a `cmd` session yields host operations.

use std::fmt;

use panther_core::{HostOperation, SystemScan, Target};
use serde::de::DeserializeOwned;

/// A channel mode of the exec endpoint.
pub trait ExecMode: Send + Sync + 'static {
    /// Value of the `mode` query parameter.
    const NAME: &'static str;

    /// One decoded inbound frame.
    type Message: DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static;

    /// Value of the `watch` query parameter, if the mode takes one.
    fn watch(target: &Target) -> Option<String>;

    /// Decode one text frame.
    fn decode(text: &str) -> serde_json::Result<Self::Message> {
        serde_json::from_str(text)
    }
}

/// Continuous vulnerability-scan watch.
#[derive(Debug, Clone, Copy)]
pub struct Scan;

impl ExecMode for Scan {
    const NAME: &'static str = "scan";
    type Message = Vec<SystemScan>;

    fn watch(target: &Target) -> Option<String> {
        Some(target.to_query())
    }

    /// The server writes an empty batch as `null`.
    fn decode(text: &str) -> serde_json::Result<Self::Message> {
        serde_json::from_str::<Option<Self::Message>>(text).map(Option::unwrap_or_default)
    }
}

/// One-shot command execution.
#[derive(Debug, Clone, Copy)]
pub struct Cmd;

impl ExecMode for Cmd {
    const NAME: &'static str = "cmd";
    type Message = HostOperation;

    fn watch(_target: &Target) -> Option<String> {
        None
    }
}
