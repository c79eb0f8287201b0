//! Wire types for the exec channel and the host directory.
//!
//! Enumerations are encoded on the wire as integer ordinals and a missing
//! field decodes to the `Unknown` variant, matching the backend's
//! `omitempty` encoding of zero values.

pub mod host;
pub mod meta;
pub mod operation;
pub mod order;
pub mod scan;

pub use host::{Host, LoginCredential};
pub use meta::ObjectMeta;
pub use operation::{HostOperation, OperationMethod, OperationType, State};
pub use order::{Command, Order, Target};
pub use scan::{SecurityUpdate, Severity, SystemScan};

use thiserror::Error;

/// An integer enum ordinal outside the known range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} ordinal {value}")]
pub struct UnknownOrdinal {
    /// Which enumeration rejected the value.
    pub kind: &'static str,
    /// The rejected ordinal.
    pub value: u8,
}
