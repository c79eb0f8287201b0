//! # panther-core
//!
//! Foundation types shared by every Panther crate:
//!
//! - [`types`]: wire shapes for exec orders, command results, scans and hosts
//! - [`payload`]: base64 transcoding of command output and credentials
//! - [`logging`]: `tracing` subscriber setup and log capture for tests
//!
//! Nothing in this crate performs I/O; it is the envelope codec the session
//! and host directory crates build on.

#![deny(unsafe_code)]

pub mod logging;
pub mod payload;
pub mod types;

pub use payload::PayloadError;
pub use types::{
    Command, Host, HostOperation, LoginCredential, ObjectMeta, OperationMethod, OperationType,
    Order, SecurityUpdate, Severity, State, SystemScan, Target, UnknownOrdinal,
};
