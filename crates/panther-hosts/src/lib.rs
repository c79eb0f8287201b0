//! # panther-hosts
//!
//! Client for the backend's host inventory.
//!
//! - [`HostDirectory`]: async CRUD trait over host records
//! - [`HttpHostDirectory`]: the `reqwest` implementation against `/api/v1/host`
//! - [`delete_batch`]: ordered deletion that stops at the first failure
//! - [`HostTable`]: a local list updated only after successful requests

#![deny(unsafe_code)]

pub mod batch;
pub mod directory;
pub mod errors;
pub mod http;
pub mod table;

pub use batch::delete_batch;
pub use directory::HostDirectory;
pub use errors::{BatchDeleteError, HostError, Result};
pub use http::HttpHostDirectory;
pub use table::HostTable;
