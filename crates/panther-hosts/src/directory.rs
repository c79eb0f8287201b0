//! The host directory abstraction.

use async_trait::async_trait;
use panther_core::{Host, Target};

use crate::errors::Result;

/// CRUD over the backend's host records.
#[async_trait]
pub trait HostDirectory: Send + Sync {
    /// Register a new host; returns the stored record.
    async fn create(&self, host: &Host) -> Result<Host>;

    /// Replace an existing host; returns the stored record.
    async fn update(&self, host: &Host) -> Result<Host>;

    /// Hosts matching `target`, ordered by name.
    async fn fetch(&self, target: &Target) -> Result<Vec<Host>>;

    /// Remove the host called `name`.
    async fn delete(&self, name: &str) -> Result<()>;
}
