//! Caller-owned host list kept in step with the directory.

use panther_core::{Host, Target};

use crate::directory::HostDirectory;
use crate::errors::Result;

/// Local view of host records, ordered by name.
///
/// The directory-backed methods change the table only after the request
/// succeeds, so a failed call leaves it as it was.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostTable {
    hosts: Vec<Host>,
}

impl HostTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every row.
    pub fn replace(&mut self, hosts: Vec<Host>) {
        self.hosts = hosts;
        self.hosts.sort_by(|a, b| a.name().cmp(b.name()));
    }

    /// Insert `host`, or overwrite the row with the same name.
    pub fn upsert(&mut self, host: Host) {
        match self.hosts.binary_search_by(|h| h.name().cmp(host.name())) {
            Ok(i) => self.hosts[i] = host,
            Err(i) => self.hosts.insert(i, host),
        }
    }

    /// Remove the row called `name`.
    pub fn remove(&mut self, name: &str) -> Option<Host> {
        let i = self.hosts.iter().position(|h| h.name() == name)?;
        Some(self.hosts.remove(i))
    }

    /// The row called `name`.
    pub fn get(&self, name: &str) -> Option<&Host> {
        self.hosts.iter().find(|h| h.name() == name)
    }

    /// Rows ordered by name.
    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Reload from `directory`.
    pub async fn refresh<D>(&mut self, directory: &D, target: &Target) -> Result<()>
    where
        D: HostDirectory + ?Sized,
    {
        let hosts = directory.fetch(target).await?;
        self.replace(hosts);
        Ok(())
    }

    /// Create `host` and add the stored record.
    pub async fn create<D>(&mut self, directory: &D, host: &Host) -> Result<()>
    where
        D: HostDirectory + ?Sized,
    {
        let stored = directory.create(host).await?;
        self.upsert(stored);
        Ok(())
    }

    /// Update `host` and overwrite its row with the stored record.
    pub async fn update<D>(&mut self, directory: &D, host: &Host) -> Result<()>
    where
        D: HostDirectory + ?Sized,
    {
        let stored = directory.update(host).await?;
        self.upsert(stored);
        Ok(())
    }

    /// Delete `name` and drop its row.
    pub async fn delete<D>(&mut self, directory: &D, name: &str) -> Result<()>
    where
        D: HostDirectory + ?Sized,
    {
        directory.delete(name).await?;
        let _ = self.remove(name);
        Ok(())
    }
}
