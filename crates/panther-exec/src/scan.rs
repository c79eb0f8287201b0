//! Scan aggregation: the host table of a `scan` channel, severity views of
//! one host's findings, and remediation.

use std::collections::HashSet;

use panther_core::{Command, Order, SecurityUpdate, Severity, SystemScan};
use tracing::info;

use crate::dispatch::{CommandDispatch, DispatchReport, TranscriptLine};
use crate::errors::SessionError;
use crate::mode::{Cmd, Scan};
use crate::session::{ExecChannel, Session};

/// The latest scan batch plus a row selection.
#[derive(Clone, Debug, Default)]
pub struct ScanBoard {
    rows: Vec<SystemScan>,
    selected: Vec<String>,
}

impl ScanBoard {
    /// An empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every row with `batch`. Selected names that are no longer
    /// present are dropped from the selection.
    pub fn apply_batch(&mut self, batch: Vec<SystemScan>) {
        self.rows = batch;
        let present: HashSet<&str> = self.rows.iter().map(SystemScan::name).collect();
        self.selected.retain(|name| present.contains(name.as_str()));
    }

    /// Rows in server order.
    pub fn rows(&self) -> &[SystemScan] {
        &self.rows
    }

    /// The row for `name`.
    pub fn row(&self, name: &str) -> Option<&SystemScan> {
        self.rows.iter().find(|r| r.name() == name)
    }

    /// Rows whose name contains `term`, ignoring case. An empty term
    /// matches everything.
    pub fn search(&self, term: &str) -> Vec<&SystemScan> {
        let needle = term.trim().to_lowercase();
        self.rows
            .iter()
            .filter(|r| r.name().to_lowercase().contains(&needle))
            .collect()
    }

    /// Select `name`. Returns `false` when no such row exists.
    pub fn select(&mut self, name: &str) -> bool {
        if self.row(name).is_none() {
            return false;
        }
        if !self.is_selected(name) {
            self.selected.push(name.to_string());
        }
        true
    }

    /// Remove `name` from the selection.
    pub fn deselect(&mut self, name: &str) {
        self.selected.retain(|n| n != name);
    }

    /// Whether `name` is selected.
    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.iter().any(|n| n == name)
    }

    /// Whether the selection covers every row.
    pub fn is_all_selected(&self) -> bool {
        self.selected.len() == self.rows.len()
    }

    /// Clear the selection if everything is selected, otherwise select
    /// every row.
    pub fn toggle_all(&mut self) {
        if self.is_all_selected() {
            self.selected.clear();
        } else {
            self.selected = self.rows.iter().map(|r| r.name().to_string()).collect();
        }
    }

    /// Selected names, in selection order.
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    /// A bare re-scan command per selected row. Clears the selection.
    pub fn rescan_order(&mut self) -> Order {
        self.selected.drain(..).map(Command::rescan).collect()
    }
}

/// One host's findings split by severity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeverityBreakdown<'a> {
    /// Critical findings.
    pub critical: Vec<&'a SecurityUpdate>,
    /// Important findings.
    pub important: Vec<&'a SecurityUpdate>,
    /// Moderate findings.
    pub moderate: Vec<&'a SecurityUpdate>,
}

impl<'a> SeverityBreakdown<'a> {
    /// Partition `updates` by exact severity. Findings of unknown severity
    /// appear in no partition.
    pub fn of(updates: &'a [SecurityUpdate]) -> Self {
        let mut breakdown = Self::default();
        for update in updates {
            match update.severity {
                Severity::Critical => breakdown.critical.push(update),
                Severity::Important => breakdown.important.push(update),
                Severity::Moderate => breakdown.moderate.push(update),
                Severity::Unknown => {}
            }
        }
        breakdown
    }

    /// The partition for `severity`; empty for `Unknown`.
    pub fn get(&self, severity: Severity) -> &[&'a SecurityUpdate] {
        match severity {
            Severity::Critical => &self.critical,
            Severity::Important => &self.important,
            Severity::Moderate => &self.moderate,
            Severity::Unknown => &[],
        }
    }

    /// Findings across all three partitions.
    pub fn total(&self) -> usize {
        self.critical.len() + self.important.len() + self.moderate.len()
    }
}

/// Packages to install on one host.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemediationPlan {
    target: String,
    packages: Vec<String>,
}

impl RemediationPlan {
    /// An empty plan for `target`.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            packages: Vec::new(),
        }
    }

    /// Plan the packages of `selected` findings on the scanned host.
    pub fn from_selection<'a, I>(scan: &SystemScan, selected: I) -> Self
    where
        I: IntoIterator<Item = &'a SecurityUpdate>,
    {
        let mut plan = Self::new(scan.name());
        for update in selected {
            plan.add_package(&update.package);
        }
        plan
    }

    /// Plan every finding of the given severities, in the order the
    /// severities are listed.
    pub fn for_severities(scan: &SystemScan, severities: &[Severity]) -> Self {
        let breakdown = SeverityBreakdown::of(&scan.security);
        Self::from_selection(
            scan,
            severities
                .iter()
                .flat_map(|s| breakdown.get(*s).iter().copied()),
        )
    }

    /// Add a package unless it is already planned.
    pub fn add_package(&mut self, package: &str) {
        if !package.is_empty() && !self.packages.iter().any(|p| p == package) {
            self.packages.push(package.to_string());
        }
    }

    /// Host to remediate.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Planned packages in first-seen order.
    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// Whether nothing is planned.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// The install command for `package_manager`, e.g.
    /// `yum install -y openssl bash`.
    pub fn command(&self, package_manager: &str) -> Command {
        Command::run(
            self.target.clone(),
            format!("{package_manager} install -y {}", self.packages.join(" ")),
        )
    }
}

/// Install the planned packages through `cmd`, then ask `scan` to re-scan
/// the host.
///
/// `cmd` is connected here and disconnected once the install finishes. The
/// re-scan is sent whenever the dispatch ran, whether or not the install
/// succeeded.
pub async fn remediate<F>(
    cmd: &Session<Cmd>,
    scan: &ExecChannel<Scan>,
    plan: &RemediationPlan,
    package_manager: &str,
    on_line: F,
) -> Result<DispatchReport, SessionError>
where
    F: FnMut(&TranscriptLine),
{
    if plan.is_empty() {
        return Err(SessionError::EmptyOrder);
    }

    let channel = cmd.connect().await?;
    let mut dispatch = CommandDispatch::new(Order::new(vec![plan.command(package_manager)]));
    let outcome = dispatch.run(&channel, on_line).await;
    let closed = cmd.disconnect().await;
    let report = outcome?;
    closed?;

    info!(
        target_host = plan.target(),
        packages = plan.packages().len(),
        "remediation dispatched, requesting re-scan"
    );
    scan.send(&Order::new(vec![Command::rescan(plan.target())]))
        .await?;
    Ok(report)
}
