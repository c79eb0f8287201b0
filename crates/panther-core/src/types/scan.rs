//! Vulnerability scan snapshots streamed on a `scan` session.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::UnknownOrdinal;
use super::meta::ObjectMeta;
use super::operation::State;

/// Vendor severity of a security advisory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Severity {
    /// Unset or unrecognised by the scanner.
    #[default]
    Unknown,
    /// Critical.
    Critical,
    /// Important.
    Important,
    /// Moderate.
    Moderate,
}

impl Severity {
    /// The three actionable severities, most severe first.
    pub const ACTIONABLE: [Self; 3] = [Self::Critical, Self::Important, Self::Moderate];

    /// Human label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "<null>",
            Self::Critical => "Critical",
            Self::Important => "Important",
            Self::Moderate => "Moderate",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<u8> for Severity {
    type Error = UnknownOrdinal;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::Critical),
            2 => Ok(Self::Important),
            3 => Ok(Self::Moderate),
            _ => Err(UnknownOrdinal {
                kind: "severity",
                value,
            }),
        }
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Unknown => 0,
            Severity::Critical => 1,
            Severity::Important => 2,
            Severity::Moderate => 3,
        }
    }
}

/// One pending security update on a host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityUpdate {
    /// CVE identifier.
    pub cve_id: String,
    /// Advisory severity.
    pub severity: Severity,
    /// Package that fixes the advisory.
    pub package: String,
}

impl SecurityUpdate {
    /// Build a finding.
    pub fn new(cve_id: impl Into<String>, severity: Severity, package: impl Into<String>) -> Self {
        Self {
            cve_id: cve_id.into(),
            severity,
            package: package.into(),
        }
    }
}

/// Latest scan result for one host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemScan {
    /// Object metadata; `name` is the host name.
    pub metadata: ObjectMeta,
    /// Scan lifecycle stage.
    pub state: State,
    /// Pending security updates found by the last scan.
    #[serde(deserialize_with = "null_as_empty")]
    pub security: Vec<SecurityUpdate>,
}

impl SystemScan {
    /// The scanned host.
    pub fn name(&self) -> &str {
        self.metadata.name()
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
