//! Command execution results streamed on a `cmd` session.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::UnknownOrdinal;
use super::meta::ObjectMeta;
use crate::payload::{self, PayloadError};

/// Lifecycle stage shared by host operations and system scans.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum State {
    /// Unset.
    #[default]
    Unknown,
    /// Accepted by the backend, waiting for an executor.
    Started,
    /// Forcibly aborted.
    Abort,
    /// Executing on the host.
    InProgress,
    /// Finished successfully.
    Success,
    /// Finished with an error.
    Failure,
}

impl State {
    /// Whether no further transitions are expected for this command or scan.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }

    /// Upper-case label used in tables and transcripts.
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "<null>",
            Self::Started => "STARTED",
            Self::Abort => "ABORT",
            Self::InProgress => "IN-PROGRESS",
            Self::Success => "COMPLETED",
            Self::Failure => "FAILED",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<u8> for State {
    type Error = UnknownOrdinal;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::Started),
            2 => Ok(Self::Abort),
            3 => Ok(Self::InProgress),
            4 => Ok(Self::Success),
            5 => Ok(Self::Failure),
            _ => Err(UnknownOrdinal { kind: "state", value }),
        }
    }
}

impl From<State> for u8 {
    fn from(state: State) -> Self {
        match state {
            State::Unknown => 0,
            State::Started => 1,
            State::Abort => 2,
            State::InProgress => 3,
            State::Success => 4,
            State::Failure => 5,
        }
    }
}

/// Who issued an operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OperationType {
    /// Unset.
    #[default]
    Unknown,
    /// Issued by the backend itself (periodic scans).
    Internal,
    /// Issued by an operator.
    User,
}

impl TryFrom<u8> for OperationType {
    type Error = UnknownOrdinal;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::Internal),
            2 => Ok(Self::User),
            _ => Err(UnknownOrdinal {
                kind: "operation type",
                value,
            }),
        }
    }
}

impl From<OperationType> for u8 {
    fn from(kind: OperationType) -> Self {
        match kind {
            OperationType::Unknown => 0,
            OperationType::Internal => 1,
            OperationType::User => 2,
        }
    }
}

/// How the executor captures command output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OperationMethod {
    /// Unset.
    #[default]
    Unknown,
    /// Exit status only.
    Run,
    /// Stdout.
    Output,
    /// Stdout and stderr interleaved.
    CombinedOutput,
}

impl TryFrom<u8> for OperationMethod {
    type Error = UnknownOrdinal;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::Run),
            2 => Ok(Self::Output),
            3 => Ok(Self::CombinedOutput),
            _ => Err(UnknownOrdinal {
                kind: "operation method",
                value,
            }),
        }
    }
}

impl From<OperationMethod> for u8 {
    fn from(method: OperationMethod) -> Self {
        match method {
            OperationMethod::Unknown => 0,
            OperationMethod::Run => 1,
            OperationMethod::Output => 2,
            OperationMethod::CombinedOutput => 3,
        }
    }
}

/// One command's progress on one host, as streamed on a `cmd` session.
///
/// `metadata.namespace` carries the target host name. `data` is the base64
/// encoded command output (or failure reason) once the state is terminal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostOperation {
    /// Object metadata; `namespace` is the target host.
    pub metadata: ObjectMeta,
    /// The shell command being executed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Issuer of the operation.
    #[serde(rename = "type")]
    pub kind: OperationType,
    /// Output capture method.
    pub method: OperationMethod,
    /// Executor timeout in seconds (0 means the executor default).
    pub timeout: u64,
    /// Current lifecycle stage.
    pub state: State,
    /// Base64 encoded output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl HostOperation {
    /// The host this operation runs on.
    pub fn target(&self) -> &str {
        self.metadata.namespace()
    }

    /// The command text, or an empty string when absent.
    pub fn command(&self) -> &str {
        self.command.as_deref().unwrap_or_default()
    }

    /// Decoded output text. Absent data decodes to an empty string.
    pub fn output(&self) -> Result<String, PayloadError> {
        self.data.as_deref().map_or_else(|| Ok(String::new()), payload::decode)
    }
}
