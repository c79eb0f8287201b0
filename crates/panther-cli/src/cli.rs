//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use panther_core::Severity;
use panther_core::types::host::{DEFAULT_SSH_PORT, DEFAULT_SSH_USER};

/// Fleet command execution and vulnerability remediation.
#[derive(Parser, Debug)]
#[command(name = "panther", version, about)]
pub struct Cli {
    /// Backend origin, e.g. `http://panther:8080` (overrides settings).
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Settings file (defaults to `~/.panther/settings.json`).
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace (overrides settings).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the host inventory.
    Hosts {
        #[command(subcommand)]
        action: HostsCommand,
    },
    /// Run one shell command on each target host.
    Exec(ExecArgs),
    /// Show vulnerability scan results.
    Scan(ScanArgs),
    /// Install pending security updates on a host, then re-scan it.
    Remediate(RemediateArgs),
}

#[derive(Subcommand, Debug)]
pub enum HostsCommand {
    /// List hosts (all when no names are given).
    List {
        /// Host names.
        names: Vec<String>,
    },
    /// Delete hosts in order, stopping at the first failure.
    Delete {
        /// Host names.
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Register a host.
    Add(AddHostArgs),
}

#[derive(Args, Debug)]
pub struct AddHostArgs {
    /// Host name.
    pub name: String,

    /// SSH address (IP).
    #[arg(long)]
    pub addr: String,

    /// SSH port.
    #[arg(long, default_value_t = DEFAULT_SSH_PORT)]
    pub port: u16,

    /// SSH login.
    #[arg(long, default_value = DEFAULT_SSH_USER)]
    pub user: String,

    /// SSH password.
    #[arg(long, env = "PANTHER_SSH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Free-form note.
    #[arg(long)]
    pub comment: Option<String>,
}

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Target host; repeat for several hosts.
    #[arg(long = "target", short = 't', required = true)]
    pub targets: Vec<String>,

    /// Command to run, after `--`.
    #[arg(last = true, required = true)]
    pub command: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Hosts to watch: `*` or a comma-separated list.
    #[arg(long, default_value = "*")]
    pub watch: String,

    /// Keep printing each new batch until interrupted.
    #[arg(long)]
    pub follow: bool,

    /// Only show hosts whose name contains this text.
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args, Debug)]
pub struct RemediateArgs {
    /// Host to remediate.
    pub host: String,

    /// Severities to fix; repeat for several (all when omitted).
    #[arg(long, value_enum)]
    pub severity: Vec<SeverityArg>,

    /// Package manager (overrides settings).
    #[arg(long)]
    pub package_manager: Option<String>,

    /// Print the install command without running it.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeverityArg {
    Critical,
    Important,
    Moderate,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Critical => Severity::Critical,
            SeverityArg::Important => Severity::Important,
            SeverityArg::Moderate => Severity::Moderate,
        }
    }
}
