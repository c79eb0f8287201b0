//! Plain-text tables for terminal output.

use std::fmt::Write as _;

use panther_core::{Host, Severity, SystemScan};
use panther_exec::{SeverityBreakdown, TranscriptLine};

/// Print one transcript line, adding a newline unless the output already
/// ends with one.
pub fn print_line(line: &TranscriptLine) {
    let text = line.to_string();
    if text.ends_with('\n') {
        print!("{text}");
    } else {
        println!("{text}");
    }
}

/// Host inventory table.
pub fn host_table(hosts: &[Host]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<24} {:<16} {:>5} {:<12} COMMENT",
        "NAME", "ADDRESS", "PORT", "USER"
    );
    for host in hosts {
        let _ = writeln!(
            out,
            "{:<24} {:<16} {:>5} {:<12} {}",
            host.name(),
            host.ssh_addr.as_deref().unwrap_or("-"),
            host.ssh_port.map_or_else(|| "-".to_string(), |p| p.to_string()),
            host.ssh_cred.user.as_deref().unwrap_or("-"),
            host.comment.as_deref().unwrap_or(""),
        );
    }
    out
}

/// Scan table with a count column per severity.
pub fn scan_table<'a, I>(rows: I) -> String
where
    I: IntoIterator<Item = &'a SystemScan>,
{
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<24} {:<12} {:>9} {:>9} {:>9} {:>6}",
        "HOST",
        "STATE",
        Severity::Critical.label().to_uppercase(),
        Severity::Important.label().to_uppercase(),
        Severity::Moderate.label().to_uppercase(),
        "TOTAL"
    );
    for row in rows {
        let breakdown = SeverityBreakdown::of(&row.security);
        let _ = writeln!(
            out,
            "{:<24} {:<12} {:>9} {:>9} {:>9} {:>6}",
            row.name(),
            row.state.label(),
            breakdown.critical.len(),
            breakdown.important.len(),
            breakdown.moderate.len(),
            breakdown.total(),
        );
    }
    out
}

/// Findings of one host grouped by severity.
pub fn findings(row: &SystemScan) -> String {
    let breakdown = SeverityBreakdown::of(&row.security);
    let mut out = String::new();
    for severity in Severity::ACTIONABLE {
        for update in breakdown.get(severity) {
            let _ = writeln!(
                out,
                "  {:<10} {:<18} {}",
                severity.label(),
                update.cve_id,
                update.package
            );
        }
    }
    out
}
