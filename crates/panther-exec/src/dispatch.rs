//! Command dispatch aggregation.
//!
//! [`CommandDispatch`] tracks one [`Order`] on a `cmd` channel: a phase per
//! target, a count of terminal results, and a timestamped transcript of
//! everything the server reported.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Local};
use futures::StreamExt;
use panther_core::{HostOperation, Order, State};
use tracing::{debug, info};

use crate::errors::SessionError;
use crate::mode::Cmd;
use crate::observer::CloseOutcome;
use crate::session::ExecChannel;

/// Where one target's command stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandPhase {
    /// Sent, not yet picked up by the executor.
    Pending,
    /// Running on the host.
    InProgress,
    /// Finished successfully.
    Succeeded,
    /// Finished with an error.
    Failed,
    /// Cancelled by the server.
    Aborted,
}

impl CommandPhase {
    /// Whether no further event moves the phase.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Aborted)
    }
}

/// One transcript line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranscriptLine {
    /// Local time the event was observed.
    pub at: DateTime<Local>,
    /// Host the event belongs to.
    pub target: String,
    /// Bracketed tag, e.g. `SUCCESS`.
    pub tag: &'static str,
    /// Message body.
    pub text: String,
}

impl fmt::Display for TranscriptLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}:{}] => {}",
            self.at.format("%Y-%m-%d %H:%M:%S"),
            self.target,
            self.tag,
            self.text
        )
    }
}

/// Summary of a finished [`CommandDispatch::run`].
#[derive(Clone, Debug)]
pub struct DispatchReport {
    /// Terminal results received.
    pub completed: usize,
    /// Targets whose command failed.
    pub failed: usize,
    /// Commands in the order.
    pub expected: usize,
    /// Every line, in arrival order.
    pub transcript: Vec<TranscriptLine>,
    /// How the channel closed, if it had closed when the run ended.
    pub close: Option<CloseOutcome>,
}

impl DispatchReport {
    /// Whether every command produced a terminal result.
    pub fn is_done(&self) -> bool {
        self.completed >= self.expected
    }
}

/// Aggregates the results of one order.
#[derive(Clone, Debug, Default)]
pub struct CommandDispatch {
    order: Option<Order>,
    completed: usize,
    phases: BTreeMap<String, CommandPhase>,
    transcript: Vec<TranscriptLine>,
}

impl CommandDispatch {
    /// Track `order`. Every target starts `Pending`.
    pub fn new(order: Order) -> Self {
        let phases = order
            .commands
            .iter()
            .map(|c| (c.target.clone(), CommandPhase::Pending))
            .collect();
        Self {
            order: Some(order),
            completed: 0,
            phases,
            transcript: Vec::new(),
        }
    }

    /// The order being tracked.
    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    /// Terminal results seen so far.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Commands expected.
    pub fn expected(&self) -> usize {
        self.order.as_ref().map_or(0, Order::len)
    }

    /// Whether every command has produced a terminal result.
    ///
    /// With no order there is nothing to wait for.
    pub fn is_done(&self) -> bool {
        self.completed >= self.expected()
    }

    /// Current phase of `target`.
    pub fn phase(&self, target: &str) -> Option<CommandPhase> {
        self.phases.get(target).copied()
    }

    /// Lines recorded so far.
    pub fn transcript(&self) -> &[TranscriptLine] {
        &self.transcript
    }

    /// The transcript as text, one line per event.
    pub fn transcript_text(&self) -> String {
        self.transcript
            .iter()
            .map(|line| format!("{line}\n"))
            .collect()
    }

    /// Fold one server event into the aggregate.
    ///
    /// Returns the transcript line it produced, if any.
    pub fn observe(&mut self, op: &HostOperation) -> Option<&TranscriptLine> {
        let target = op.target().to_string();
        let command = op.command();
        let (tag, text, next) = match op.state {
            State::Started => (
                "PENDING",
                format!("Pending execution: '{command}'"),
                CommandPhase::Pending,
            ),
            State::InProgress => (
                "IN-PROGRESS",
                format!("Applying command '{command}'"),
                CommandPhase::InProgress,
            ),
            State::Success => {
                self.completed += 1;
                ("SUCCESS", decoded(op), CommandPhase::Succeeded)
            }
            State::Failure => {
                self.completed += 1;
                ("FAILED", decoded(op), CommandPhase::Failed)
            }
            State::Abort => (
                "ABORTED",
                format!("Command '{command}' was aborted"),
                CommandPhase::Aborted,
            ),
            State::Unknown => {
                debug!(host = %target, "ignoring operation without state");
                return None;
            }
        };

        let phase = self.phases.entry(target.clone()).or_insert(CommandPhase::Pending);
        let regresses = next == CommandPhase::Pending && *phase == CommandPhase::InProgress;
        if !phase.is_terminal() && !regresses {
            *phase = next;
        }

        self.transcript.push(TranscriptLine {
            at: Local::now(),
            target,
            tag,
            text,
        });
        self.transcript.last()
    }

    /// Send the order on `channel` and fold results until every command has
    /// finished or the channel ends.
    ///
    /// Subscribes before sending, so no result can be missed. `on_line` sees
    /// each transcript line as it is recorded.
    pub async fn run<F>(
        &mut self,
        channel: &ExecChannel<Cmd>,
        mut on_line: F,
    ) -> Result<DispatchReport, SessionError>
    where
        F: FnMut(&TranscriptLine),
    {
        let Some(order) = self.order.clone() else {
            return Ok(self.report(channel));
        };

        let mut results = channel.subscribe();
        channel.send(&order).await?;
        info!(commands = order.len(), "order dispatched");

        while !self.is_done() {
            match results.next().await {
                Some(Ok(op)) => {
                    if let Some(line) = self.observe(&op) {
                        on_line(line);
                    }
                }
                Some(Err(e)) => return Err(e),
                None => break,
            }
        }

        let report = self.report(channel);
        if report.is_done() {
            info!(completed = report.completed, "order completed");
        } else {
            info!(
                completed = report.completed,
                expected = report.expected,
                "channel ended before every command finished"
            );
        }
        Ok(report)
    }

    fn report(&self, channel: &ExecChannel<Cmd>) -> DispatchReport {
        DispatchReport {
            completed: self.completed,
            failed: self
                .phases
                .values()
                .filter(|p| **p == CommandPhase::Failed)
                .count(),
            expected: self.expected(),
            transcript: self.transcript.clone(),
            close: channel.close_outcome(),
        }
    }
}

fn decoded(op: &HostOperation) -> String {
    op.output()
        .unwrap_or_else(|e| format!("<undecodable output: {e}>"))
}
