//! Outbound orders and target filters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One instruction for one host.
///
/// Without a `command` the instruction means "re-scan this host" on a scan
/// session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Shell command to run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Host name.
    pub target: String,
}

impl Command {
    /// A shell command for `target`.
    pub fn run(target: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
            target: target.into(),
        }
    }

    /// A bare re-scan request for `target`.
    pub fn rescan(target: impl Into<String>) -> Self {
        Self {
            command: None,
            target: target.into(),
        }
    }
}

/// A batch of commands sent as one frame.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Commands in submission order.
    #[serde(default)]
    pub commands: Vec<Command>,
}

impl Order {
    /// Build an order from commands.
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    /// Run the same shell command on each of `targets`.
    pub fn broadcast<I, S>(targets: I, command: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            targets
                .into_iter()
                .map(|target| Command::run(target, command))
                .collect(),
        )
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the order carries no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl FromIterator<Command> for Order {
    fn from_iter<T: IntoIterator<Item = Command>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Which hosts a scan watch or directory query covers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Target {
    /// Every host (`*`).
    #[default]
    All,
    /// An explicit list of host names.
    Hosts(Vec<String>),
}

impl Target {
    /// Explicit host list.
    pub fn hosts<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Hosts(names.into_iter().map(Into::into).collect())
    }

    /// Parse a query value: `*` (or nothing) is every host, otherwise a
    /// comma-separated list.
    pub fn parse(value: &str) -> Self {
        let names: Vec<String> = value
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect();
        if names.is_empty() || names.iter().any(|name| name == "*") {
            Self::All
        } else {
            Self::Hosts(names)
        }
    }

    /// Whether `name` is covered.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Hosts(names) => names.iter().any(|n| n == name),
        }
    }

    /// Query-string form: `*` or the comma-joined names.
    pub fn to_query(&self) -> String {
        match self {
            Self::All => "*".to_string(),
            Self::Hosts(names) => names.join(","),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn order_wire_format() {
        let order = Order::new(vec![Command::run("h1", "echo hi"), Command::rescan("h2")]);
        assert_eq!(
            serde_json::to_value(&order).unwrap(),
            json!({"commands": [
                {"command": "echo hi", "target": "h1"},
                {"target": "h2"}
            ]})
        );
    }

    #[test]
    fn empty_order_still_serializes() {
        assert_eq!(
            serde_json::to_value(Order::default()).unwrap(),
            json!({"commands": []})
        );
    }

    #[test]
    fn broadcast_preserves_target_order() {
        let order = Order::broadcast(["b", "a"], "uptime");
        assert_eq!(order.len(), 2);
        assert_eq!(order.commands[0].target, "b");
        assert_eq!(order.commands[1].command.as_deref(), Some("uptime"));
    }

    #[test]
    fn target_query_forms() {
        assert_eq!(Target::All.to_query(), "*");
        assert_eq!(Target::hosts(["h1", "h2"]).to_query(), "h1,h2");
    }

    #[test]
    fn target_parse() {
        assert_eq!(Target::parse("*"), Target::All);
        assert_eq!(Target::parse(""), Target::All);
        assert_eq!(Target::parse("h1, h2,"), Target::hosts(["h1", "h2"]));
        assert_eq!(Target::parse("h1,*"), Target::All);
    }

    #[test]
    fn target_matches() {
        assert!(Target::All.matches("anything"));
        let only = Target::hosts(["h1"]);
        assert!(only.matches("h1"));
        assert!(!only.matches("h2"));
    }
}
