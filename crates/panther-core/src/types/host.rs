//! Host inventory records.

use serde::{Deserialize, Serialize};

use super::meta::ObjectMeta;
use crate::payload::{self, PayloadError};

/// Default SSH port for new hosts.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Default SSH login for new hosts.
pub const DEFAULT_SSH_USER: &str = "root";

/// A login for SSH or privileged operations.
///
/// `pass` is kept exactly as transported: the password base64 encoded. The
/// encoding is reversible and is not a security measure.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginCredential {
    /// Login name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Base64 encoded password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass: Option<String>,
}

impl LoginCredential {
    /// Build a credential from a plain-text password.
    pub fn with_password(user: impl Into<String>, password: &str) -> Self {
        Self {
            user: Some(user.into()),
            pass: Some(payload::encode(password)),
        }
    }

    /// Replace the password with a plain-text value.
    pub fn set_password(&mut self, password: &str) {
        self.pass = Some(payload::encode(password));
    }

    /// The plain-text password, if one is set.
    pub fn password(&self) -> Result<Option<String>, PayloadError> {
        self.pass.as_deref().map(payload::decode).transpose()
    }

    /// Whether neither a user nor a password is set.
    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.pass.is_none()
    }
}

/// A managed host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Host {
    /// Object metadata; `name` identifies the host.
    pub metadata: ObjectMeta,
    /// SSH address (IP).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_addr: Option<String>,
    /// SSH port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_port: Option<u16>,
    /// SSH login.
    #[serde(skip_serializing_if = "LoginCredential::is_empty")]
    pub ssh_cred: LoginCredential,
    /// Optional privileged login used for operations.
    #[serde(skip_serializing_if = "LoginCredential::is_empty")]
    pub op_cred: LoginCredential,
    /// Free-form note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Host {
    /// A new host record with the default SSH port and login name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta::named(name),
            ssh_port: Some(DEFAULT_SSH_PORT),
            ssh_cred: LoginCredential {
                user: Some(DEFAULT_SSH_USER.to_string()),
                pass: None,
            },
            ..Self::default()
        }
    }

    /// The host name.
    pub fn name(&self) -> &str {
        self.metadata.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn password_is_transported_base64() {
        let cred = LoginCredential::with_password("root", "s3cret");
        assert_eq!(cred.pass.as_deref(), Some("czNjcmV0"));
        assert_eq!(cred.password().unwrap().as_deref(), Some("s3cret"));
    }

    #[test]
    fn missing_password_is_none() {
        assert_eq!(LoginCredential::default().password().unwrap(), None);
    }

    #[test]
    fn stored_password_survives_load_and_save() {
        let raw = json!({
            "metadata": {"name": "web-1"},
            "ssh_addr": "10.0.0.5",
            "ssh_port": 2222,
            "ssh_cred": {"user": "admin", "pass": "cGFzcw=="},
            "comment": "edge"
        });
        let host: Host = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(host.ssh_cred.password().unwrap().as_deref(), Some("pass"));
        assert_eq!(serde_json::to_value(&host).unwrap(), raw);
    }

    #[test]
    fn new_host_defaults() {
        let host = Host::new("db-1");
        assert_eq!(host.name(), "db-1");
        assert_eq!(host.ssh_port, Some(22));
        assert_eq!(host.ssh_cred.user.as_deref(), Some("root"));
        assert!(host.op_cred.is_empty());
    }
}
