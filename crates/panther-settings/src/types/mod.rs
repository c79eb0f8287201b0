//! Settings type definitions.
//!
//! All types use camelCase JSON keys and implement [`Default`] with
//! production values; `#[serde(default)]` lets a settings file name only the
//! fields it overrides.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{Result, SettingsError};

/// Root settings type.
///
/// ```json
/// {
///   "server": { "baseUrl": "https://panther.internal:8443" },
///   "exec": { "packageManager": "dnf" }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PantherSettings {
    /// Backend location.
    pub server: ServerSettings,
    /// Exec channel settings.
    pub exec: ExecSettings,
    /// Host directory settings.
    pub hosts: HostSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl PantherSettings {
    /// WebSocket URL of the exec channel.
    pub fn exec_url(&self) -> Result<Url> {
        self.server.exec_url(&self.exec.path)
    }

    /// HTTP URL of the host directory.
    pub fn host_url(&self) -> Result<Url> {
        self.server.http_url(&self.hosts.path)
    }
}

/// Backend origin shared by the exec channel and the host directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// HTTP origin of the backend, e.g. `http://localhost:8080`.
    pub base_url: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

impl ServerSettings {
    /// Resolve `path` against the HTTP origin.
    pub fn http_url(&self, path: &str) -> Result<Url> {
        let base = Url::parse(&self.base_url).map_err(|e| SettingsError::InvalidUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(SettingsError::InvalidUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme '{}'", base.scheme()),
            });
        }
        base.join(path).map_err(|e| SettingsError::InvalidUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })
    }

    /// Resolve `path` against the origin with the matching socket scheme
    /// (`http` → `ws`, `https` → `wss`).
    pub fn exec_url(&self, path: &str) -> Result<Url> {
        let mut url = self.http_url(path)?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme).map_err(|()| SettingsError::InvalidUrl {
            url: self.base_url.clone(),
            reason: format!("cannot switch scheme to {scheme}"),
        })?;
        Ok(url)
    }
}

/// Exec channel settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecSettings {
    /// Path of the exec endpoint.
    pub path: String,
    /// Package manager used to build remediation commands.
    pub package_manager: String,
}

impl Default for ExecSettings {
    fn default() -> Self {
        Self {
            path: "/api/v1/exec".to_string(),
            package_manager: "yum".to_string(),
        }
    }
}

/// Host directory settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostSettings {
    /// Path of the host endpoint.
    pub path: String,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            path: "/api/v1/host".to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level (`error`, `warn`, `info`, `debug`, `trace`).
    pub level: String,
    /// Emit newline-delimited JSON instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_camel_case() {
        let value = serde_json::to_value(PantherSettings::default()).unwrap();
        assert_eq!(value["server"]["baseUrl"], "http://localhost:8080");
        assert_eq!(value["exec"]["packageManager"], "yum");
        assert_eq!(value["hosts"]["requestTimeoutMs"], 30_000);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: PantherSettings =
            serde_json::from_value(json!({"exec": {"packageManager": "dnf"}})).unwrap();
        assert_eq!(settings.exec.package_manager, "dnf");
        assert_eq!(settings.exec.path, "/api/v1/exec");
        assert_eq!(settings.logging.level, "warn");
    }

    #[test]
    fn exec_url_uses_socket_scheme() {
        let settings = PantherSettings::default();
        assert_eq!(
            settings.exec_url().unwrap().as_str(),
            "ws://localhost:8080/api/v1/exec"
        );
    }

    #[test]
    fn secure_origin_maps_to_wss() {
        let server = ServerSettings {
            base_url: "https://panther.example:8443".into(),
        };
        assert_eq!(
            server.exec_url("/api/v1/exec").unwrap().as_str(),
            "wss://panther.example:8443/api/v1/exec"
        );
    }

    #[test]
    fn host_url_keeps_http_scheme() {
        let settings = PantherSettings::default();
        assert_eq!(
            settings.host_url().unwrap().as_str(),
            "http://localhost:8080/api/v1/host"
        );
    }

    #[test]
    fn rejects_non_http_origin() {
        let server = ServerSettings {
            base_url: "ftp://files".into(),
        };
        assert!(matches!(
            server.http_url("/x"),
            Err(SettingsError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn rejects_unparseable_origin() {
        let server = ServerSettings {
            base_url: "not a url".into(),
        };
        assert!(server.exec_url("/api/v1/exec").is_err());
    }
}
