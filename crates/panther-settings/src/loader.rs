//! `~/.panther/settings.json` layered over the compiled defaults, then
//! `PANTHER_*` variables on top.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::PantherSettings;

/// `$HOME/.panther/settings.json`, or `None` when `HOME` is unset.
pub fn settings_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".panther/settings.json"))
}

/// Settings from the default file (if any) plus environment overrides.
pub fn load_settings() -> Result<PantherSettings> {
    match settings_path() {
        Some(path) => load_settings_from_path(&path),
        None => {
            let mut settings = PantherSettings::default();
            apply_env_overrides(&mut settings);
            Ok(settings)
        }
    }
}

/// Settings from `path` plus environment overrides.
pub fn load_settings_from_path(path: &Path) -> Result<PantherSettings> {
    let mut settings = read_settings_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// `path` layered over the defaults. A missing file is not an error.
pub fn read_settings_file(path: &Path) -> Result<PantherSettings> {
    let mut merged = serde_json::to_value(PantherSettings::default())?;
    match std::fs::read_to_string(path) {
        Ok(content) => {
            debug!(?path, "applying settings file");
            overlay(&mut merged, serde_json::from_str(&content)?);
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(?path, "no settings file");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(serde_json::from_value(merged)?)
}

/// Write `layer` into `base`: objects key by key, anything else wholesale.
/// A `null` in `layer` leaves `base` untouched.
fn overlay(base: &mut Value, layer: Value) {
    match (base, layer) {
        (_, Value::Null) => {}
        (Value::Object(base), Value::Object(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None if value.is_null() => {}
                    None => {
                        let _ = base.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

/// Apply `PANTHER_*` environment overrides.
pub fn apply_env_overrides(settings: &mut PantherSettings) {
    apply_overrides_from(settings, |name| std::env::var(name).ok());
}

/// Apply overrides read through `lookup`.
///
/// Empty values are ignored; malformed numbers are ignored with a warning.
pub fn apply_overrides_from<F>(settings: &mut PantherSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let read = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(v) = read("PANTHER_URL") {
        settings.server.base_url = v;
    }
    if let Some(v) = read("PANTHER_PACKAGE_MANAGER") {
        settings.exec.package_manager = v;
    }
    if let Some(v) = read("PANTHER_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read("PANTHER_LOG_JSON") {
        match parse_bool(&v) {
            Some(json) => settings.logging.json = json,
            None => tracing::warn!(key = "PANTHER_LOG_JSON", value = %v, "invalid boolean env var, ignoring"),
        }
    }
    if let Some(v) = read("PANTHER_HTTP_TIMEOUT_MS") {
        match parse_u64_range(&v, 100, 600_000) {
            Some(ms) => settings.hosts.request_timeout_ms = ms,
            None => tracing::warn!(key = "PANTHER_HTTP_TIMEOUT_MS", value = %v, "invalid u64 env var, ignoring"),
        }
    }
}

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u64` within an inclusive range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}
