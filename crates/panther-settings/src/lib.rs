//! # panther-settings
//!
//! Configuration with layered sources:
//! 1. **Compiled defaults**: [`PantherSettings::default()`]
//! 2. **User file**: `~/.panther/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `PANTHER_*` overrides (highest priority)
//!
//! The CLI applies its own flags on top of the loaded value.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{apply_env_overrides, load_settings, load_settings_from_path, settings_path};
pub use types::*;
