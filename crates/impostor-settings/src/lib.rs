//! # impostor-settings
//!
//! Configuration management with layered sources for the impostor server.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`ImpostorSettings::default()`]
//! 2. **User file**: `~/.impostor/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `IMPOSTOR_*` overrides (highest priority)
//!
//! The loaded value is handed explicitly to whatever needs it; there is no
//! process-wide settings singleton.
//!
//! ## Crate Position
//!
//! Depends on: impostor-core (game configuration types).
//! Depended on by: impostor-server, impostor-agent.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;
