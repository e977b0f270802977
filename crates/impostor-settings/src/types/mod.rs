//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` and implement
//! [`Default`] with production values. Types marked `#[serde(default)]`
//! accept partial JSON; missing fields keep their default.

mod game;
mod server;

pub use game::*;
pub use server::*;

use serde::{Deserialize, Serialize};

/// Root settings type for the impostor server.
///
/// Loaded from `~/.impostor/settings.json` with defaults applied for
/// missing fields. Environment variables can override specific values.
///
/// # JSON Format
///
/// ```json
/// {
///   "server": { "port": 9000 },
///   "game": { "readinessTimeoutMs": 20000 }
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImpostorSettings {
    /// Settings schema version.
    pub version: String,
    /// Application name.
    pub name: String,
    /// HTTP bind settings.
    pub server: ServerSettings,
    /// Game creation defaults and readiness tuning.
    pub game: GameSettings,
    /// Experiment bookkeeping.
    pub experiment: ExperimentSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl Default for ImpostorSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            name: "impostor".to_string(),
            server: ServerSettings::default(),
            game: GameSettings::default(),
            experiment: ExperimentSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}
