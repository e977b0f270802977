//! Game creation defaults, readiness tuning and experiment bookkeeping.

use impostor_core::config::{AgentConfig, ControllerKind, DEFAULT_MODEL, GameConfig, GamePreset};
use serde::{Deserialize, Serialize};

/// Defaults applied to every created game.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameSettings {
    /// How long game creation waits for the human seat to appear.
    pub readiness_timeout_ms: u64,
    /// Poll interval of the readiness wait.
    pub readiness_poll_ms: u64,
    /// Model used for crewmates when the request names none.
    pub crewmate_model: String,
    /// Model used for impostors when the request names none.
    pub impostor_model: String,
    /// Controller for crewmate seats.
    pub crewmate_controller: ControllerKind,
    /// Controller for impostor seats.
    pub impostor_controller: ControllerKind,
    /// Table size and pacing.
    pub preset: GamePreset,
    /// Whether autonomous players get personality prompts.
    pub personality: bool,
    /// Pause before each autonomous move of the sandbox engine.
    pub autonomous_delay_ms: u64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            readiness_timeout_ms: 10_000,
            readiness_poll_ms: 50,
            crewmate_model: DEFAULT_MODEL.to_string(),
            impostor_model: DEFAULT_MODEL.to_string(),
            crewmate_controller: ControllerKind::Random,
            impostor_controller: ControllerKind::Random,
            preset: GamePreset::seven_member(),
            personality: false,
            autonomous_delay_ms: 250,
        }
    }
}

impl GameSettings {
    /// Build the configuration of one human game.
    ///
    /// Blank or missing model names fall back to the configured defaults.
    pub fn game_config(
        &self,
        crewmate_model: Option<&str>,
        impostor_model: Option<&str>,
    ) -> GameConfig {
        let pick = |requested: Option<&str>, fallback: &str| {
            requested
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };
        GameConfig {
            preset: self.preset.clone(),
            include_human: true,
            personality: self.personality,
            agents: AgentConfig {
                impostor: self.impostor_controller,
                crewmate: self.crewmate_controller,
                impostor_models: vec![pick(impostor_model, &self.impostor_model)],
                crewmate_models: vec![pick(crewmate_model, &self.crewmate_model)],
            },
            seed: None,
        }
    }
}

/// Experiment bookkeeping.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperimentSettings {
    /// Whether a record is written per created game.
    pub enabled: bool,
    /// Storage root for records.
    pub logs_dir: String,
}

impl Default for ExperimentSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            logs_dir: "expt-logs".to_string(),
        }
    }
}
