//! Game configuration handed to a [`SimulationFactory`](crate::engine::SimulationFactory).
//!
//! All types use `#[serde(rename_all = "camelCase", default)]` so partial JSON
//! (settings files, experiment records) fills in production defaults.

use serde::{Deserialize, Serialize};

use crate::errors::SimulationError;

/// Default model identifier for LLM-controlled players.
pub const DEFAULT_MODEL: &str = "openrouter/free";

/// Table size and pacing of a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GamePreset {
    /// Total number of seats, human included.
    pub num_players: usize,
    /// Number of impostor seats.
    pub num_impostors: usize,
    /// Timestep limit; crewmates win when it is reached.
    pub max_timesteps: u32,
    /// Speaking rounds per meeting.
    pub discussion_rounds: u32,
    /// Emergency buttons available per player.
    pub max_num_buttons: u32,
    /// Timesteps an impostor waits between kills.
    pub kill_cooldown: u32,
    /// Tasks assigned to each crewmate.
    pub tasks_per_player: u32,
}

impl GamePreset {
    /// The seven-seat table: five crewmates, two impostors.
    pub fn seven_member() -> Self {
        Self {
            num_players: 7,
            num_impostors: 2,
            max_timesteps: 50,
            discussion_rounds: 3,
            max_num_buttons: 2,
            kill_cooldown: 3,
            tasks_per_player: 3,
        }
    }

    /// The five-seat table: four crewmates, one impostor.
    pub fn five_member() -> Self {
        Self {
            num_players: 5,
            num_impostors: 1,
            max_timesteps: 20,
            discussion_rounds: 3,
            max_num_buttons: 2,
            kill_cooldown: 3,
            tasks_per_player: 3,
        }
    }
}

impl Default for GamePreset {
    fn default() -> Self {
        Self::seven_member()
    }
}

/// How the players of one role are driven.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerKind {
    /// Language-model agent (provided by an external engine).
    Llm,
    /// Seeded random policy.
    #[default]
    Random,
}

impl std::fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Llm => write!(f, "llm"),
            Self::Random => write!(f, "random"),
        }
    }
}

/// Per-role controller selection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
    /// Controller for impostor seats.
    pub impostor: ControllerKind,
    /// Controller for crewmate seats.
    pub crewmate: ControllerKind,
    /// Model choices for LLM impostors.
    pub impostor_models: Vec<String>,
    /// Model choices for LLM crewmates.
    pub crewmate_models: Vec<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            impostor: ControllerKind::Random,
            crewmate: ControllerKind::Random,
            impostor_models: vec![DEFAULT_MODEL.to_string()],
            crewmate_models: vec![DEFAULT_MODEL.to_string()],
        }
    }
}

/// Everything an engine needs to set up one game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameConfig {
    /// Table size and pacing.
    pub preset: GamePreset,
    /// Whether one seat is controlled by the external human.
    pub include_human: bool,
    /// Whether autonomous players get personality prompts.
    pub personality: bool,
    /// Controller selection per role.
    pub agents: AgentConfig,
    /// Seed for role dealing and random controllers (`None` = entropy).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            preset: GamePreset::default(),
            include_human: true,
            personality: false,
            agents: AgentConfig::default(),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Check that the table can actually be dealt.
    pub fn validate(&self) -> Result<(), SimulationError> {
        let p = &self.preset;
        if p.num_players < 3 {
            return Err(SimulationError::InvalidConfig(format!(
                "at least 3 players required, got {}",
                p.num_players
            )));
        }
        if p.num_impostors == 0 || p.num_impostors * 2 >= p.num_players {
            return Err(SimulationError::InvalidConfig(format!(
                "{} impostors cannot be dealt at a {}-seat table",
                p.num_impostors, p.num_players
            )));
        }
        if p.max_timesteps == 0 {
            return Err(SimulationError::InvalidConfig(
                "max_timesteps must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seven_member_table() {
        let p = GamePreset::seven_member();
        assert_eq!(p.num_players, 7);
        assert_eq!(p.num_impostors, 2);
        assert_eq!(p.max_timesteps, 50);
    }

    #[test]
    fn default_config_includes_human() {
        let cfg = GameConfig::default();
        assert!(cfg.include_human);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_tiny_table() {
        let mut cfg = GameConfig::default();
        cfg.preset.num_players = 2;
        assert!(matches!(
            cfg.validate(),
            Err(SimulationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_impostor_majority() {
        let mut cfg = GameConfig::default();
        cfg.preset.num_impostors = 4;
        assert!(cfg.validate().is_err());
        cfg.preset.num_impostors = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: GameConfig =
            serde_json::from_str(r#"{"preset": {"numPlayers": 5, "numImpostors": 1}}"#).unwrap();
        assert_eq!(cfg.preset.num_players, 5);
        assert_eq!(cfg.preset.discussion_rounds, 3);
        assert!(cfg.include_human);
    }

    #[test]
    fn controller_kind_wire_values() {
        assert_eq!(
            serde_json::to_string(&ControllerKind::Llm).unwrap(),
            "\"llm\""
        );
        assert_eq!(ControllerKind::Random.to_string(), "random");
    }
}
