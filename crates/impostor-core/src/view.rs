//! Read-only game views published by engines.
//!
//! An engine owns its mutable game state. At safe points (before suspending
//! on the human, after each resolved action) it publishes a fresh
//! [`GameView`]; pollers only ever see whole published values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Game phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Free movement, tasks, kills.
    Task,
    /// Discussion and voting.
    Meeting,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task => write!(f, "task"),
            Self::Meeting => write!(f, "meeting"),
        }
    }
}

/// Winning side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    /// The impostors.
    Impostors,
    /// The crewmates.
    Crewmates,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Impostors => write!(f, "impostors"),
            Self::Crewmates => write!(f, "crewmates"),
        }
    }
}

/// Final result of a finished game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    /// Winning side.
    pub winner: Team,
    /// Human-readable reason.
    pub reason: String,
}

/// Public summary of one seat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    /// Display name (unique per game).
    pub name: String,
    /// Current room.
    pub location: String,
    /// Faint identity marker shown to everyone.
    pub color: String,
    /// Whether the player is still in the game.
    pub is_alive: bool,
    /// The player's own description of its situation, when the engine
    /// exposes one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

/// One entry of the public activity log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Timestep the entry was recorded at.
    pub timestep: u32,
    /// Discussion round, for meeting entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,
    /// Phase the entry belongs to.
    pub phase: Phase,
    /// Acting player.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
    /// Rendered action, e.g. `SPEAK: I saw red vent`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// A selectable move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOption {
    /// Display name.
    pub name: String,
    /// Whether the move also needs a free-text payload.
    pub requires_message: bool,
}

impl ActionOption {
    /// A move that needs no payload.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requires_message: false,
        }
    }

    /// A move that carries free text (speech).
    pub fn with_message(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requires_message: true,
        }
    }
}

/// A move submitted by the human.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanAction {
    /// Index into the offered action set.
    pub action_index: usize,
    /// Free-text payload (empty when the move takes none).
    pub message: String,
}

/// What the human-controlled seat currently sees of itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanView {
    /// Name of the human's seat.
    pub player_name: String,
    /// Moves offered for the current (or most recent) human turn.
    pub available_actions: Vec<ActionOption>,
    /// Short label of the step being decided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,
    /// Situation description for the human.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_info: Option<String>,
}

/// Point-in-time view of a running game.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    /// Whether seats and roles have been dealt.
    pub initialized: bool,
    /// Current phase, once the game loop started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_phase: Option<Phase>,
    /// Current timestep.
    pub timestep: u32,
    /// Timestep limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_timesteps: Option<u32>,
    /// Name of the player currently acting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_player: Option<String>,
    /// All seats in table order.
    pub players: Vec<PlayerSummary>,
    /// Append-only public activity log.
    pub activity_log: Vec<ActivityEntry>,
    /// Present once the human-controlled seat exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub human: Option<HumanView>,
}

impl GameView {
    /// Whether a human-controlled actor exists.
    pub fn has_human(&self) -> bool {
        self.human.is_some()
    }

    /// Look up a seat by name.
    pub fn player(&self, name: &str) -> Option<&PlayerSummary> {
        self.players.iter().find(|p| p.name == name)
    }
}
