//! [`SimulationFactory`] for the sandbox engine.

use std::time::Duration;

use impostor_core::{
    ControllerKind, GameConfig, SessionId, Simulation, SimulationError, SimulationFactory,
};
use tracing::debug;

use crate::game::SandboxGame;
use crate::seat::COLORS;

/// Builds [`SandboxGame`]s. Only the random controller is available here.
#[derive(Clone, Debug, Default)]
pub struct SandboxFactory {
    autonomous_delay: Duration,
}

impl SandboxFactory {
    /// Factory whose autonomous players pause `autonomous_delay` per move.
    pub fn new(autonomous_delay: Duration) -> Self {
        Self { autonomous_delay }
    }
}

impl SimulationFactory for SandboxFactory {
    fn name(&self) -> &str {
        "sandbox"
    }

    fn build(
        &self,
        session_id: SessionId,
        config: &GameConfig,
    ) -> Result<Box<dyn Simulation>, SimulationError> {
        config.validate()?;
        if config.preset.num_players > COLORS.len() {
            return Err(SimulationError::InvalidConfig(format!(
                "at most {} players supported, got {}",
                COLORS.len(),
                config.preset.num_players
            )));
        }
        for kind in [config.agents.impostor, config.agents.crewmate] {
            if kind != ControllerKind::Random {
                return Err(SimulationError::UnsupportedController(kind.to_string()));
            }
        }
        debug!(%session_id, seed = ?config.seed, "building sandbox game");
        Ok(Box::new(SandboxGame::new(
            config.clone(),
            self.autonomous_delay,
        )))
    }
}
