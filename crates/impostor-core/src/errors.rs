//! Engine-side error type.

/// Errors raised by a simulation engine while building or running a game.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The game configuration cannot be played.
    #[error("Invalid game configuration: {0}")]
    InvalidConfig(String),

    /// The engine has no controller of the requested kind.
    #[error("Unsupported controller: {0}")]
    UnsupportedController(String),

    /// The pending human request was cancelled before a move arrived.
    #[error("Human input cancelled")]
    HumanInputCancelled,

    /// Unrecoverable engine failure.
    #[error("Engine failure: {0}")]
    Engine(String),
}

impl SimulationError {
    /// Error category string for logs and transport codes.
    pub fn category(&self) -> &str {
        match self {
            Self::InvalidConfig(_) => "invalid_config",
            Self::UnsupportedController(_) => "unsupported_controller",
            Self::HumanInputCancelled => "human_input_cancelled",
            Self::Engine(_) => "engine",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            SimulationError::InvalidConfig("no players".into()).to_string(),
            "Invalid game configuration: no players"
        );
        assert_eq!(
            SimulationError::HumanInputCancelled.to_string(),
            "Human input cancelled"
        );
    }

    #[test]
    fn categories() {
        assert_eq!(SimulationError::Engine("x".into()).category(), "engine");
        assert_eq!(
            SimulationError::UnsupportedController("llm".into()).category(),
            "unsupported_controller"
        );
    }
}
