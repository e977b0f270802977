//! Runtime error types.

use std::time::Duration;

use impostor_core::{SessionId, SimulationError};

use crate::record::SessionStatus;

/// Errors returned by the session registry surface.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// No session with this id.
    #[error("Unknown game_id={0}")]
    SessionNotFound(SessionId),

    /// The session already reached a terminal status.
    #[error("Game {session_id} is already {status}")]
    InvalidState {
        /// Session id.
        session_id: SessionId,
        /// Terminal status the session is in.
        status: SessionStatus,
    },

    /// The session has no human-controlled seat (yet).
    #[error("Game {0} has no human player")]
    NoHumanActor(SessionId),

    /// Nothing is waiting for a human move right now.
    #[error("Game {0} is not currently waiting for a human action")]
    NotWaiting(SessionId),

    /// Index outside the offered action set.
    #[error("action_index out of range: {index} (offered {available})")]
    OutOfRange {
        /// Submitted index.
        index: usize,
        /// Number of offered actions.
        available: usize,
    },

    /// The pending request was already fulfilled or cancelled.
    #[error("Human action for game {0} was already resolved")]
    AlreadyResolved(SessionId),

    /// The human seat did not appear in time.
    #[error("Timed out after {timeout:?} waiting for the human player of game {session_id}")]
    ReadinessTimeout {
        /// Session id.
        session_id: SessionId,
        /// Configured readiness timeout.
        timeout: Duration,
    },

    /// The session task ended before the human seat appeared.
    #[error("Game {session_id} finished before the human player was ready{}", cause_suffix(.cause.as_deref()))]
    PrematureCompletion {
        /// Session id.
        session_id: SessionId,
        /// Recorded failure, if the task failed.
        cause: Option<String>,
    },

    /// Engine construction failed.
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

fn cause_suffix(cause: Option<&str>) -> String {
    cause.map(|c| format!(": {c}")).unwrap_or_default()
}

impl RuntimeError {
    /// Error category string for logs and transport codes.
    pub fn category(&self) -> &str {
        match self {
            Self::SessionNotFound(_) => "session_not_found",
            Self::InvalidState { .. } => "invalid_state",
            Self::NoHumanActor(_) => "no_human_actor",
            Self::NotWaiting(_) => "not_waiting",
            Self::OutOfRange { .. } => "out_of_range",
            Self::AlreadyResolved(_) => "already_resolved",
            Self::ReadinessTimeout { .. } => "readiness_timeout",
            Self::PrematureCompletion { .. } => "premature_completion",
            Self::Simulation(e) => e.category(),
        }
    }

    /// Whether the caller may retry the same request later.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NoHumanActor(_) | Self::NotWaiting(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let id = SessionId::new(3);
        assert_eq!(
            RuntimeError::SessionNotFound(id).to_string(),
            "Unknown game_id=3"
        );
        assert_eq!(
            RuntimeError::InvalidState {
                session_id: id,
                status: SessionStatus::Completed,
            }
            .to_string(),
            "Game 3 is already completed"
        );
        assert_eq!(
            RuntimeError::OutOfRange {
                index: 99,
                available: 4,
            }
            .to_string(),
            "action_index out of range: 99 (offered 4)"
        );
    }

    #[test]
    fn premature_completion_includes_cause() {
        let id = SessionId::new(1);
        let with = RuntimeError::PrematureCompletion {
            session_id: id,
            cause: Some("boom".into()),
        };
        assert!(with.to_string().ends_with(": boom"));
        let without = RuntimeError::PrematureCompletion {
            session_id: id,
            cause: None,
        };
        assert!(without.to_string().ends_with("ready"));
    }

    #[test]
    fn categories() {
        let id = SessionId::new(1);
        assert_eq!(RuntimeError::NotWaiting(id).category(), "not_waiting");
        assert_eq!(
            RuntimeError::AlreadyResolved(id).category(),
            "already_resolved"
        );
        assert_eq!(
            RuntimeError::from(SimulationError::InvalidConfig("x".into())).category(),
            "invalid_config"
        );
    }

    #[test]
    fn recoverable_errors() {
        let id = SessionId::new(1);
        assert!(RuntimeError::NotWaiting(id).is_recoverable());
        assert!(RuntimeError::NoHumanActor(id).is_recoverable());
        assert!(!RuntimeError::SessionNotFound(id).is_recoverable());
    }
}
