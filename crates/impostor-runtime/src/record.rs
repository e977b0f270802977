//! Per-session record shared between the registry, the session task and
//! pollers.

use std::fmt;

use chrono::{DateTime, Utc};
use impostor_core::{GameConfig, GameOutcome, SessionId, ViewReader};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

/// Lifecycle status of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Registered, task not yet confirmed running.
    Initializing,
    /// Game loop in progress.
    Running,
    /// Game ended with an outcome.
    Completed,
    /// Game failed; see the recorded error.
    Error,
}

impl SessionStatus {
    /// Whether the status can no longer change.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => write!(f, "initializing"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug)]
struct SessionState {
    status: SessionStatus,
    error: Option<String>,
    outcome: Option<GameOutcome>,
}

/// One active or finished session.
///
/// The engine itself lives inside the session task; the record only holds
/// the reader side of the engine's published view.
pub struct SessionRecord {
    id: SessionId,
    config: GameConfig,
    created_at: DateTime<Utc>,
    state: Mutex<SessionState>,
    view: ViewReader,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionRecord {
    /// New record in `initializing`.
    pub fn new(id: SessionId, config: GameConfig, view: ViewReader) -> Self {
        Self {
            id,
            config,
            created_at: Utc::now(),
            state: Mutex::new(SessionState {
                status: SessionStatus::Initializing,
                error: None,
                outcome: None,
            }),
            view,
            task: Mutex::new(None),
        }
    }

    /// Session id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Configuration the game was built from.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Current status.
    pub fn status(&self) -> SessionStatus {
        self.state.lock().status
    }

    /// Recorded failure, once in `error`.
    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    /// Recorded outcome, once in `completed`.
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.state.lock().outcome.clone()
    }

    /// Status, error and outcome read under one lock.
    pub fn status_parts(&self) -> (SessionStatus, Option<String>, Option<GameOutcome>) {
        let state = self.state.lock();
        (state.status, state.error.clone(), state.outcome.clone())
    }

    /// Reader on the engine's published view.
    pub fn view(&self) -> &ViewReader {
        &self.view
    }

    /// Move to `running`. No-op once terminal.
    pub fn mark_running(&self) -> bool {
        let mut state = self.state.lock();
        if state.status.is_terminal() {
            return false;
        }
        state.status = SessionStatus::Running;
        true
    }

    /// Move to `completed` with `outcome`. Returns `false` if already terminal.
    pub fn complete(&self, outcome: GameOutcome) -> bool {
        let mut state = self.state.lock();
        if state.status.is_terminal() {
            return false;
        }
        state.status = SessionStatus::Completed;
        state.outcome = Some(outcome);
        true
    }

    /// Move to `error` with `message`. Returns `false` if already terminal.
    pub fn fail(&self, message: impl Into<String>) -> bool {
        let mut state = self.state.lock();
        if state.status.is_terminal() {
            return false;
        }
        state.status = SessionStatus::Error;
        state.error = Some(message.into());
        true
    }

    pub(crate) fn attach_task(&self, handle: JoinHandle<()>) {
        *self.task.lock() = Some(handle);
    }

    /// Whether the session task has exited. Records without a task count as
    /// finished.
    pub fn is_task_finished(&self) -> bool {
        self.task.lock().as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Abort the session task if it is still running.
    pub fn abort_task(&self) {
        if let Some(handle) = self.task.lock().as_ref() {
            if !handle.is_finished() {
                handle.abort();
            }
        }
    }
}

impl fmt::Debug for SessionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRecord")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}
