//! Human hand-off: one pending request per session, fulfilled exactly once.
//!
//! The engine registers a request right before it suspends on the human's
//! move; an external submitter fulfills it. Fulfilled and cancelled requests
//! leave the pending table immediately and leave a retired marker behind, so
//! a late duplicate is reported as [`ChannelError::AlreadyResolved`] rather
//! than as a request that never existed.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use impostor_core::{ActionOption, HumanAction, HumanInput, SessionId, SimulationError};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::debug;

/// Errors from the human hand-off.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// No request is pending and none was ever resolved for this session.
    #[error("no pending human request for game {0}")]
    NotFound(SessionId),
    /// The session's last request was already fulfilled or cancelled.
    #[error("human request for game {0} already resolved")]
    AlreadyResolved(SessionId),
    /// Index outside the offered action set.
    #[error("action_index out of range: {index} (offered {available})")]
    OutOfRange {
        /// Submitted index.
        index: usize,
        /// Number of offered actions.
        available: usize,
    },
    /// The waiting side is gone.
    #[error("human request for game {0} has no waiting consumer")]
    Closed(SessionId),
    /// The request was cancelled before a value arrived.
    #[error("human request cancelled")]
    Cancelled,
}

struct Pending {
    tx: oneshot::Sender<HumanAction>,
    available: usize,
}

#[derive(Default)]
struct Tables {
    pending: HashMap<SessionId, Pending>,
    retired: HashSet<SessionId>,
}

/// Pending human requests keyed by session id.
#[derive(Default)]
pub struct HumanChannel {
    tables: Mutex<Tables>,
}

/// Consumer side of one registered request.
#[must_use = "a request resolves only when awaited"]
pub struct PendingHumanRequest {
    session_id: SessionId,
    rx: oneshot::Receiver<HumanAction>,
}

impl PendingHumanRequest {
    /// Session this request belongs to.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Suspend until the request is fulfilled or cancelled.
    pub async fn await_value(self) -> Result<HumanAction, ChannelError> {
        self.rx.await.map_err(|_| ChannelError::Cancelled)
    }
}

impl HumanChannel {
    /// Create an empty channel table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request offering `offered` actions.
    ///
    /// Replaces (and thereby cancels) any stale request of the same session.
    pub fn register(&self, session_id: SessionId, offered: &[ActionOption]) -> PendingHumanRequest {
        let (tx, rx) = oneshot::channel();
        let mut tables = self.tables.lock();
        let _ = tables.retired.remove(&session_id);
        let replaced = tables.pending.insert(
            session_id,
            Pending {
                tx,
                available: offered.len(),
            },
        );
        drop(tables);
        if replaced.is_some() {
            debug!(%session_id, "replaced stale human request");
        }
        PendingHumanRequest { session_id, rx }
    }

    /// Fulfill the session's pending request.
    ///
    /// Never blocks. On success the request is retired and exactly one
    /// consumer resumes.
    pub fn submit(&self, session_id: SessionId, action: HumanAction) -> Result<(), ChannelError> {
        let mut tables = self.tables.lock();
        let Some(pending) = tables.pending.get(&session_id) else {
            return Err(if tables.retired.contains(&session_id) {
                ChannelError::AlreadyResolved(session_id)
            } else {
                ChannelError::NotFound(session_id)
            });
        };
        if action.action_index >= pending.available {
            return Err(ChannelError::OutOfRange {
                index: action.action_index,
                available: pending.available,
            });
        }
        let Some(pending) = tables.pending.remove(&session_id) else {
            return Err(ChannelError::NotFound(session_id));
        };
        let _ = tables.retired.insert(session_id);
        drop(tables);

        pending
            .tx
            .send(action)
            .map_err(|_| ChannelError::Closed(session_id))
    }

    /// Cancel the session's pending request. Returns whether one existed.
    pub fn cancel(&self, session_id: SessionId) -> bool {
        let mut tables = self.tables.lock();
        let existed = tables.pending.remove(&session_id).is_some();
        if existed {
            let _ = tables.retired.insert(session_id);
        }
        existed
    }

    /// Cancel every pending request (receivers observe `Cancelled`).
    pub fn cancel_all(&self) {
        let mut tables = self.tables.lock();
        let ids: Vec<SessionId> = tables.pending.drain().map(|(id, _)| id).collect();
        tables.retired.extend(ids);
    }

    /// Whether the session has a pending request.
    pub fn has_pending(&self, session_id: SessionId) -> bool {
        self.tables.lock().pending.contains_key(&session_id)
    }

    /// Number of pending requests across all sessions.
    pub fn pending_count(&self) -> usize {
        self.tables.lock().pending.len()
    }
}

/// [`HumanInput`] handed to one session's engine.
pub struct SessionHumanInput {
    session_id: SessionId,
    channel: Arc<HumanChannel>,
}

impl SessionHumanInput {
    /// Bind `channel` to `session_id`.
    pub fn new(session_id: SessionId, channel: Arc<HumanChannel>) -> Self {
        Self {
            session_id,
            channel,
        }
    }
}

#[async_trait]
impl HumanInput for SessionHumanInput {
    async fn request(&self, offered: Vec<ActionOption>) -> Result<HumanAction, SimulationError> {
        let pending = self.channel.register(self.session_id, &offered);
        debug!(session_id = %self.session_id, offered = offered.len(), "waiting for human action");
        pending
            .await_value()
            .await
            .map_err(|_| SimulationError::HumanInputCancelled)
    }
}
