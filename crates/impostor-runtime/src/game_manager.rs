//! Session registry: id allocation, creation, snapshots and human moves.

use std::sync::Arc;

use dashmap::DashMap;
use impostor_core::{GameConfig, GameView, HumanAction, SessionId, SimulationFactory, view_channel};
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::errors::RuntimeError;
use crate::experiment::ExperimentRecorder;
use crate::human_channel::{ChannelError, HumanChannel};
use crate::projector::{self, GameSnapshot};
use crate::readiness::{ReadinessOptions, wait_until_ready};
use crate::record::SessionRecord;
use crate::session_task::spawn_session_task;

/// Tunables of the registry.
#[derive(Clone, Copy, Debug, Default)]
pub struct ManagerOptions {
    /// Readiness wait applied to every creation.
    pub readiness: ReadinessOptions,
}

/// Owns every session of the process.
///
/// Shared as `Arc<GameManager>`; there is exactly one per server.
pub struct GameManager {
    sessions: DashMap<SessionId, Arc<SessionRecord>>,
    /// Creation lock; guards the next id to hand out.
    next_id: Mutex<SessionId>,
    channel: Arc<HumanChannel>,
    factory: Arc<dyn SimulationFactory>,
    recorder: Option<Arc<dyn ExperimentRecorder>>,
    options: ManagerOptions,
}

impl GameManager {
    /// Create an empty registry building games with `factory`.
    pub fn new(factory: Arc<dyn SimulationFactory>, options: ManagerOptions) -> Self {
        Self {
            sessions: DashMap::new(),
            next_id: Mutex::new(SessionId::new(1)),
            channel: Arc::new(HumanChannel::new()),
            factory,
            recorder: None,
            options,
        }
    }

    /// Record every created game through `recorder`.
    #[must_use]
    pub fn with_recorder(mut self, recorder: Arc<dyn ExperimentRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// The human hand-off shared by all sessions.
    pub fn channel(&self) -> &Arc<HumanChannel> {
        &self.channel
    }

    /// Registry tunables.
    pub fn options(&self) -> ManagerOptions {
        self.options
    }

    /// Create a game and wait until its human seat can take input.
    ///
    /// On failure the session stays registered with status `error`.
    #[instrument(skip_all, fields(session_id))]
    pub async fn create(&self, config: GameConfig) -> Result<SessionId, RuntimeError> {
        let record = self.register(config)?;
        let session_id = record.id();
        let _ = tracing::Span::current().record("session_id", session_id.get());

        if let Err(e) = wait_until_ready(&record, self.options.readiness).await {
            warn!(error = %e, category = e.category(), "game failed to become ready");
            if record.fail(e.to_string()) {
                metrics::counter!("sessions_failed_total", "reason" => e.category().to_owned())
                    .increment(1);
            }
            record.abort_task();
            return Err(e);
        }

        let _ = record.mark_running();
        info!(engine = self.factory.name(), "game created");
        Ok(session_id)
    }

    /// Allocate an id, insert the record and start its task.
    ///
    /// Runs entirely under the creation lock, so ids are handed out in
    /// insertion order and never reused.
    fn register(&self, config: GameConfig) -> Result<Arc<SessionRecord>, RuntimeError> {
        let mut next_id = self.next_id.lock();
        let session_id = *next_id;
        *next_id = session_id.next();
        metrics::counter!("sessions_created_total").increment(1);

        let (publisher, reader) = view_channel();
        let record = Arc::new(SessionRecord::new(session_id, config, reader));
        let _ = self.sessions.insert(session_id, record.clone());

        if let Some(recorder) = &self.recorder {
            recorder.record(session_id, self.factory.name(), record.config());
        }

        let simulation = match self.factory.build(session_id, record.config()) {
            Ok(simulation) => simulation,
            Err(e) => {
                warn!(%session_id, error = %e, "failed to build game");
                if record.fail(e.to_string()) {
                    metrics::counter!("sessions_failed_total", "reason" => e.category().to_owned())
                        .increment(1);
                }
                return Err(e.into());
            }
        };

        let handle = spawn_session_task(record.clone(), simulation, publisher, self.channel.clone());
        record.attach_task(handle);
        debug!(%session_id, "session task started");
        Ok(record)
    }

    /// Look up a session.
    pub fn get(&self, session_id: SessionId) -> Result<Arc<SessionRecord>, RuntimeError> {
        self.sessions
            .get(&session_id)
            .map(|entry| entry.value().clone())
            .ok_or(RuntimeError::SessionNotFound(session_id))
    }

    /// Snapshot of a session for pollers.
    pub fn get_state(&self, session_id: SessionId) -> Result<GameSnapshot, RuntimeError> {
        let record = self.get(session_id)?;
        Ok(projector::project(&record))
    }

    /// Hand the human's move to the waiting game. Never blocks.
    #[instrument(skip_all, fields(session_id = %session_id, action_index))]
    pub fn submit_action(
        &self,
        session_id: SessionId,
        action_index: usize,
        message: String,
    ) -> Result<(), RuntimeError> {
        let result = self.try_submit(session_id, action_index, message);
        let outcome = match &result {
            Ok(()) => "accepted",
            Err(e) => e.category(),
        };
        metrics::counter!("human_actions_total", "result" => outcome.to_owned()).increment(1);
        match &result {
            Ok(()) => debug!(action_index, "human action accepted"),
            Err(e) => debug!(action_index, error = %e, "human action rejected"),
        }
        result
    }

    fn try_submit(
        &self,
        session_id: SessionId,
        action_index: usize,
        message: String,
    ) -> Result<(), RuntimeError> {
        let record = self.get(session_id)?;

        let status = record.status();
        if status.is_terminal() {
            return Err(RuntimeError::InvalidState { session_id, status });
        }
        if !record.view().read(GameView::has_human) {
            return Err(RuntimeError::NoHumanActor(session_id));
        }

        self.channel
            .submit(
                session_id,
                HumanAction {
                    action_index,
                    message,
                },
            )
            .map_err(|e| match e {
                ChannelError::AlreadyResolved(_) => RuntimeError::AlreadyResolved(session_id),
                ChannelError::OutOfRange { index, available } => {
                    RuntimeError::OutOfRange { index, available }
                }
                ChannelError::NotFound(_) | ChannelError::Closed(_) | ChannelError::Cancelled => {
                    RuntimeError::NotWaiting(session_id)
                }
            })
    }

    /// Number of registered sessions, finished ones included.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of sessions not yet completed or failed.
    pub fn active_count(&self) -> usize {
        self.sessions
            .iter()
            .filter(|entry| !entry.value().status().is_terminal())
            .count()
    }

    /// Fail every live session, abort its task and cancel every pending
    /// human request.
    pub fn shutdown(&self) {
        for entry in &self.sessions {
            let record = entry.value();
            let _ = record.fail("server shut down");
            record.abort_task();
        }
        self.channel.cancel_all();
        info!(sessions = self.sessions.len(), "game manager shut down");
    }
}
