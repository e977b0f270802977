//! Session task: drives one game to completion on its own tokio task.
//!
//! State machine: `initializing → running → {completed, error}`. Engine
//! errors and panics end in `error`; neither escapes the task. Whatever way
//! the task exits, including abort, the session's pending human request is
//! cancelled.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use impostor_core::{Simulation, SimulationContext, ViewPublisher};
use tokio::task::JoinHandle;
use tracing::{Instrument, info, info_span, warn};

use crate::human_channel::{HumanChannel, SessionHumanInput};
use crate::record::SessionRecord;

/// Cancels the session's pending request when dropped.
struct PendingCleanup {
    record: Arc<SessionRecord>,
    channel: Arc<HumanChannel>,
}

impl Drop for PendingCleanup {
    fn drop(&mut self) {
        if self.channel.cancel(self.record.id()) {
            tracing::debug!(session_id = %self.record.id(), "cancelled pending human request on task exit");
        }
    }
}

/// Spawn the task that runs `simulation` for `record`.
pub fn spawn_session_task(
    record: Arc<SessionRecord>,
    simulation: Box<dyn Simulation>,
    publisher: ViewPublisher,
    channel: Arc<HumanChannel>,
) -> JoinHandle<()> {
    let span = info_span!("session", session_id = %record.id());
    tokio::spawn(run_session(record, simulation, publisher, channel).instrument(span))
}

async fn run_session(
    record: Arc<SessionRecord>,
    simulation: Box<dyn Simulation>,
    publisher: ViewPublisher,
    channel: Arc<HumanChannel>,
) {
    let _cleanup = PendingCleanup {
        record: record.clone(),
        channel: channel.clone(),
    };

    if record.mark_running() {
        info!("session running");
    }

    let session_id = record.id();
    let ctx = SimulationContext {
        session_id,
        view: publisher,
        human: Arc::new(SessionHumanInput::new(session_id, channel)),
    };

    match AssertUnwindSafe(simulation.run(ctx)).catch_unwind().await {
        Ok(Ok(outcome)) => {
            info!(winner = %outcome.winner, reason = %outcome.reason, "session completed");
            let _ = record.complete(outcome);
        }
        Ok(Err(e)) => {
            warn!(error = %e, category = e.category(), "session failed");
            if record.fail(e.to_string()) {
                metrics::counter!("sessions_failed_total", "reason" => e.category().to_owned())
                    .increment(1);
            }
        }
        Err(payload) => {
            let message = format!("engine panicked: {}", panic_message(payload.as_ref()));
            warn!(error = %message, "session failed");
            if record.fail(message) {
                metrics::counter!("sessions_failed_total", "reason" => "panic").increment(1);
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use impostor_core::{
        ActionOption, GameConfig, GameOutcome, SessionId, SimulationError, Team, view_channel,
    };

    use crate::record::SessionStatus;

    enum Script {
        Win,
        Fail,
        Panic,
        WaitForHuman,
    }

    struct Scripted(Script);

    #[async_trait]
    impl Simulation for Scripted {
        async fn run(
            self: Box<Self>,
            ctx: SimulationContext,
        ) -> Result<GameOutcome, SimulationError> {
            match self.0 {
                Script::Win => Ok(GameOutcome {
                    winner: Team::Impostors,
                    reason: "impostors outnumber crewmates".into(),
                }),
                Script::Fail => Err(SimulationError::Engine("table collapsed".into())),
                Script::Panic => panic!("scripted panic"),
                Script::WaitForHuman => {
                    let _ = ctx.human.request(vec![ActionOption::new("SKIP VOTE")]).await?;
                    Ok(GameOutcome {
                        winner: Team::Crewmates,
                        reason: "human voted".into(),
                    })
                }
            }
        }
    }

    fn start(script: Script) -> (Arc<SessionRecord>, Arc<HumanChannel>, JoinHandle<()>) {
        let (publisher, reader) = view_channel();
        let record = Arc::new(SessionRecord::new(
            SessionId::new(7),
            GameConfig::default(),
            reader,
        ));
        let channel = Arc::new(HumanChannel::new());
        let handle = spawn_session_task(
            record.clone(),
            Box::new(Scripted(script)),
            publisher,
            channel.clone(),
        );
        (record, channel, handle)
    }

    #[tokio::test]
    async fn success_records_outcome() {
        let (record, _channel, handle) = start(Script::Win);
        handle.await.unwrap();
        assert_eq!(record.status(), SessionStatus::Completed);
        assert_eq!(record.outcome().unwrap().winner, Team::Impostors);
    }

    #[tokio::test]
    async fn engine_error_records_message() {
        let (record, _channel, handle) = start(Script::Fail);
        handle.await.unwrap();
        assert_eq!(record.status(), SessionStatus::Error);
        assert_eq!(
            record.error().as_deref(),
            Some("Engine failure: table collapsed")
        );
    }

    #[tokio::test]
    async fn panic_is_contained() {
        let (record, _channel, handle) = start(Script::Panic);
        assert!(handle.await.is_ok());
        assert_eq!(record.status(), SessionStatus::Error);
        assert!(record.error().unwrap().contains("scripted panic"));
    }

    #[tokio::test]
    async fn human_move_completes_game() {
        let (record, channel, handle) = start(Script::WaitForHuman);
        while !channel.has_pending(record.id()) {
            tokio::task::yield_now().await;
        }
        assert_eq!(record.status(), SessionStatus::Running);
        channel
            .submit(record.id(), impostor_core::HumanAction::default())
            .unwrap();
        handle.await.unwrap();
        assert_eq!(record.status(), SessionStatus::Completed);
    }

    #[tokio::test]
    async fn abort_cancels_pending_request() {
        let (record, channel, handle) = start(Script::WaitForHuman);
        while !channel.has_pending(record.id()) {
            tokio::task::yield_now().await;
        }
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
        assert!(!channel.has_pending(record.id()));
        assert_eq!(record.status(), SessionStatus::Running);
    }

    #[tokio::test]
    async fn cancelled_request_fails_session() {
        let (record, channel, handle) = start(Script::WaitForHuman);
        while !channel.has_pending(record.id()) {
            tokio::task::yield_now().await;
        }
        assert!(channel.cancel(record.id()));
        handle.await.unwrap();
        assert_eq!(record.status(), SessionStatus::Error);
        assert_eq!(record.error().as_deref(), Some("Human input cancelled"));
    }

    #[test]
    fn panic_message_variants() {
        let s: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(s.as_ref()), "static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");
        let other: Box<dyn Any + Send> = Box::new(5_u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
