//! Readiness gate: wait until a new session can take human input.

use std::time::Duration;

use impostor_core::GameView;
use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::errors::RuntimeError;
use crate::record::SessionRecord;

/// Timing of the readiness wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadinessOptions {
    /// Give up after this long.
    pub timeout: Duration,
    /// Re-check this often.
    pub poll_interval: Duration,
}

impl Default for ReadinessOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(50),
        }
    }
}

/// Poll `record` until its published view exposes the human seat.
///
/// A task that already exited wins over a human seat in the same poll:
/// the game is over and cannot take input.
pub async fn wait_until_ready(
    record: &SessionRecord,
    options: ReadinessOptions,
) -> Result<(), RuntimeError> {
    let session_id = record.id();
    let deadline = Instant::now() + options.timeout;
    let mut polls: u32 = 0;

    loop {
        if record.is_task_finished() {
            return Err(RuntimeError::PrematureCompletion {
                session_id,
                cause: record.error(),
            });
        }
        if record.view().read(GameView::has_human) {
            debug!(%session_id, polls, "human player ready");
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(RuntimeError::ReadinessTimeout {
                session_id,
                timeout: options.timeout,
            });
        }
        polls += 1;
        sleep(options.poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use impostor_core::{GameConfig, HumanView, SessionId, view_channel};

    use crate::record::SessionRecord;

    fn human_view() -> HumanView {
        HumanView {
            player_name: "Player 4: lime".into(),
            available_actions: vec![],
            current_step: None,
            player_info: None,
        }
    }

    fn running_record() -> (SessionRecord, impostor_core::ViewPublisher) {
        let (publisher, reader) = view_channel();
        let record = SessionRecord::new(SessionId::new(1), GameConfig::default(), reader);
        record.attach_task(tokio::spawn(std::future::pending::<()>()));
        (record, publisher)
    }

    #[test]
    fn default_options() {
        let opts = ReadinessOptions::default();
        assert_eq!(opts.timeout, Duration::from_secs(10));
        assert_eq!(opts.poll_interval, Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn ready_immediately_when_human_present() {
        let (record, publisher) = running_record();
        publisher.update(|v| v.human = Some(human_view()));
        wait_until_ready(&record, ReadinessOptions::default())
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn ready_after_human_appears() {
        let (record, publisher) = running_record();
        let started = Instant::now();
        let _ = tokio::spawn(async move {
            sleep(Duration::from_millis(120)).await;
            publisher.update(|v| v.human = Some(human_view()));
            std::future::pending::<()>().await;
        });
        wait_until_ready(&record, ReadinessOptions::default())
            .await
            .unwrap();
        let waited = started.elapsed();
        assert!(waited >= Duration::from_millis(120));
        assert!(waited < Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_without_human() {
        let (record, _publisher) = running_record();
        let started = Instant::now();
        let err = wait_until_ready(&record, ReadinessOptions::default())
            .await
            .unwrap_err();
        assert_matches!(err, RuntimeError::ReadinessTimeout { .. });
        assert!(started.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn finished_task_is_premature_completion() {
        let (publisher, reader) = view_channel();
        let record = SessionRecord::new(SessionId::new(2), GameConfig::default(), reader);
        assert!(record.fail("engine refused to start"));
        record.attach_task(tokio::spawn(async {}));
        publisher.update(|v| v.human = Some(human_view()));
        while !record.is_task_finished() {
            tokio::task::yield_now().await;
        }

        let err = wait_until_ready(&record, ReadinessOptions::default())
            .await
            .unwrap_err();
        assert_matches!(
            err,
            RuntimeError::PrematureCompletion { cause: Some(ref c), .. } if c == "engine refused to start"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn custom_timeout_is_honored() {
        let (record, _publisher) = running_record();
        let opts = ReadinessOptions {
            timeout: Duration::from_millis(200),
            poll_interval: Duration::from_millis(10),
        };
        let started = Instant::now();
        let err = wait_until_ready(&record, opts).await.unwrap_err();
        assert_matches!(err, RuntimeError::ReadinessTimeout { timeout, .. } if timeout == Duration::from_millis(200));
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
