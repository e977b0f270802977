//! Server teardown: stop accepting requests, drain the listener, then end
//! every game session.

use std::sync::Arc;
use std::time::Duration;

use impostor_runtime::GameManager;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// How long the listener gets to finish in-flight requests.
const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Owns the listener's cancellation token and the session teardown.
pub struct ShutdownCoordinator {
    token: CancellationToken,
    manager: Arc<GameManager>,
    drain_timeout: Duration,
}

impl ShutdownCoordinator {
    /// Coordinator that tears down the sessions of `manager`.
    pub fn new(manager: Arc<GameManager>) -> Self {
        Self {
            token: CancellationToken::new(),
            manager,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    /// Override the listener drain timeout.
    #[must_use]
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Token the listener stops on.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Whether teardown has started.
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Stop the listener and wait up to the drain timeout for `server` to
    /// exit. Sessions are torn down afterwards even if the drain times out:
    /// live games end in `error` and pending human requests are cancelled.
    pub async fn graceful_shutdown(&self, server: JoinHandle<()>) {
        self.token.cancel();
        info!(
            active_sessions = self.manager.active_count(),
            timeout_secs = self.drain_timeout.as_secs(),
            "draining http listener"
        );

        match tokio::time::timeout(self.drain_timeout, server).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "http server task failed"),
            Err(_) => warn!("listener drain timed out after {:?}", self.drain_timeout),
        }

        self.manager.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use impostor_core::{GameConfig, SessionId};
    use impostor_runtime::{ManagerOptions, SessionStatus};
    use impostor_sim::SandboxFactory;

    fn manager() -> Arc<GameManager> {
        Arc::new(GameManager::new(
            Arc::new(SandboxFactory::new(Duration::ZERO)),
            ManagerOptions::default(),
        ))
    }

    async fn wait_for_pending(manager: &GameManager, id: SessionId) {
        for _ in 0..10_000 {
            if manager.channel().has_pending(id) {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("session {id} never asked the human");
    }

    #[test]
    fn not_shutting_down_initially() {
        assert!(!ShutdownCoordinator::new(manager()).is_shutting_down());
    }

    #[tokio::test]
    async fn graceful_shutdown_ends_sessions() {
        let manager = manager();
        let config = GameConfig {
            seed: Some(3),
            ..GameConfig::default()
        };
        let id = manager.create(config).await.unwrap();
        wait_for_pending(&manager, id).await;

        let coord = ShutdownCoordinator::new(manager.clone());
        let token = coord.token();
        let server = tokio::spawn(async move { token.cancelled().await });
        coord.graceful_shutdown(server).await;

        assert!(coord.is_shutting_down());
        assert_eq!(manager.channel().pending_count(), 0);
        assert_eq!(manager.active_count(), 0);
        assert_eq!(manager.get(id).unwrap().status(), SessionStatus::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn sessions_torn_down_after_drain_timeout() {
        let manager = manager();
        let id = manager.create(GameConfig::default()).await.unwrap();

        let coord = ShutdownCoordinator::new(manager.clone())
            .with_drain_timeout(Duration::from_millis(100));
        let stuck = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(300)).await;
        });
        coord.graceful_shutdown(stuck).await;

        assert_eq!(manager.active_count(), 0);
        assert_eq!(manager.get(id).unwrap().status(), SessionStatus::Error);
    }
}
