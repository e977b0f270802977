//! `ImpostorServer`: router assembly and listener.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use impostor_runtime::GameManager;
use impostor_settings::GameSettings;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::metrics as server_metrics;
use crate::routes;
use crate::shutdown::ShutdownCoordinator;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Session registry.
    pub manager: Arc<GameManager>,
    /// Defaults for new games.
    pub game: Arc<GameSettings>,
    /// Prometheus handle for `/metrics`.
    pub metrics: PrometheusHandle,
    /// When the server started.
    pub start_time: Instant,
}

/// The HTTP server.
pub struct ImpostorServer {
    config: ServerConfig,
    manager: Arc<GameManager>,
    game: Arc<GameSettings>,
    metrics: PrometheusHandle,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
}

impl ImpostorServer {
    /// Create a new server.
    pub fn new(
        config: ServerConfig,
        manager: Arc<GameManager>,
        game: GameSettings,
        metrics: PrometheusHandle,
    ) -> Self {
        Self {
            config,
            game: Arc::new(game),
            metrics,
            shutdown: Arc::new(ShutdownCoordinator::new(manager.clone())),
            manager,
            start_time: Instant::now(),
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            manager: self.manager.clone(),
            game: self.game.clone(),
            metrics: self.metrics.clone(),
            start_time: self.start_time,
        };

        Router::new()
            .route("/create_game", post(routes::create_game))
            .route("/game_state", get(routes::game_state))
            .route("/human_action", post(routes::human_action))
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Bind and serve in a background task until shutdown is requested.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        let addr = listener.local_addr()?;
        let app = self.router();
        let token = self.shutdown.token();

        let handle = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(token.cancelled_owned())
                .await;
            if let Err(e) = served {
                warn!(error = %e, "http server stopped with error");
            }
        });
        info!(%addr, "http server bound");
        Ok((addr, handle))
    }

    /// The session registry.
    pub fn manager(&self) -> &Arc<GameManager> {
        &self.manager
    }

    /// The shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// The server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(
        state.start_time,
        state.manager.active_count(),
        state.manager.session_count(),
    ))
}

/// GET /metrics
#[allow(clippy::cast_precision_loss)]
async fn metrics_handler(State(state): State<AppState>) -> String {
    metrics::gauge!(server_metrics::SESSIONS_ACTIVE).set(state.manager.active_count() as f64);
    server_metrics::render(&state.metrics)
}
