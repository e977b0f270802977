//! # impostor-server
//!
//! Axum HTTP transport over the session registry.
//!
//! - Game routes: `POST /create_game`, `GET /game_state`, `POST /human_action`
//! - `GET /health` with uptime and session counters
//! - `GET /metrics` in Prometheus text format
//! - JSON error bodies `{"detail", "code"}` with per-error status codes
//! - Graceful shutdown that drains the listener, then ends every session
//!
//! ## Crate Position
//!
//! Transport layer. Depends on impostor-core, impostor-settings, impostor-runtime.
//! Depended on by: impostor-agent.

#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod health;
pub mod metrics;
pub mod routes;
pub mod server;
pub mod shutdown;

pub use config::ServerConfig;
pub use errors::ApiError;
pub use server::{AppState, ImpostorServer};
pub use shutdown::ShutdownCoordinator;
