//! # impostor-core
//!
//! Shared vocabulary between the session runtime and simulation engines.
//!
//! - **Engine contract**: [`engine::Simulation`], [`engine::SimulationFactory`],
//!   and the [`engine::HumanInput`] capability handed to engines
//! - **Published views**: engines publish [`view::GameView`] snapshots at safe
//!   points; everything outside the engine reads only those snapshots
//! - **Configuration**: [`config::GameConfig`] and its presets
//! - **Logging**: `tracing` subscriber setup shared by binaries and tests
//!
//! ## Crate Position
//!
//! Foundation layer. Depends on no other workspace crate.
//! Depended on by: impostor-runtime, impostor-sim, impostor-server, impostor-agent.

#![deny(unsafe_code)]

pub mod config;
pub mod engine;
pub mod errors;
pub mod ids;
pub mod logging;
pub mod view;

pub use config::{AgentConfig, ControllerKind, GameConfig, GamePreset};
pub use engine::{
    HumanInput, Simulation, SimulationContext, SimulationFactory, ViewPublisher, ViewReader,
    view_channel,
};
pub use errors::SimulationError;
pub use ids::SessionId;
pub use view::{
    ActionOption, ActivityEntry, GameOutcome, GameView, HumanAction, HumanView, Phase,
    PlayerSummary, Team,
};
