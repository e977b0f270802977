//! # impostor-runtime
//!
//! Session lifecycle and human synchronization for impostor games.
//!
//! - **Registry**: [`GameManager`] allocates session ids under a creation lock,
//!   starts one task per game, and serves snapshots and human moves
//! - **Human hand-off**: [`HumanChannel`] holds at most one pending request per
//!   session and fulfills it exactly once
//! - **Readiness gate**: [`readiness::wait_until_ready`] blocks creation until
//!   the human seat exists, the task dies, or the deadline passes
//! - **Projection**: [`projector::project`] turns the last published view into
//!   a transport-agnostic [`GameSnapshot`]
//! - **Experiment records**: [`experiment::ExperimentRecorder`] writes one JSON
//!   record per created game, fire-and-forget
//!
//! ## Crate Position
//!
//! Depends on: impostor-core.
//! Depended on by: impostor-server, impostor-agent.

#![deny(unsafe_code)]

pub mod errors;
pub mod experiment;
pub mod game_manager;
pub mod human_channel;
pub mod projector;
pub mod readiness;
pub mod record;
pub mod session_task;

pub use errors::RuntimeError;
pub use experiment::{ExperimentRecord, ExperimentRecorder, FileExperimentRecorder};
pub use game_manager::{GameManager, ManagerOptions};
pub use human_channel::{ChannelError, HumanChannel, PendingHumanRequest, SessionHumanInput};
pub use projector::{ActionEntry, GameSnapshot, MeetingMessage, PlayerPosition};
pub use readiness::ReadinessOptions;
pub use record::{SessionRecord, SessionStatus};
