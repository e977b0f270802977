//! # impostor-sim
//!
//! A self-contained social-deduction engine for running sessions without a
//! language-model backend.
//!
//! - **Map**: the Skeld rooms and corridors ([`map::Room`])
//! - **Table**: seats, roles, and per-seat counters ([`seat::Seat`])
//! - **Moves**: task-phase and meeting actions and their rendered names
//! - **Game loop**: [`SandboxGame`] plays task phases, meetings, and votes,
//!   asking the human seat through `HumanInput` and choosing randomly for
//!   everyone else
//!
//! Identical seeds give identical games when the human plays identically.
//!
//! ## Crate Position
//!
//! Engine layer. Depends on impostor-core.
//! Depended on by: impostor-agent (and impostor-server tests).

#![deny(unsafe_code)]

pub mod action;
pub mod factory;
pub mod game;
pub mod map;
pub mod seat;

pub use action::Action;
pub use factory::SandboxFactory;
pub use game::SandboxGame;
pub use map::Room;
pub use seat::{COLORS, Role, Seat};
