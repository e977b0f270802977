//! Simulation engine contract.
//!
//! ```text
//! SimulationFactory::build ──► Box<dyn Simulation> ──(moved into session task)──► run(ctx)
//!                                                                                  │
//!            pollers ◄── ViewReader ◄── watch ◄── ViewPublisher::publish ◄─────────┤
//!                                                                                  │
//!        submitters ──► HumanChannel ──► HumanInput::request ◄─────────────────────┘
//! ```
//!
//! The engine is exclusively owned by the task that runs it. Observers never
//! touch engine state; they read the last [`GameView`] the engine published.
//! The human-controlled seat is driven through [`HumanInput`], identified by
//! capability rather than by a concrete player type.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::config::GameConfig;
use crate::errors::SimulationError;
use crate::ids::SessionId;
use crate::view::{ActionOption, GameOutcome, GameView, HumanAction};

/// A single game, run to completion by its session task.
#[async_trait]
pub trait Simulation: Send + 'static {
    /// Play the whole game. Seat dealing happens inside this call, so the
    /// human seat only appears in the published view once `run` started.
    async fn run(self: Box<Self>, ctx: SimulationContext) -> Result<GameOutcome, SimulationError>;
}

/// Builds engines from a game configuration.
pub trait SimulationFactory: Send + Sync {
    /// Engine name for logs and experiment records.
    fn name(&self) -> &str;

    /// Construct (but do not start) a game.
    fn build(
        &self,
        session_id: SessionId,
        config: &GameConfig,
    ) -> Result<Box<dyn Simulation>, SimulationError>;
}

/// Capability through which the engine obtains the human's move.
#[async_trait]
pub trait HumanInput: Send + Sync {
    /// Offer `offered` to the human and suspend until a move arrives.
    ///
    /// Fails with [`SimulationError::HumanInputCancelled`] when the pending
    /// request is cancelled instead of fulfilled.
    async fn request(&self, offered: Vec<ActionOption>) -> Result<HumanAction, SimulationError>;
}

/// Everything the engine gets from the session runtime.
pub struct SimulationContext {
    /// The session this game belongs to.
    pub session_id: SessionId,
    /// Where the engine publishes its views.
    pub view: ViewPublisher,
    /// Human move source.
    pub human: Arc<dyn HumanInput>,
}

/// Engine side of the view channel.
pub struct ViewPublisher {
    tx: watch::Sender<GameView>,
}

impl ViewPublisher {
    /// Replace the published view.
    pub fn publish(&self, view: GameView) {
        let _ = self.tx.send_replace(view);
    }

    /// Edit the published view in place.
    pub fn update(&self, f: impl FnOnce(&mut GameView)) {
        self.tx.send_modify(f);
    }

    /// Copy of the currently published view.
    pub fn current(&self) -> GameView {
        self.tx.borrow().clone()
    }

    /// A new reader on this channel.
    pub fn reader(&self) -> ViewReader {
        ViewReader {
            rx: self.tx.subscribe(),
        }
    }
}

/// Observer side of the view channel.
#[derive(Clone)]
pub struct ViewReader {
    rx: watch::Receiver<GameView>,
}

impl ViewReader {
    /// Run `f` against the latest view without copying it.
    ///
    /// The view is locked for the duration of `f`; never await inside.
    pub fn read<R>(&self, f: impl FnOnce(&GameView) -> R) -> R {
        f(&self.rx.borrow())
    }

    /// Copy of the latest view.
    pub fn snapshot(&self) -> GameView {
        self.rx.borrow().clone()
    }
}

/// Create a connected publisher/reader pair seeded with an empty view.
pub fn view_channel() -> (ViewPublisher, ViewReader) {
    let (tx, rx) = watch::channel(GameView::default());
    (ViewPublisher { tx }, ViewReader { rx })
}
