//! The state holder handle passed to checkout flows.

use std::future::Future;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::game::state::{GameEvent, GameState};

#[derive(Debug, Error)]
pub enum GameError {
    #[error("Save failed: {0}")]
    SaveFailed(String),

    #[error("Event {0} rejected")]
    Rejected(&'static str),
}

/// Single entry point for reading and mutating game state.
pub trait GameService: Send + Sync {
    /// Current snapshot.
    fn state(&self) -> GameState;

    /// Dispatch `event` and return the resulting state.
    fn send(&self, event: GameEvent) -> impl Future<Output = Result<GameState, GameError>> + Send;
}

impl<T: GameService> GameService for Arc<T> {
    fn state(&self) -> GameState {
        (**self).state()
    }

    fn send(&self, event: GameEvent) -> impl Future<Output = Result<GameState, GameError>> + Send {
        (**self).send(event)
    }
}

/// In-memory state holder.
#[derive(Debug, Default)]
pub struct LocalGame {
    state: Mutex<GameState>,
}

impl LocalGame {
    pub fn new(state: GameState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }
}

impl GameService for LocalGame {
    fn state(&self) -> GameState {
        self.state.lock().expect("game state mutex poisoned").clone()
    }

    async fn send(&self, event: GameEvent) -> Result<GameState, GameError> {
        let mut state = self.state.lock().expect("game state mutex poisoned");
        let next = state.apply(&event);
        tracing::debug!(event = event.name(), farm_id = next.farm_id, "Game event applied");
        *state = next.clone();
        Ok(next)
    }
}
