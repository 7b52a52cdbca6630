//! Game state holder.
//!
//! # Data Flow
//! ```text
//! checkout flow ──GameEvent──▶ GameService::send ──▶ GameState::apply ──▶ new GameState
//! ```
//!
//! Flows never reach into shared state directly; they hold a `GameService`
//! handle and route every mutation through `send`.

pub mod service;
pub mod state;

pub use service::{GameError, GameService, LocalGame};
pub use state::{GameEvent, GameState};
