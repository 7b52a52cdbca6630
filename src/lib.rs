//! Checkout and withdrawal client for a farming game with on-chain assets.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────┐   GameEvent    ┌──────────────┐
//!   │ orchestrator │───────────────▶│     game     │  state holder
//!   │ (Block Bucks)│                └──────────────┘
//!   └──────┬───────┘                       ▲
//!          │                               │ WITHDRAWN
//!          ▼                               │
//!   ┌──────────────┐  POST + X-Transaction-ID   ┌──────────┐
//!   │   checkout   │───────────────────────────▶│ game API │
//!   │ client/flows │◀─── descriptor / 429 / 5xx─└──────────┘
//!   └──────┬───────┘
//!          │ Finalizer
//!          ▼
//!   ┌──────────────┐  signed tx   ┌────────────┐
//!   │  blockchain  │─────────────▶│  RPC node  │
//!   └──────────────┘              └────────────┘
//!
//!   config (TOML) and observability (tracing, metrics) cut across all of it.
//! ```

pub mod blockchain;
pub mod checkout;
pub mod config;
pub mod game;
pub mod observability;
pub mod orchestrator;

pub use checkout::{CheckoutClient, CheckoutError, Finalizer, Outcome, Withdrawals};
pub use config::CheckoutConfig;
pub use orchestrator::BlockBucksCheckout;
