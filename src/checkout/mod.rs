//! Checkout and withdrawal protocol.
//!
//! # Data Flow
//! ```text
//! PurchaseIntent (fresh X-Transaction-ID)
//!     → client.rs   POST {api}/{operation}/{farmId}   (429 / ≥400 / descriptor)
//!     → finalize.rs Finalizer::finalize(descriptor)   (wallet submits)
//!     → Outcome { sessionId, verified: true }
//! ```
//!
//! # Design Decisions
//! - Single attempt: nothing here retries, on either leg
//! - A rate-limited or rejected request never reaches the wallet
//! - Descriptors are passed to the wallet as received

pub mod client;
pub mod finalize;
pub mod types;
pub mod withdraw;

pub use client::CheckoutClient;
pub use finalize::Finalizer;
pub use types::{
    AuthToken, BlockBucksPurchase, CheckoutError, CheckoutResult, Currency, Outcome,
    PurchaseIntent, SessionCall, SessionId, TransactionId, Withdrawal,
};
pub use withdraw::Withdrawals;
