//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variable (wallet private key) + config (RPC URL, contract)
//!     → wallet.rs (key loading, signer)
//!     → client.rs (provider carrying the signer)
//!     → transaction.rs (encode session call, submit, await receipt)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or signatures
//! - Server-issued descriptors are submitted as given

pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use transaction::ChainFinalizer;
pub use types::{BlockchainConfig, BlockchainError, BlockchainResult, ChainId};
pub use wallet::Wallet;
