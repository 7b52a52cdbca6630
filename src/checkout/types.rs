//! Checkout request, descriptor and outcome types.

use std::fmt;

use alloy::primitives::{Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::blockchain::types::BlockchainError;

/// Idempotency token sent as `X-Transaction-ID`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Fresh random token.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Short-lived bearer credential for the game API.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Identifier of the on-chain session created by a finalized transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<B256> for SessionId {
    fn from(hash: B256) -> Self {
        Self(hash.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One user-initiated attempt: who, what, and with which credentials.
///
/// Never persisted. A new intent always carries a new [`TransactionId`].
#[derive(Debug, Clone)]
pub struct PurchaseIntent<R> {
    pub farm_id: u64,
    pub request: R,
    pub token: AuthToken,
    pub transaction_id: TransactionId,
}

impl<R> PurchaseIntent<R> {
    pub fn new(farm_id: u64, request: R, token: AuthToken) -> Self {
        Self {
            farm_id,
            request,
            token,
            transaction_id: TransactionId::new(),
        }
    }
}

/// Assets a farm can move out to the owner's wallet.
///
/// Serializes to the request body expected by the matching endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Withdrawal {
    Sfl {
        sfl: f64,
    },
    Items {
        ids: Vec<u32>,
        amounts: Vec<String>,
    },
    Wearables {
        ids: Vec<u32>,
        amounts: Vec<u64>,
    },
    Bumpkin {
        #[serde(rename = "bumpkinId")]
        bumpkin_id: u64,
    },
}

impl Withdrawal {
    /// Endpoint path segment, also used as the operation label.
    pub fn path(&self) -> &'static str {
        match self {
            Withdrawal::Sfl { .. } => "withdraw-sfl",
            Withdrawal::Items { .. } => "withdraw-items",
            Withdrawal::Wearables { .. } => "withdraw-wearables",
            Withdrawal::Bumpkin { .. } => "withdraw-bumpkin",
        }
    }
}

/// Currency a Block Bucks purchase is settled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Paid on-chain from the player's wallet.
    Matic,
    /// Paid by card through the embedded checkout surface.
    Usdc,
}

/// Request body for `buy-blockbucks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockBucksPurchase {
    pub currency: Currency,
    pub amount: u32,
}

/// Fields shared by every server-signed session transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEnvelope {
    pub signature: Bytes,
    pub session_id: B256,
    pub next_session_id: B256,
    pub deadline: u64,
    pub farm_id: u64,
}

/// Server transaction descriptor: session envelope plus a kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTransaction<P> {
    #[serde(flatten)]
    pub session: SessionEnvelope,
    #[serde(flatten)]
    pub payload: P,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SflPayload {
    pub sfl: U256,
    pub tax: U256,
}

/// ERC-1155 style batch (items and wearables).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBatchPayload {
    pub ids: Vec<U256>,
    pub amounts: Vec<U256>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BumpkinPayload {
    pub bumpkin_id: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockBucksPayload {
    pub amount: U256,
    /// Native token paid with the call.
    pub fee: U256,
}

/// A descriptor ready to be handed to a [`Finalizer`](crate::checkout::Finalizer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCall {
    WithdrawSfl(SessionTransaction<SflPayload>),
    WithdrawItems(SessionTransaction<TokenBatchPayload>),
    WithdrawWearables(SessionTransaction<TokenBatchPayload>),
    WithdrawBumpkin(SessionTransaction<BumpkinPayload>),
    BuyBlockBucks(SessionTransaction<BlockBucksPayload>),
}

impl SessionCall {
    pub fn operation(&self) -> &'static str {
        match self {
            SessionCall::WithdrawSfl(_) => "withdraw-sfl",
            SessionCall::WithdrawItems(_) => "withdraw-items",
            SessionCall::WithdrawWearables(_) => "withdraw-wearables",
            SessionCall::WithdrawBumpkin(_) => "withdraw-bumpkin",
            SessionCall::BuyBlockBucks(_) => "buy-blockbucks",
        }
    }

    pub fn session(&self) -> &SessionEnvelope {
        match self {
            SessionCall::WithdrawSfl(tx) => &tx.session,
            SessionCall::WithdrawItems(tx) | SessionCall::WithdrawWearables(tx) => &tx.session,
            SessionCall::WithdrawBumpkin(tx) => &tx.session,
            SessionCall::BuyBlockBucks(tx) => &tx.session,
        }
    }
}

/// Card checkout details returned for a USDC purchase.
///
/// The server's `type` discriminator is dropped; everything else is passed
/// through untouched to the payment surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CardCheckoutDetails(pub serde_json::Map<String, serde_json::Value>);

impl<'de> Deserialize<'de> for CardCheckoutDetails {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let mut map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        map.remove("type");
        Ok(Self(map))
    }
}

/// Result of a verified checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub session_id: SessionId,
    pub verified: bool,
}

impl Outcome {
    pub fn verified(session_id: SessionId) -> Self {
        Self {
            session_id,
            verified: true,
        }
    }
}

/// Errors surfaced by the checkout flows.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The API answered 429.
    #[error("Too many requests, try again later")]
    RateLimited,

    /// The API answered with another 4xx/5xx status.
    #[error("Server rejected the request with status {status}")]
    Server { status: u16 },

    /// The wallet or chain rejected the finalization step.
    #[error(transparent)]
    Wallet(#[from] BlockchainError),

    /// Checked locally before any network call.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Transport failure or undecodable response body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Another attempt is already in flight on this checkout.
    #[error("A checkout attempt is already in progress")]
    Busy,

    /// The operation is not allowed in the current checkout stage.
    #[error("Cannot {action} while {stage}")]
    InvalidStage {
        action: &'static str,
        stage: &'static str,
    },
}

/// Result type for checkout operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;
