//! Blockchain finalization seam.
//!
//! The checkout flows only know this trait. The alloy-backed implementation
//! lives in [`crate::blockchain::transaction::ChainFinalizer`]; tests plug in
//! their own.

use std::future::Future;
use std::sync::Arc;

use crate::blockchain::types::BlockchainResult;
use crate::checkout::types::{SessionCall, SessionId};

/// Submits a server-issued session transaction through the active wallet.
///
/// Implementations must not validate or retry: failures propagate unchanged.
pub trait Finalizer: Send + Sync {
    /// Submit `call` and return the identifier of the session it opens.
    fn finalize(&self, call: SessionCall) -> impl Future<Output = BlockchainResult<SessionId>> + Send;
}

impl<T: Finalizer> Finalizer for Arc<T> {
    fn finalize(&self, call: SessionCall) -> impl Future<Output = BlockchainResult<SessionId>> + Send {
        (**self).finalize(call)
    }
}
