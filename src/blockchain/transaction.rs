//! Session transaction encoding and submission.
//!
//! # Responsibilities
//! - ABI-encode the session manager call matching a descriptor
//! - Submit it through the wallet-carrying provider
//! - Turn the receipt into the new session identifier

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::checkout::finalize::Finalizer;
use crate::checkout::types::{SessionCall, SessionId};
use crate::observability::metrics;

sol! {
    /// Game session manager. Every call consumes `sessionId` and opens `nextSessionId`.
    interface SessionManager {
        function withdrawSFL(bytes signature, bytes32 sessionId, bytes32 nextSessionId, uint256 deadline, uint256 farmId, uint256 sfl, uint256 tax);
        function withdrawItems(bytes signature, bytes32 sessionId, bytes32 nextSessionId, uint256 deadline, uint256 farmId, uint256[] ids, uint256[] amounts);
        function withdrawWearables(bytes signature, bytes32 sessionId, bytes32 nextSessionId, uint256 deadline, uint256 farmId, uint256[] ids, uint256[] amounts);
        function withdrawBumpkin(bytes signature, bytes32 sessionId, bytes32 nextSessionId, uint256 deadline, uint256 farmId, uint256 bumpkinId);
        function buyBlockBucks(bytes signature, bytes32 sessionId, bytes32 nextSessionId, uint256 deadline, uint256 farmId, uint256 amount, uint256 fee) payable;
    }
}

/// Calldata and native value for a session call.
pub fn encode_session_call(call: &SessionCall) -> (Bytes, U256) {
    let s = call.session();
    let deadline = U256::from(s.deadline);
    let farm_id = U256::from(s.farm_id);

    match call {
        SessionCall::WithdrawSfl(tx) => {
            let data = SessionManager::withdrawSFLCall {
                signature: s.signature.clone(),
                sessionId: s.session_id,
                nextSessionId: s.next_session_id,
                deadline,
                farmId: farm_id,
                sfl: tx.payload.sfl,
                tax: tx.payload.tax,
            }
            .abi_encode();
            (data.into(), U256::ZERO)
        }
        SessionCall::WithdrawItems(tx) => {
            let data = SessionManager::withdrawItemsCall {
                signature: s.signature.clone(),
                sessionId: s.session_id,
                nextSessionId: s.next_session_id,
                deadline,
                farmId: farm_id,
                ids: tx.payload.ids.clone(),
                amounts: tx.payload.amounts.clone(),
            }
            .abi_encode();
            (data.into(), U256::ZERO)
        }
        SessionCall::WithdrawWearables(tx) => {
            let data = SessionManager::withdrawWearablesCall {
                signature: s.signature.clone(),
                sessionId: s.session_id,
                nextSessionId: s.next_session_id,
                deadline,
                farmId: farm_id,
                ids: tx.payload.ids.clone(),
                amounts: tx.payload.amounts.clone(),
            }
            .abi_encode();
            (data.into(), U256::ZERO)
        }
        SessionCall::WithdrawBumpkin(tx) => {
            let data = SessionManager::withdrawBumpkinCall {
                signature: s.signature.clone(),
                sessionId: s.session_id,
                nextSessionId: s.next_session_id,
                deadline,
                farmId: farm_id,
                bumpkinId: tx.payload.bumpkin_id,
            }
            .abi_encode();
            (data.into(), U256::ZERO)
        }
        SessionCall::BuyBlockBucks(tx) => {
            let data = SessionManager::buyBlockBucksCall {
                signature: s.signature.clone(),
                sessionId: s.session_id,
                nextSessionId: s.next_session_id,
                deadline,
                farmId: farm_id,
                amount: tx.payload.amount,
                fee: tx.payload.fee,
            }
            .abi_encode();
            (data.into(), tx.payload.fee)
        }
    }
}

/// Finalizer that submits session calls through the player's wallet.
#[derive(Debug, Clone)]
pub struct ChainFinalizer {
    client: BlockchainClient,
    contract: Address,
}

impl ChainFinalizer {
    pub fn new(client: BlockchainClient) -> BlockchainResult<Self> {
        let config = client.config();
        if !config.enabled {
            return Err(BlockchainError::NotAvailable(
                "blockchain finalization is disabled".to_string(),
            ));
        }
        let contract: Address = config.session_contract.parse().map_err(|_| {
            BlockchainError::NotAvailable(format!(
                "invalid session contract '{}'",
                config.session_contract
            ))
        })?;
        Ok(Self { client, contract })
    }
}

impl Finalizer for ChainFinalizer {
    async fn finalize(&self, call: SessionCall) -> BlockchainResult<SessionId> {
        let operation = call.operation();
        let next_session = call.session().next_session_id;
        let (data, value) = encode_session_call(&call);

        let tx = TransactionRequest::default()
            .with_to(self.contract)
            .with_input(data)
            .with_value(value);

        let receipt = match self.client.submit(tx).await {
            Ok(receipt) => receipt,
            Err(e) => {
                metrics::record_finalization(operation, "error");
                return Err(e);
            }
        };

        if !receipt.status() {
            metrics::record_finalization(operation, "reverted");
            return Err(BlockchainError::Reverted(format!(
                "{} in {}",
                operation, receipt.transaction_hash
            )));
        }

        metrics::record_finalization(operation, "success");
        tracing::info!(
            operation,
            tx_hash = %receipt.transaction_hash,
            block_number = ?receipt.block_number,
            "Session transaction confirmed"
        );
        Ok(SessionId::from(next_session))
    }
}
