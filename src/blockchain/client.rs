//! Blockchain RPC client carrying the player's wallet.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoint with the wallet as signer
//! - Submit transactions and wait for their receipt
//! - Verify the connected chain (read-only, with failover endpoints)
//!
//! Submission only ever goes through the primary endpoint, once. No timeout
//! is layered on top of the provider's own defaults.

use std::sync::Arc;

use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};

use crate::blockchain::types::{BlockchainConfig, BlockchainError, BlockchainResult, ChainId};
use crate::blockchain::wallet::Wallet;

/// Wallet/provider handle used by the finalization step.
#[derive(Clone)]
pub struct BlockchainClient {
    /// Primary provider; signs with the wallet.
    signing: Arc<dyn Provider + Send + Sync>,
    /// Read-only failover providers.
    readers: Vec<Arc<dyn Provider + Send + Sync>>,
    config: BlockchainConfig,
    account: String,
}

impl BlockchainClient {
    /// Create a client for `wallet` against the configured endpoint.
    ///
    /// A chain ID mismatch is logged, not fatal: the wallet may still be
    /// switching networks.
    pub async fn new(config: BlockchainConfig, wallet: &Wallet) -> BlockchainResult<Self> {
        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        let signing = Arc::new(
            ProviderBuilder::new()
                .wallet(wallet.network_wallet())
                .connect_http(primary_url),
        ) as Arc<dyn Provider + Send + Sync>;

        let mut readers = Vec::new();
        for url_str in &config.failover_urls {
            match url_str.parse::<url::Url>() {
                Ok(url) => readers.push(
                    Arc::new(ProviderBuilder::new().connect_http(url)) as Arc<dyn Provider + Send + Sync>
                ),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        let client = Self {
            signing,
            readers,
            config: config.clone(),
            account: wallet.account().to_string(),
        };

        match client.verify_chain_id().await {
            Ok(()) => tracing::info!(
                rpc_url = %config.rpc_url,
                chain_id = config.chain_id,
                account = %client.account,
                "Blockchain client initialized"
            ),
            Err(e) => tracing::warn!(
                error = %e,
                "Blockchain client initialized but chain verification failed"
            ),
        }

        Ok(client)
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Get the chain ID, trying the failover endpoints in order.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        let providers = std::iter::once(&self.signing).chain(self.readers.iter());
        for (i, provider) in providers.enumerate() {
            match provider.get_chain_id().await {
                Ok(id) => return Ok(ChainId(id)),
                Err(e) => {
                    tracing::warn!(provider_idx = i, error = %e, "RPC error, trying next provider");
                }
            }
        }
        Err(BlockchainError::Rpc("All RPC providers failed".to_string()))
    }

    /// Sign and submit `tx`, then wait for the configured confirmations.
    pub async fn submit(&self, tx: TransactionRequest) -> BlockchainResult<TransactionReceipt> {
        let pending = self
            .signing
            .send_transaction(tx)
            .await
            .map_err(|e| BlockchainError::Rpc(format!("Submission failed: {}", e)))?;

        let tx_hash = *pending.tx_hash();
        tracing::info!(tx_hash = %tx_hash, "Transaction submitted");

        pending
            .with_required_confirmations(self.config.confirmation_blocks)
            .get_receipt()
            .await
            .map_err(|e| BlockchainError::Rpc(format!("Receipt for {} unavailable: {}", tx_hash, e)))
    }

    pub fn config(&self) -> &BlockchainConfig {
        &self.config
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("account", &self.account)
            .finish()
    }
}
