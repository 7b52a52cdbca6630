//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from `checkout.toml`.

use serde::{Deserialize, Serialize};

/// Root configuration for the checkout client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CheckoutConfig {
    /// Which deployment the game runs against.
    pub network: Network,

    /// Game API server settings.
    pub api: ApiConfig,

    /// Blockchain integration settings.
    pub blockchain: BlockchainConfig,

    /// Embedded card-payment surface settings.
    pub external_checkout: ExternalCheckoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Deployment the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Polygon testnet.
    Mumbai,
    /// Polygon mainnet.
    #[default]
    Polygon,
}

impl Network {
    /// Default embedded checkout URL for this network.
    pub fn checkout_url(self) -> &'static str {
        match self {
            Network::Mumbai => "https://dev.checkout.pokoapp.xyz/checkout",
            Network::Polygon => "https://checkout.pokoapp.xyz/checkout",
        }
    }

    /// Payment network name understood by the checkout surface.
    pub fn payment_network(self) -> &'static str {
        match self {
            Network::Mumbai => "polygonMumbaiRealUSDC",
            Network::Polygon => "polygon",
        }
    }
}

/// Game API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL, without trailing slash (e.g., "https://api.example.com").
    pub url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000".to_string(),
        }
    }
}

/// Blockchain integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// Enable on-chain finalization.
    pub enabled: bool,

    /// JSON-RPC endpoint URL used for submission.
    pub rpc_url: String,

    /// Extra endpoints consulted for read-only checks.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// Chain ID (137 for Polygon, 80001 for Mumbai, 31337 for local Anvil).
    pub chain_id: u64,

    /// Address of the session manager contract.
    pub session_contract: String,

    /// Number of block confirmations awaited after submission.
    pub confirmation_blocks: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 137,
            session_contract: String::new(),
            confirmation_blocks: 1,
        }
    }
}

/// Embedded card-payment surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExternalCheckoutConfig {
    /// Checkout URL override. Falls back to the network preset.
    pub url: Option<String>,

    /// Payment network override. Falls back to the network preset.
    pub network: Option<String>,

    /// Marketplace code registered with the checkout provider.
    pub marketplace_code: String,

    /// Public API key of the checkout provider.
    pub api_key: String,

    /// Image shown next to the item name.
    pub item_image_url: String,
}

impl ExternalCheckoutConfig {
    /// Checkout URL for `network`, honouring the override.
    pub fn resolved_url(&self, network: Network) -> String {
        self.url
            .clone()
            .unwrap_or_else(|| network.checkout_url().to_string())
    }

    /// Payment network name for `network`, honouring the override.
    pub fn resolved_network(&self, network: Network) -> String {
        self.network
            .clone()
            .unwrap_or_else(|| network.payment_network().to_string())
    }
}

impl Default for ExternalCheckoutConfig {
    fn default() -> Self {
        Self {
            url: None,
            network: None,
            marketplace_code: "sunflowerland".to_string(),
            api_key: String::new(),
            item_image_url: crate::orchestrator::external::BLOCK_BUCK_IMAGE.to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
