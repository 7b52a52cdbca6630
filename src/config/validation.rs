//! Configuration validation.
//!
//! Semantic checks that serde cannot express: URLs parse, the session contract
//! is a valid address when finalization is enabled, and so on. Every problem
//! is reported, not just the first.

use alloy::primitives::Address;
use thiserror::Error;
use url::Url;

use crate::config::schema::CheckoutConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// Human-readable description.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &CheckoutConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = Url::parse(&config.api.url) {
        errors.push(ValidationError::new("api.url", format!("invalid URL: {}", e)));
    }

    let checkout_url = config.external_checkout.resolved_url(config.network);
    match Url::parse(&checkout_url) {
        Ok(url) if !url.origin().is_tuple() => {
            errors.push(ValidationError::new(
                "external_checkout.url",
                "URL has no origin to match messages against",
            ));
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::new(
            "external_checkout.url",
            format!("invalid URL: {}", e),
        )),
    }

    let chain = &config.blockchain;
    if chain.enabled {
        if let Err(e) = Url::parse(&chain.rpc_url) {
            errors.push(ValidationError::new("blockchain.rpc_url", format!("invalid URL: {}", e)));
        }
        if chain.chain_id == 0 {
            errors.push(ValidationError::new("blockchain.chain_id", "must be non-zero"));
        }
        if chain.session_contract.parse::<Address>().is_err() {
            errors.push(ValidationError::new(
                "blockchain.session_contract",
                format!("'{}' is not an address", chain.session_contract),
            ));
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "must be a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
