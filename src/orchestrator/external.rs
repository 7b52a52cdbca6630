//! Embedded card-payment surface.
//!
//! Builds the checkout page URL handed to the host (an iframe in the
//! browser) and exposes the origin its messages must come from.

use url::Url;

use crate::checkout::types::{CardCheckoutDetails, CheckoutError, CheckoutResult};
use crate::config::schema::{ExternalCheckoutConfig, Network};

/// Block Buck artwork shown on the checkout page.
pub const BLOCK_BUCK_IMAGE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAFAAAABQCAMAAAC5zwKfAAAAAXNSR0IArs4c6QAAABhQTFRFAAAAPolIGBQkcz45Y8dN/q40JlxC93Yi51WP2wAAAAh0Uk5TAP/////////VylQyAAAAm0lEQVRYhe3X0QqAIAyFYVem7//GDQ0ZEjWLYK7zX3UR38WhkkJACCGEjpaRHIB8TywRUVR0axoHq0allBIpujanADVIlxtQbriKnIGnMzKSc95KfNGZmlfPONjMtiELTNUB68WQNhEoN/QNtk+i3PDlc2gZlEdAN+Pjr419sN2mPPU8gfqmBqWp3FB/ppgFg/m/gC9AhBBCP2kHvTwQvZ+Xte4AAAAASUVORK5CYII=";

/// A ready-to-open checkout page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCheckout {
    url: Url,
}

impl ExternalCheckout {
    /// Build the checkout page URL for `amount` Block Bucks.
    ///
    /// `details` is forwarded as the `extra` parameter so the provider can
    /// hand it back to the game API when the payment settles.
    pub fn build(
        config: &ExternalCheckoutConfig,
        network: Network,
        amount: u32,
        listing_id: u64,
        receiver_id: &str,
        details: &CardCheckoutDetails,
    ) -> CheckoutResult<Self> {
        let base = config.resolved_url(network);
        let mut url = Url::parse(&base).map_err(|e| {
            CheckoutError::Validation(format!("Invalid checkout URL '{}': {}", base, e))
        })?;

        let extra = serde_json::Value::Object(details.0.clone()).to_string();
        url.query_pairs_mut()
            .append_pair("itemName", &item_name(amount))
            .append_pair("itemImageURL", &config.item_image_url)
            .append_pair("network", &config.resolved_network(network))
            .append_pair("apiKey", &config.api_key)
            .append_pair("listingId", &listing_id.to_string())
            .append_pair("type", "nft")
            .append_pair("marketplaceCode", &config.marketplace_code)
            .append_pair("receiverId", &receiver_id.to_lowercase())
            .append_pair("extra", &extra);

        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Origin that status messages must carry, e.g. `https://checkout.pokoapp.xyz`.
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }
}

/// "1 Block Buck", "5 Block Bucks".
pub fn item_name(amount: u32) -> String {
    if amount > 1 {
        format!("{} Block Bucks", amount)
    } else {
        format!("{} Block Buck", amount)
    }
}
