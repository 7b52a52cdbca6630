//! Game API client for checkout and withdrawal requests.
//!
//! One POST per call, no retries. The status code decides the outcome:
//! 429 is [`CheckoutError::RateLimited`], any other status ≥ 400 is
//! [`CheckoutError::Server`], everything else is parsed as the descriptor.

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::checkout::types::{
    BlockBucksPurchase, BlockBucksPayload, BumpkinPayload, CardCheckoutDetails, CheckoutError,
    CheckoutResult, PurchaseIntent, SessionCall, SessionTransaction, SflPayload,
    TokenBatchPayload, Withdrawal,
};
use crate::observability::metrics;

/// Idempotency header understood by the game API.
pub const TRANSACTION_ID_HEADER: &str = "X-Transaction-ID";

const BLOCK_BUCKS_PATH: &str = "buy-blockbucks";

#[derive(Clone, Debug)]
pub struct CheckoutClient {
    api_url: String,
    client: Client,
}

impl CheckoutClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(api_url, Client::new())
    }

    pub fn with_client(api_url: impl Into<String>, client: Client) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { api_url, client }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Send one request to `{api_url}/{path}/{farm_id}` and decode the body.
    pub async fn post<R, B, T>(
        &self,
        path: &'static str,
        intent: &PurchaseIntent<R>,
        body: &B,
    ) -> CheckoutResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}/{}", self.api_url, path, intent.farm_id);
        tracing::debug!(
            operation = path,
            farm_id = intent.farm_id,
            transaction_id = %intent.transaction_id,
            "Sending checkout request"
        );

        let resp = match self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", intent.token.as_str()))
            .header(TRANSACTION_ID_HEADER, intent.transaction_id.to_string())
            .json(body)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                metrics::record_request(path, "transport_error");
                return Err(e.into());
            }
        };

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            metrics::record_request(path, "rate_limited");
            tracing::warn!(
                operation = path,
                transaction_id = %intent.transaction_id,
                "Checkout request rate limited"
            );
            return Err(CheckoutError::RateLimited);
        }
        if status.as_u16() >= 400 {
            metrics::record_request(path, "server_error");
            tracing::warn!(
                operation = path,
                transaction_id = %intent.transaction_id,
                status = status.as_u16(),
                "Checkout request rejected"
            );
            return Err(CheckoutError::Server {
                status: status.as_u16(),
            });
        }

        match resp.json::<T>().await {
            Ok(descriptor) => {
                metrics::record_request(path, "success");
                Ok(descriptor)
            }
            Err(e) => {
                metrics::record_request(path, "decode_error");
                Err(e.into())
            }
        }
    }

    /// Ask the server to sign a withdrawal session transaction.
    pub async fn request_withdrawal(
        &self,
        intent: &PurchaseIntent<Withdrawal>,
    ) -> CheckoutResult<SessionCall> {
        let path = intent.request.path();
        let body = &intent.request;
        let call = match body {
            Withdrawal::Sfl { .. } => SessionCall::WithdrawSfl(
                self.post::<_, _, SessionTransaction<SflPayload>>(path, intent, body).await?,
            ),
            Withdrawal::Items { .. } => SessionCall::WithdrawItems(
                self.post::<_, _, SessionTransaction<TokenBatchPayload>>(path, intent, body).await?,
            ),
            Withdrawal::Wearables { .. } => SessionCall::WithdrawWearables(
                self.post::<_, _, SessionTransaction<TokenBatchPayload>>(path, intent, body).await?,
            ),
            Withdrawal::Bumpkin { .. } => SessionCall::WithdrawBumpkin(
                self.post::<_, _, SessionTransaction<BumpkinPayload>>(path, intent, body).await?,
            ),
        };
        Ok(call)
    }

    /// Ask the server to sign an on-chain (MATIC) Block Bucks purchase.
    pub async fn request_block_bucks(
        &self,
        intent: &PurchaseIntent<BlockBucksPurchase>,
    ) -> CheckoutResult<SessionCall> {
        let tx = self
            .post::<_, _, SessionTransaction<BlockBucksPayload>>(BLOCK_BUCKS_PATH, intent, &intent.request)
            .await?;
        Ok(SessionCall::BuyBlockBucks(tx))
    }

    /// Ask the server to open a card (USDC) checkout for Block Bucks.
    pub async fn request_card_checkout(
        &self,
        intent: &PurchaseIntent<BlockBucksPurchase>,
    ) -> CheckoutResult<CardCheckoutDetails> {
        self.post(BLOCK_BUCKS_PATH, intent, &intent.request).await
    }
}
