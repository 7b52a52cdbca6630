//! Block Bucks checkout.
//!
//! # Stages
//! ```text
//! SelectingAmount ──pay_with_matic──▶ AwaitingServer ──────────────────────────▶ Completed
//!        ▲          ──pay_with_card───▶ AwaitingServer ──▶ AwaitingExternalPayment ──▶ Completed
//!        └──────────── any request or wallet failure ◀──┘
//! ```
//!
//! Entering `AwaitingServer` always asks the state holder to save first. The
//! save is best effort and never blocks the purchase.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::blockchain::wallet::Wallet;
use crate::checkout::client::CheckoutClient;
use crate::checkout::finalize::Finalizer;
use crate::checkout::types::{
    AuthToken, BlockBucksPurchase, CheckoutError, CheckoutResult, Currency, Outcome,
    PurchaseIntent, TransactionId,
};
use crate::config::schema::{CheckoutConfig, ExternalCheckoutConfig, Network};
use crate::game::{GameEvent, GameService};
use crate::observability::metrics;
use crate::orchestrator::external::ExternalCheckout;
use crate::orchestrator::messages::{decode_status, InboundMessage, PaymentStatus};

/// A purchasable bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price {
    pub amount: u32,
    pub usd_cents: u32,
}

impl Price {
    /// Price formatted as dollars, e.g. "0.99".
    pub fn usd(&self) -> String {
        format!("{}.{:02}", self.usd_cents / 100, self.usd_cents % 100)
    }
}

pub const PRICES: [Price; 4] = [
    Price { amount: 1, usd_cents: 25 },
    Price { amount: 5, usd_cents: 99 },
    Price { amount: 10, usd_cents: 175 },
    Price { amount: 20, usd_cents: 299 },
];

/// Look up the bundle for `amount`.
pub fn price_for(amount: u32) -> Option<Price> {
    PRICES.iter().copied().find(|p| p.amount == amount)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutStage {
    SelectingAmount {
        price: Option<Price>,
    },
    AwaitingServer {
        price: Price,
    },
    AwaitingExternalPayment {
        price: Price,
        checkout: ExternalCheckout,
    },
    /// `outcome` is set for on-chain purchases; card payments settle off-chain.
    Completed {
        price: Price,
        outcome: Option<Outcome>,
    },
}

impl CheckoutStage {
    pub fn name(&self) -> &'static str {
        match self {
            CheckoutStage::SelectingAmount { .. } => "selecting amount",
            CheckoutStage::AwaitingServer { .. } => "awaiting server",
            CheckoutStage::AwaitingExternalPayment { .. } => "awaiting external payment",
            CheckoutStage::Completed { .. } => "completed",
        }
    }
}

/// What an inbound surface message did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageEffect {
    Ignored,
    /// Payment received; dismissal now blocked.
    Processing,
    Succeeded,
}

impl MessageEffect {
    fn label(self) -> &'static str {
        match self {
            MessageEffect::Ignored => "ignored",
            MessageEffect::Processing => "processing",
            MessageEffect::Succeeded => "succeeded",
        }
    }
}

/// Who is buying: passed in explicitly rather than read from shared state.
#[derive(Debug, Clone)]
pub struct CheckoutContext {
    pub farm_id: u64,
    pub token: AuthToken,
    /// Wallet account credited by card purchases.
    pub receiver_id: String,
}

impl CheckoutContext {
    /// Context crediting card purchases to `wallet`'s account.
    pub fn for_wallet(farm_id: u64, token: AuthToken, wallet: &Wallet) -> Self {
        Self {
            farm_id,
            token,
            receiver_id: wallet.receiver_id(),
        }
    }
}

#[derive(Debug)]
struct Inner {
    stage: CheckoutStage,
    closeable: bool,
}

/// Headless Block Bucks checkout for one farm.
///
/// Shareable across tasks; at most one purchase attempt runs at a time.
pub struct BlockBucksCheckout<G, F> {
    client: CheckoutClient,
    finalizer: F,
    game: G,
    context: CheckoutContext,
    surface: ExternalCheckoutConfig,
    network: Network,
    inner: Mutex<Inner>,
    loading: AtomicBool,
}

/// Clears the loading latch when the attempt ends, however it ends.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<G: GameService, F: Finalizer> BlockBucksCheckout<G, F> {
    pub fn new(
        client: CheckoutClient,
        finalizer: F,
        game: G,
        context: CheckoutContext,
        config: &CheckoutConfig,
    ) -> Self {
        tracing::info!(farm_id = context.farm_id, "begin_checkout");
        Self {
            client,
            finalizer,
            game,
            context,
            surface: config.external_checkout.clone(),
            network: config.network,
            inner: Mutex::new(Inner {
                stage: CheckoutStage::SelectingAmount { price: None },
                closeable: true,
            }),
            loading: AtomicBool::new(false),
        }
    }

    pub fn stage(&self) -> CheckoutStage {
        self.lock().stage.clone()
    }

    /// Whether the checkout may be dismissed right now.
    pub fn closeable(&self) -> bool {
        self.lock().closeable
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Request dismissal. Returns `false` while a payment is being processed.
    pub fn close(&self) -> bool {
        let closeable = self.closeable();
        if !closeable {
            tracing::debug!("Close refused while payment is processing");
        }
        closeable
    }

    /// Choose the bundle to buy.
    pub fn select_price(&self, amount: u32) -> CheckoutResult<Price> {
        let price = price_for(amount)
            .ok_or_else(|| CheckoutError::Validation(format!("No bundle of {} Block Bucks", amount)))?;

        let mut inner = self.lock();
        if self.is_loading() || !matches!(inner.stage, CheckoutStage::SelectingAmount { .. }) {
            return Err(CheckoutError::InvalidStage {
                action: "select a price",
                stage: inner.stage.name(),
            });
        }
        inner.stage = CheckoutStage::SelectingAmount { price: Some(price) };
        Ok(price)
    }

    /// Go back to the price list. Only while closeable.
    pub fn back(&self) -> bool {
        let mut inner = self.lock();
        if !inner.closeable
            || !matches!(inner.stage, CheckoutStage::SelectingAmount { price: Some(_) })
        {
            return false;
        }
        inner.stage = CheckoutStage::SelectingAmount { price: None };
        true
    }

    /// Buy the selected bundle on-chain with MATIC.
    pub async fn pay_with_matic(&self) -> CheckoutResult<Outcome> {
        let _loading = self.begin_loading()?;
        let price = self.selected_price("pay with MATIC")?;
        self.enter_awaiting_server(price).await;

        let intent = self.intent(Currency::Matic, price);
        let result = async {
            let call = self.client.request_block_bucks(&intent).await?;
            let session_id = self.finalizer.finalize(call).await?;
            Ok::<_, CheckoutError>(Outcome::verified(session_id))
        }
        .await;

        match result {
            Ok(outcome) => {
                self.set_stage(CheckoutStage::Completed {
                    price,
                    outcome: Some(outcome.clone()),
                });
                tracing::info!(
                    farm_id = self.context.farm_id,
                    transaction_id = %intent.transaction_id,
                    session_id = %outcome.session_id,
                    amount = price.amount,
                    "Block Bucks purchased"
                );
                self.notify(GameEvent::BuyBlockBucks {
                    currency: Currency::Matic,
                    amount: price.amount,
                })
                .await;
                Ok(outcome)
            }
            Err(e) => Err(self.fail(price, &intent.transaction_id, e)),
        }
    }

    /// Start a card payment for the selected bundle.
    ///
    /// Returns the checkout page to embed; completion arrives later through
    /// [`handle_message`](Self::handle_message).
    pub async fn pay_with_card(&self) -> CheckoutResult<ExternalCheckout> {
        let _loading = self.begin_loading()?;
        let price = self.selected_price("pay with card")?;
        self.enter_awaiting_server(price).await;

        let intent = self.intent(Currency::Usdc, price);
        let result = async {
            let details = self.client.request_card_checkout(&intent).await?;
            ExternalCheckout::build(
                &self.surface,
                self.network,
                price.amount,
                self.context.farm_id,
                &self.context.receiver_id,
                &details,
            )
        }
        .await;

        match result {
            Ok(checkout) => {
                tracing::info!(
                    farm_id = self.context.farm_id,
                    transaction_id = %intent.transaction_id,
                    origin = %checkout.origin(),
                    "Card checkout opened"
                );
                self.set_stage(CheckoutStage::AwaitingExternalPayment {
                    price,
                    checkout: checkout.clone(),
                });
                Ok(checkout)
            }
            Err(e) => Err(self.fail(price, &intent.transaction_id, e)),
        }
    }

    /// Apply a message from the payment surface.
    pub async fn handle_message(&self, message: &InboundMessage) -> MessageEffect {
        let effect = self.apply_message(message);
        metrics::record_message(effect.label());

        if let MessageEffect::Succeeded = effect {
            if let CheckoutStage::Completed { price, .. } = self.stage() {
                tracing::info!(
                    farm_id = self.context.farm_id,
                    amount = price.amount,
                    "Card payment succeeded"
                );
                self.notify(GameEvent::UpdateBlockBucks {
                    amount: price.amount,
                })
                .await;
            }
        }
        effect
    }

    fn apply_message(&self, message: &InboundMessage) -> MessageEffect {
        let mut inner = self.lock();
        let (price, origin) = match &inner.stage {
            CheckoutStage::AwaitingExternalPayment { price, checkout } => (*price, checkout.origin()),
            _ => return MessageEffect::Ignored,
        };

        match decode_status(&origin, message) {
            Some(PaymentStatus::Succeeded) => {
                inner.closeable = true;
                inner.stage = CheckoutStage::Completed {
                    price,
                    outcome: None,
                };
                MessageEffect::Succeeded
            }
            Some(PaymentStatus::PaymentReceived) => {
                inner.closeable = false;
                MessageEffect::Processing
            }
            Some(PaymentStatus::Other(status)) => {
                tracing::debug!(status = %status, "Unhandled checkout status");
                MessageEffect::Ignored
            }
            None => MessageEffect::Ignored,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("checkout state mutex poisoned")
    }

    fn set_stage(&self, stage: CheckoutStage) {
        self.lock().stage = stage;
    }

    fn begin_loading(&self) -> CheckoutResult<LoadingGuard<'_>> {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| CheckoutError::Busy)?;
        Ok(LoadingGuard(&self.loading))
    }

    fn selected_price(&self, action: &'static str) -> CheckoutResult<Price> {
        match self.lock().stage {
            CheckoutStage::SelectingAmount { price: Some(price) } => Ok(price),
            ref stage => Err(CheckoutError::InvalidStage {
                action,
                stage: stage.name(),
            }),
        }
    }

    async fn enter_awaiting_server(&self, price: Price) {
        if let Err(e) = self.game.send(GameEvent::Save).await {
            tracing::warn!(error = %e, "Autosave before checkout failed, continuing");
        }
        self.set_stage(CheckoutStage::AwaitingServer { price });
    }

    fn intent(&self, currency: Currency, price: Price) -> PurchaseIntent<BlockBucksPurchase> {
        PurchaseIntent::new(
            self.context.farm_id,
            BlockBucksPurchase {
                currency,
                amount: price.amount,
            },
            self.context.token.clone(),
        )
    }

    fn fail(
        &self,
        price: Price,
        transaction_id: &TransactionId,
        error: CheckoutError,
    ) -> CheckoutError {
        tracing::warn!(
            farm_id = self.context.farm_id,
            transaction_id = %transaction_id,
            error = %error,
            "Block Bucks checkout failed"
        );
        self.set_stage(CheckoutStage::SelectingAmount { price: Some(price) });
        error
    }

    async fn notify(&self, event: GameEvent) {
        let name = event.name();
        if let Err(e) = self.game.send(event).await {
            tracing::warn!(event = name, error = %e, "State holder rejected checkout event");
        }
    }
}
