//! Withdrawal flows: server request, then on-chain finalization.

use tokio::sync::Mutex;

use crate::checkout::client::CheckoutClient;
use crate::checkout::finalize::Finalizer;
use crate::checkout::types::{
    AuthToken, CheckoutError, CheckoutResult, Outcome, PurchaseIntent, Withdrawal,
};
use crate::game::{GameEvent, GameService};

/// Withdraws farm assets to the player's wallet.
///
/// Share one instance per farm: checked withdrawals run one at a time so
/// each is validated against the state left by the previous one.
pub struct Withdrawals<F> {
    client: CheckoutClient,
    finalizer: F,
    checked: Mutex<()>,
}

impl<F: Finalizer> Withdrawals<F> {
    pub fn new(client: CheckoutClient, finalizer: F) -> Self {
        Self {
            client,
            finalizer,
            checked: Mutex::new(()),
        }
    }

    /// Request the signed transaction, then submit it through the wallet.
    ///
    /// Exactly one API request and at most one finalization per call.
    pub async fn withdraw(&self, intent: &PurchaseIntent<Withdrawal>) -> CheckoutResult<Outcome> {
        let call = self.client.request_withdrawal(intent).await?;

        let session_id = self.finalizer.finalize(call).await.map_err(|e| {
            tracing::error!(
                operation = intent.request.path(),
                transaction_id = %intent.transaction_id,
                error = %e,
                "Withdrawal finalization failed"
            );
            CheckoutError::from(e)
        })?;

        tracing::info!(
            operation = intent.request.path(),
            farm_id = intent.farm_id,
            transaction_id = %intent.transaction_id,
            session_id = %session_id,
            "Withdrawal verified"
        );
        Ok(Outcome::verified(session_id))
    }

    /// Validate against the holder's state, withdraw, and record the result.
    ///
    /// An invalid request fails before any network call and leaves the
    /// state untouched. Held until the result is recorded, so concurrent
    /// calls cannot both spend the same balance.
    pub async fn withdraw_checked<G: GameService>(
        &self,
        game: &G,
        withdrawal: Withdrawal,
        token: AuthToken,
    ) -> CheckoutResult<Outcome> {
        let _serial = self.checked.lock().await;
        let state = game.state();
        state
            .check_withdrawal(&withdrawal)
            .map_err(CheckoutError::Validation)?;

        let intent = PurchaseIntent::new(state.farm_id, withdrawal, token);
        let outcome = self.withdraw(&intent).await?;

        if let Err(e) = game
            .send(GameEvent::Withdrawn {
                session_id: outcome.session_id.clone(),
                withdrawal: intent.request,
            })
            .await
        {
            // The chain already holds the withdrawal; only the local view lags.
            tracing::warn!(error = %e, "Failed to record withdrawal in game state");
        }
        Ok(outcome)
    }
}
