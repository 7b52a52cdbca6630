//! Block Bucks checkout driven end to end against a mock game API.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;

use farm_checkout::blockchain::Wallet;
use farm_checkout::checkout::{
    AuthToken, CheckoutClient, CheckoutError, Finalizer, Outcome, SessionCall, SessionId,
};
use farm_checkout::config::CheckoutConfig;
use farm_checkout::game::{GameService, GameState, LocalGame};
use farm_checkout::orchestrator::{
    message_channel, price_for, spawn_message_consumer, BlockBucksCheckout, CheckoutContext,
    CheckoutStage, InboundMessage, MessageEffect,
};

mod common;

use common::{descriptor, GatedFinalizer, MockApi, MockFinalizer, FARM_ID, TOKEN};

const RECEIVER: &str = "0xAbC0000000000000000000000000000000000001";

fn checkout<F: Finalizer>(
    api: &MockApi,
    finalizer: F,
    game: Arc<LocalGame>,
) -> BlockBucksCheckout<Arc<LocalGame>, F> {
    BlockBucksCheckout::new(
        CheckoutClient::new(api.url()),
        finalizer,
        game,
        CheckoutContext {
            farm_id: FARM_ID,
            token: AuthToken::new(TOKEN),
            receiver_id: RECEIVER.to_string(),
        },
        &CheckoutConfig::default(),
    )
}

fn farm() -> Arc<LocalGame> {
    Arc::new(LocalGame::new(GameState {
        farm_id: FARM_ID,
        pending_actions: 3,
        ..Default::default()
    }))
}

fn status(origin: &str, status: &str) -> InboundMessage {
    InboundMessage::new(
        origin,
        json!({
            "eventName": "onPokoDirectCheckoutStatusChange",
            "data": { "status": status }
        })
        .to_string(),
    )
}

fn card_details() -> serde_json::Value {
    json!({ "type": "USDC", "farmId": FARM_ID, "amount": 5, "sessionId": "0x11" })
}

#[tokio::test]
async fn test_matic_purchase_completes() {
    let api = MockApi::start(200, descriptor(json!({ "amount": "0x5", "fee": "0x1" }))).await;
    let finalizer = MockFinalizer::returning("0xabc");
    let game = farm();
    let checkout = checkout(&api, finalizer.clone(), game.clone());

    let price = checkout.select_price(5).unwrap();
    assert_eq!(price.usd(), "0.99");

    let outcome = checkout.pay_with_matic().await.unwrap();

    assert_eq!(outcome, Outcome::verified(SessionId::new("0xabc")));
    assert_eq!(
        checkout.stage(),
        CheckoutStage::Completed {
            price,
            outcome: Some(outcome.clone()),
        }
    );
    assert!(!checkout.is_loading());

    let request = &api.requests()[0];
    assert_eq!(request.path, format!("/buy-blockbucks/{}", FARM_ID));
    assert_eq!(request.body, json!({ "currency": "MATIC", "amount": 5 }));
    assert_eq!(finalizer.calls(), 1);
    assert!(matches!(finalizer.received()[0], SessionCall::BuyBlockBucks(_)));

    let state = game.state();
    assert_eq!(state.block_bucks, 5);
    // Saved before the server was contacted.
    assert_eq!(state.pending_actions, 0);
}

#[tokio::test]
async fn test_rate_limited_purchase_returns_to_selection() {
    let api = MockApi::start(429, json!({})).await;
    let finalizer = MockFinalizer::returning("0xabc");
    let game = farm();
    let checkout = checkout(&api, finalizer.clone(), game.clone());
    checkout.select_price(10).unwrap();

    let err = checkout.pay_with_matic().await.unwrap_err();

    assert!(matches!(err, CheckoutError::RateLimited));
    assert_eq!(
        checkout.stage(),
        CheckoutStage::SelectingAmount { price: price_for(10) }
    );
    assert_eq!(finalizer.calls(), 0);
    assert_eq!(game.state().block_bucks, 0);
    assert!(!checkout.is_loading());
}

#[tokio::test]
async fn test_wallet_rejection_returns_to_selection() {
    let api = MockApi::start(200, descriptor(json!({ "amount": "0x1", "fee": "0x1" }))).await;
    let game = farm();
    let checkout = checkout(&api, MockFinalizer::rejecting(), game.clone());
    checkout.select_price(1).unwrap();

    let err = checkout.pay_with_matic().await.unwrap_err();

    assert!(matches!(err, CheckoutError::Wallet(_)));
    assert_eq!(
        checkout.stage(),
        CheckoutStage::SelectingAmount { price: price_for(1) }
    );
    assert_eq!(game.state().block_bucks, 0);
}

#[tokio::test]
async fn test_card_purchase_follows_surface_messages() {
    let api = MockApi::start(200, card_details()).await;
    let finalizer = MockFinalizer::returning("0xabc");
    let game = farm();
    let checkout = checkout(&api, finalizer.clone(), game.clone());
    checkout.select_price(5).unwrap();

    let surface = checkout.pay_with_card().await.unwrap();
    let origin = surface.origin();
    assert!(matches!(
        checkout.stage(),
        CheckoutStage::AwaitingExternalPayment { .. }
    ));
    assert_eq!(api.requests()[0].body, json!({ "currency": "USDC", "amount": 5 }));

    let query: HashMap<_, _> = surface.url().query_pairs().into_owned().collect();
    assert_eq!(query["itemName"], "5 Block Bucks");
    assert_eq!(query["receiverId"], RECEIVER.to_lowercase());
    assert_eq!(query["listingId"], FARM_ID.to_string());
    let extra: serde_json::Value = serde_json::from_str(&query["extra"]).unwrap();
    assert_eq!(extra.get("type"), None);
    assert_eq!(extra["sessionId"], "0x11");

    // Forged message from another origin changes nothing.
    let effect = checkout
        .handle_message(&status("https://evil.example", "succeeded"))
        .await;
    assert_eq!(effect, MessageEffect::Ignored);
    assert!(checkout.closeable());
    assert!(matches!(
        checkout.stage(),
        CheckoutStage::AwaitingExternalPayment { .. }
    ));

    let effect = checkout.handle_message(&status(&origin, "payment_received")).await;
    assert_eq!(effect, MessageEffect::Processing);
    assert!(!checkout.closeable());
    assert!(!checkout.close());

    let effect = checkout.handle_message(&status(&origin, "succeeded")).await;
    assert_eq!(effect, MessageEffect::Succeeded);
    assert!(checkout.closeable());
    assert_eq!(
        checkout.stage(),
        CheckoutStage::Completed {
            price: price_for(5).unwrap(),
            outcome: None,
        }
    );
    assert_eq!(game.state().block_bucks, 5);
    assert_eq!(finalizer.calls(), 0);
}

#[tokio::test]
async fn test_card_purchase_credits_wallet_account() {
    let api = MockApi::start(200, card_details()).await;
    let wallet = Wallet::from_private_key(
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        137,
    )
    .unwrap();
    let checkout = BlockBucksCheckout::new(
        CheckoutClient::new(api.url()),
        MockFinalizer::returning("0xabc"),
        farm(),
        CheckoutContext::for_wallet(FARM_ID, AuthToken::new(TOKEN), &wallet),
        &CheckoutConfig::default(),
    );
    checkout.select_price(1).unwrap();

    let surface = checkout.pay_with_card().await.unwrap();

    let query: HashMap<_, _> = surface.url().query_pairs().into_owned().collect();
    assert_eq!(query["receiverId"], wallet.receiver_id());
    assert_eq!(query["itemName"], "1 Block Buck");
}

#[tokio::test]
async fn test_second_attempt_while_loading_is_busy() {
    let api = MockApi::start(200, descriptor(json!({ "amount": "0x5", "fee": "0x1" }))).await;
    let finalizer = GatedFinalizer::default();
    let checkout = Arc::new(checkout(&api, finalizer.clone(), farm()));
    checkout.select_price(5).unwrap();

    let first = {
        let checkout = checkout.clone();
        tokio::spawn(async move { checkout.pay_with_matic().await })
    };
    finalizer.entered.notified().await;

    assert!(checkout.is_loading());
    assert!(matches!(
        checkout.pay_with_matic().await,
        Err(CheckoutError::Busy)
    ));
    assert!(matches!(
        checkout.pay_with_card().await,
        Err(CheckoutError::Busy)
    ));
    assert!(checkout.select_price(10).is_err());

    finalizer.release.notify_one();
    let outcome = first.await.unwrap().unwrap();
    assert_eq!(outcome.session_id, SessionId::new("0xgated"));
    assert_eq!(api.hits(), 1);
    assert!(!checkout.is_loading());
}

#[tokio::test]
async fn test_consumer_task_completes_card_purchase() {
    let api = MockApi::start(200, card_details()).await;
    let game = farm();
    let checkout = Arc::new(checkout(&api, MockFinalizer::returning("0xabc"), game.clone()));
    checkout.select_price(20).unwrap();
    let origin = checkout.pay_with_card().await.unwrap().origin();

    let (tx, rx) = message_channel(8);
    let consumer = spawn_message_consumer(checkout.clone(), rx);

    tx.send(status("https://evil.example", "succeeded")).await.unwrap();
    tx.send(status(&origin, "payment_received")).await.unwrap();
    tx.send(status(&origin, "succeeded")).await.unwrap();
    consumer.await.unwrap();

    assert!(matches!(checkout.stage(), CheckoutStage::Completed { .. }));
    assert!(checkout.closeable());
    assert_eq!(game.state().block_bucks, 20);
}
