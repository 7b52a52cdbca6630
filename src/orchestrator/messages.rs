//! Messages from the embedded payment surface.
//!
//! The host forwards every cross-context message it receives into a channel.
//! One consumer task drains it; origin is checked before the payload is even
//! parsed.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::checkout::finalize::Finalizer;
use crate::game::GameService;
use crate::orchestrator::block_bucks::{BlockBucksCheckout, MessageEffect};

/// Event name the checkout surface uses for status updates.
pub const STATUS_EVENT: &str = "onPokoDirectCheckoutStatusChange";

/// A raw message as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Origin reported by the host for the sender.
    pub origin: String,
    /// JSON text.
    pub data: String,
}

impl InboundMessage {
    pub fn new(origin: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            data: data.into(),
        }
    }
}

/// Payment status reported by the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    Succeeded,
    /// Funds received, settlement pending; dismissal must be blocked.
    PaymentReceived,
    Other(String),
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "eventName")]
    event_name: String,
    #[serde(default)]
    data: Option<StatusData>,
}

#[derive(Deserialize)]
struct StatusData {
    #[serde(default)]
    status: Option<String>,
}

/// Decode a status message, or `None` if it must be ignored.
///
/// Messages from any origin other than `expected_origin` are dropped
/// without being parsed.
pub fn decode_status(expected_origin: &str, message: &InboundMessage) -> Option<PaymentStatus> {
    if message.origin != expected_origin {
        tracing::debug!(origin = %message.origin, "Ignoring message from foreign origin");
        return None;
    }

    let envelope: Envelope = match serde_json::from_str(&message.data) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring undecodable checkout message");
            return None;
        }
    };
    if envelope.event_name != STATUS_EVENT {
        return None;
    }

    let status = envelope.data.and_then(|d| d.status)?;
    Some(match status.as_str() {
        "succeeded" => PaymentStatus::Succeeded,
        "payment_received" => PaymentStatus::PaymentReceived,
        _ => PaymentStatus::Other(status),
    })
}

/// Channel the host pushes surface messages into.
pub fn message_channel(buffer: usize) -> (mpsc::Sender<InboundMessage>, mpsc::Receiver<InboundMessage>) {
    mpsc::channel(buffer)
}

/// Drain `rx` into `checkout` until the payment succeeds or the sender goes away.
///
/// Owning the receiver guarantees a single handler per checkout.
pub fn spawn_message_consumer<G, F>(
    checkout: Arc<BlockBucksCheckout<G, F>>,
    mut rx: mpsc::Receiver<InboundMessage>,
) -> JoinHandle<()>
where
    G: GameService + 'static,
    F: Finalizer + 'static,
{
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if checkout.handle_message(&message).await == MessageEffect::Succeeded {
                break;
            }
        }
        tracing::debug!("Checkout message consumer finished");
    })
}
