//! Headless checkout orchestration.
//!
//! # Data Flow
//! ```text
//! select_price ─▶ pay_with_matic ─▶ client + finalizer ─▶ Completed ─▶ BUY_BLOCK_BUCKS
//!              └▶ pay_with_card  ─▶ client ─▶ ExternalCheckout (embedded page)
//!                                               │
//!        host messages ─▶ mpsc ─▶ consumer task ┴▶ handle_message ─▶ UPDATE_BLOCK_BUCKS
//! ```

pub mod block_bucks;
pub mod external;
pub mod messages;

pub use block_bucks::{
    price_for, BlockBucksCheckout, CheckoutContext, CheckoutStage, MessageEffect, Price, PRICES,
};
pub use external::ExternalCheckout;
pub use messages::{message_channel, spawn_message_consumer, InboundMessage, PaymentStatus};
