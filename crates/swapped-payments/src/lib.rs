//! # swapped-payments
//!
//! Checkout and webhook processing for Swapped crypto payments.
//!
//! ## Hosted checkout
//!
//! **Flow:** Store checkout → Swapped hosted payment page → order-received page
//!
//! ```text
//! ┌─────────────┐     ┌─────────────────┐     ┌─────────────┐
//! │  Checkout   │────▶│ Swapped Hosted  │────▶│   Order     │
//! │  (pending)  │     │  Payment Page   │     │  received   │
//! └─────────────┘     └─────────────────┘     └─────────────┘
//!                              │
//!                              ▼ POST /swapped/v1/webhook
//!                     ┌─────────────────┐
//!                     │  Order → paid   │
//!                     └─────────────────┘
//! ```
//!
//! The order stays pending until the webhook confirms payment. Redelivered
//! confirmations are acknowledged as `already_paid` and change nothing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use swapped_payments::{GatewayRegistry, SwappedGateway, WebhookHandler};
//!
//! let mut gateways = GatewayRegistry::new();
//! gateways.register(SwappedGateway::new(profile, settings, store, api, orders.clone(), cart));
//!
//! let outcome = gateways.get("swapped-pay").unwrap().process_payment(42, Viewer::Customer).await?;
//! // Redirect buyer to: outcome.redirect()
//!
//! let webhook = WebhookHandler::new(orders);
//! let response = webhook.handle(&raw_body).await;
//! ```

mod blocks;
mod checkout;
mod gateway;
mod webhook;

#[cfg(feature = "axum-handlers")]
mod handlers;

pub use blocks::{MethodIcons, MethodSupports, PaymentMethodDescriptor};
pub use checkout::{ALREADY_PAID_NOTICE, AWAITING_PAYMENT_NOTE, CheckoutOutcome, SwappedGateway};
pub use gateway::{GatewayRegistry, PaymentGateway};
pub use webhook::{
    PaymentConfirmation, WebhookEvent, WebhookHandler, WebhookReply, WebhookResponse,
    payment_note,
};
pub use swapped_core::{GatewayError, Result};
