//! Error Types

use thiserror::Error;

use crate::notice::{Notice, Viewer};
use crate::sanitize::escape_html;

/// Result type alias
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors raised by the host-facing side of the gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Order storage failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No local order with this id
    #[error("Order not found: {0}")]
    OrderNotFound(u64),

    /// Webhook body could not be used
    #[error("Invalid webhook payload: {0}")]
    InvalidWebhookPayload(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GatewayError {
    /// Get user-friendly message
    pub fn user_message(&self) -> &str {
        match self {
            Self::OrderNotFound(_) => "We could not find your order. Please try again.",
            Self::Config(_) => "Service configuration error.",
            _ => "An error occurred processing your payment.",
        }
    }
}

/// Why creating a remote order failed.
///
/// Every variant ends the current checkout attempt and leaves the local order
/// untouched, so the buyer can simply retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutFailure {
    /// No response was received (connect failure, timeout, TLS, ...)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The API answered with a bot-protection challenge
    #[error("Bot protection challenge (HTTP {status})")]
    BotChallenge { status: u16 },

    /// 2xx response without a usable payment link
    #[error("Response contained no payment link")]
    MissingLink,

    /// Any other status, or an unparseable body
    #[error("Unexpected response (HTTP {code}): {message}")]
    UnexpectedStatus { code: u16, message: String },
}

impl CheckoutFailure {
    /// Notice shown at checkout.
    ///
    /// Only the bot challenge depends on who is looking: store managers get the
    /// diagnosis, buyers get pointed at another payment method.
    pub fn notice(&self, viewer: Viewer, brand: &str) -> Notice {
        let message = match self {
            Self::NetworkError(_) => {
                "Network error connecting to Swapped. Please try again.".to_string()
            }
            Self::BotChallenge { .. } if viewer.is_admin() => {
                "Swapped API is behind a bot protection challenge (HTTP 403). Ask Swapped to \
                 whitelist your server IP or provide an API hostname without challenges."
                    .to_string()
            }
            Self::BotChallenge { .. } => {
                "Payment temporarily unavailable. Please try another method.".to_string()
            }
            Self::MissingLink => {
                format!("Could not start {brand} session. Please contact support.")
            }
            Self::UnexpectedStatus { message, .. } => {
                format!("Payment error: {}", escape_html(message))
            }
        };
        Notice::error(message)
    }
}
