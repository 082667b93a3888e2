//! Swapped API contract
//!
//! [`PaymentApi`] is the seam between checkout and the network. Response
//! classification lives here as a pure function so every provider quirk can be
//! tested without a socket.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CheckoutFailure;
use crate::payload::OrderPayload;
use crate::sanitize::sanitize_text;

/// Default API host
pub const DEFAULT_API_BASE: &str = "https://pay-api.swapped.com";

/// Create-order path
pub const ORDERS_PATH: &str = "/v1/orders";

/// Marker of a bot-protection interstitial in a response body
pub const BOT_CHALLENGE_MARKER: &str = "cdn-cgi/challenge-platform";

/// Where the payment link may appear, highest priority first
pub const LINK_PATHS: &[&[&str]] = &[
    &["data", "order", "link"],
    &["data", "link"],
    &["link"],
    &["url"],
    &["paymentUrl"],
];

/// Where the remote order id may appear, highest priority first
pub const ID_PATHS: &[&[&str]] = &[&["data", "order", "id"], &["data", "id"], &["id"]];

/// Remote order created by the provider
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteOrderRef {
    /// Swapped order id; empty when the response carried none
    pub remote_order_id: String,
    /// Hosted payment page the buyer is sent to
    pub link: String,
}

/// Payment provider client (Strategy pattern)
#[async_trait]
pub trait PaymentApi: Send + Sync {
    /// Create a remote order for `payload` and return where to send the buyer.
    async fn create_remote_order(
        &self,
        payload: &OrderPayload,
    ) -> Result<RemoteOrderRef, CheckoutFailure>;
}

/// Resolve the first non-empty value along `paths`.
pub fn probe<'a>(body: &'a Value, paths: &[&[&str]]) -> Option<&'a Value> {
    paths.iter().find_map(|path| {
        let value = path.iter().try_fold(body, |node, key| node.get(key))?;
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(value),
            Value::Number(_) => Some(value),
            _ => None,
        }
    })
}

fn probe_text(body: &Value, paths: &[&[&str]]) -> Option<String> {
    probe(body, paths).map(|value| match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    })
}

/// Only absolute http(s) URLs are usable redirect targets.
fn clean_link(raw: &str) -> Option<String> {
    let link = raw.trim();
    let lower = link.to_ascii_lowercase();
    let is_web = lower.starts_with("https://") || lower.starts_with("http://");
    (is_web && !link.chars().any(char::is_whitespace)).then(|| link.to_string())
}

/// Classify a create-order response.
pub fn classify_response(status: u16, body: &str) -> Result<RemoteOrderRef, CheckoutFailure> {
    if status == 403
        || body
            .to_ascii_lowercase()
            .contains(BOT_CHALLENGE_MARKER)
    {
        return Err(CheckoutFailure::BotChallenge { status });
    }

    let parsed = serde_json::from_str::<Value>(body)
        .ok()
        .filter(|v| v.is_object() || v.is_array());

    match parsed {
        Some(json) if (200..300).contains(&status) => {
            let link = probe_text(&json, LINK_PATHS)
                .as_deref()
                .and_then(clean_link)
                .ok_or(CheckoutFailure::MissingLink)?;
            let remote_order_id = probe_text(&json, ID_PATHS)
                .map(|id| sanitize_text(&id))
                .unwrap_or_default();

            Ok(RemoteOrderRef {
                remote_order_id,
                link,
            })
        }
        parsed => {
            let message = parsed
                .as_ref()
                .and_then(|json| json.get("message"))
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map_or_else(
                    || format!("Unexpected error creating payment. HTTP {status}"),
                    str::to_string,
                );
            Err(CheckoutFailure::UnexpectedStatus {
                code: status,
                message,
            })
        }
    }
}
