//! Order Payload
//!
//! The body of `POST /v1/orders`, built from a local order.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::order::Order;
use crate::sanitize::decode_entities;
use crate::settings::StoreConfig;

/// What the buyer is paying for
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub name: String,
    pub description: String,
    pub image_url: String,
    /// Fixed-point string with two fraction digits
    pub price: String,
    pub currency: String,
}

/// Order correlation and buyer details
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadMetadata {
    /// Local order id, echoed back as `external_order_id` in webhooks
    pub external_id: String,
    pub user_id: String,
    pub user_country: String,
    pub user_name: String,
    pub user_email: String,
    pub redirect_url: String,
}

/// Request body for creating a remote order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPayload {
    pub purchase: Purchase,
    pub metadata: PayloadMetadata,
}

/// Format an amount with exactly two fraction digits, midpoint away from zero.
pub fn format_price(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// Build the create-order payload for `order`.
pub fn build_order_payload(order: &Order, store: &StoreConfig) -> OrderPayload {
    let image_url = store
        .icon_url
        .clone()
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| store.placeholder_image_url.clone());

    OrderPayload {
        purchase: Purchase {
            name: format!("Order #{}", order.id),
            description: decode_entities(&store.name),
            image_url,
            price: format_price(order.total),
            currency: order.currency.clone(),
        },
        metadata: PayloadMetadata {
            external_id: order.id.to_string(),
            user_id: order.customer_id.to_string(),
            user_country: order.billing.country.clone(),
            user_name: order.billing.full_name(),
            user_email: order.billing.email.clone(),
            redirect_url: store.order_received_url(order),
        },
    }
}
