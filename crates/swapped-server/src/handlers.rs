//! HTTP Handlers

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use swapped_core::{BillingAddress, CartLine, Order, OrderStore, Viewer};
use swapped_payments::{CheckoutOutcome, GatewayError, PaymentMethodDescriptor, WebhookResponse};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub gateways_available: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>, code: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

fn storage_error(e: &GatewayError) -> ApiError {
    tracing::error!("Storage error: {}", e);
    api_error(StatusCode::INTERNAL_SERVER_ERROR, e.user_message(), "STORAGE_ERROR")
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub order_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub total: Decimal,
    pub currency: String,
    #[serde(default)]
    pub customer_id: u64,
    #[serde(default)]
    pub billing: BillingAddress,
    #[serde(default = "default_needs_processing")]
    pub needs_processing: bool,
}

const fn default_needs_processing() -> bool {
    true
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        gateways_available: state
            .gateways
            .available()
            .iter()
            .map(|g| g.id().to_string())
            .collect(),
    })
}

/// Checkout block descriptors
pub async fn list_payment_methods(
    State(state): State<AppState>,
) -> Json<Vec<PaymentMethodDescriptor>> {
    Json(state.gateways.descriptors())
}

/// Swapped webhook receiver. The body is taken as raw bytes so that
/// undecodable payloads still get the JSON `invalid_json` reply.
pub async fn swapped_webhook(State(state): State<AppState>, body: Bytes) -> WebhookResponse {
    state.webhook.handle(&body).await
}

/// Store managers authenticate with the configured admin token
fn viewer_from_headers(state: &AppState, headers: &HeaderMap) -> Viewer {
    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match (state.store.admin_token.as_deref(), presented) {
        (Some(expected), Some(token)) if bool::from(expected.as_bytes().ct_eq(token.as_bytes())) => {
            Viewer::Admin
        }
        _ => Viewer::Customer,
    }
}

/// Start hosted checkout for an order
pub async fn create_checkout(
    State(state): State<AppState>,
    Path(gateway_id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<CheckoutRequest>,
) -> Result<CheckoutOutcome, ApiError> {
    let gateway = state.gateways.get(&gateway_id).ok_or_else(|| {
        api_error(
            StatusCode::NOT_FOUND,
            format!("Unknown payment method: {gateway_id}"),
            "UNKNOWN_GATEWAY",
        )
    })?;

    let viewer = viewer_from_headers(&state, &headers);

    gateway
        .process_payment(payload.order_id, viewer)
        .await
        .map_err(|e| match e {
            GatewayError::OrderNotFound(_) => {
                api_error(StatusCode::NOT_FOUND, e.user_message(), "ORDER_NOT_FOUND")
            }
            other => storage_error(&other),
        })
}

/// Create an order (store backend stand-in)
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    if payload.total.is_sign_negative() || payload.currency.trim().len() != 3 {
        return Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Order needs a non-negative total and a 3-letter currency",
            "INVALID_ORDER",
        ));
    }

    let mut order = Order::new(
        state.orders.next_id(),
        payload.total,
        payload.currency.trim().to_uppercase(),
    )
    .with_customer(payload.customer_id)
    .with_billing(payload.billing);
    order.needs_processing = payload.needs_processing;

    state.orders.insert(order.clone()).map_err(|e| storage_error(&e))?;
    tracing::info!(order_id = order.id, total = %order.total, "Created order");

    Ok((StatusCode::CREATED, Json(order)))
}

/// Fetch an order
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<u64>,
) -> Result<Json<Order>, ApiError> {
    state
        .orders
        .get(order_id)
        .map_err(|e| storage_error(&e))?
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Order not found", "ORDER_NOT_FOUND"))
}

/// Add a line to a customer's cart
pub async fn add_to_cart(
    State(state): State<AppState>,
    Path(customer_id): Path<u64>,
    Json(line): Json<CartLine>,
) -> Result<Json<Vec<CartLine>>, ApiError> {
    state
        .cart
        .add_item(customer_id, line)
        .and_then(|()| state.cart.items(customer_id))
        .map(Json)
        .map_err(|e| storage_error(&e))
}
