//! Swapped Webhook Handling
//!
//! Marks local orders paid when Swapped reports a confirmed payment.
//!
//! Deliveries are unauthenticated: Swapped does not sign them, so anyone who
//! can reach the endpoint and knows an order id can complete that order.
//! Events that are malformed or not a payment confirmation are acknowledged
//! with 200 so the sender stops retrying them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

use swapped_core::{
    GatewayError, OrderStatus, OrderStore, Result,
    sanitize::{absint, value_as_text},
};

/// Event type announcing a finished remote order
pub const EVENT_ORDER_COMPLETED: &str = "ORDER_COMPLETED";

/// Order status meaning the full amount arrived
pub const STATUS_PAYMENT_CONFIRMED: &str = "PAYMENT_CONFIRMED_ACCURATE";

/// A payment confirmation that passed the acceptance gate
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaymentConfirmation {
    /// Swapped order id, recorded as the transaction id
    pub remote_order_id: String,
    /// Local order id
    pub external_order_id: u64,
    pub purchase_amount: String,
    pub purchase_currency: String,
    pub crypto_amount: String,
    pub crypto_symbol: String,
    pub merchant_id: String,
    pub external_customer_id: String,
}

/// Parsed webhook event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebhookEvent {
    /// Completed order with confirmed payment - mark paid
    PaymentConfirmed(PaymentConfirmation),

    /// Anything else, acknowledged without side effects
    Ignored {
        event_type: String,
        order_status: String,
    },
}

impl WebhookEvent {
    /// Sanitize fields and apply the acceptance gate.
    pub fn from_value(data: &Value) -> Self {
        let text = |key: &str| value_as_text(data.get(key));

        let event_type = text("event_type");
        let order_status = text("order_status");
        let remote_order_id = text("order_id");
        let external_order_id = absint(data.get("external_order_id"));

        let accepted = event_type == EVENT_ORDER_COMPLETED
            && order_status == STATUS_PAYMENT_CONFIRMED
            && external_order_id != 0
            && !remote_order_id.is_empty();

        if !accepted {
            return Self::Ignored {
                event_type,
                order_status,
            };
        }

        Self::PaymentConfirmed(PaymentConfirmation {
            remote_order_id,
            external_order_id,
            purchase_amount: text("order_purchase_amount"),
            purchase_currency: text("order_purchase_currency"),
            crypto_amount: text("order_crypto_amount"),
            crypto_symbol: text("order_crypto"),
            merchant_id: text("merchant_id"),
            external_customer_id: text("external_customer_id"),
        })
    }
}

/// Human-readable note recorded on the paid order.
pub fn payment_note(confirmation: &PaymentConfirmation) -> String {
    let c = confirmation;
    let mut parts = vec![format!(
        "Swapped payment confirmed. Swapped Order: {}",
        c.remote_order_id
    )];

    if !c.purchase_amount.is_empty() && !c.purchase_currency.is_empty() {
        parts.push(format!("Fiat: {} {}", c.purchase_amount, c.purchase_currency));
    }
    if !c.crypto_amount.is_empty() && !c.crypto_symbol.is_empty() {
        parts.push(format!("Crypto: {} {}", c.crypto_amount, c.crypto_symbol));
    }
    if !c.merchant_id.is_empty() {
        parts.push(format!("Merchant ID: {}", c.merchant_id));
    }
    if !c.external_customer_id.is_empty() {
        parts.push(format!("External customer ID: {}", c.external_customer_id));
    }

    parts.join(" | ")
}

/// JSON body answered to the webhook sender
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookReply {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_paid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// HTTP status plus reply body
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: u16,
    pub body: WebhookReply,
}

impl WebhookResponse {
    fn rejected(status: u16, reason: &str) -> Self {
        Self {
            status,
            body: WebhookReply {
                ok: false,
                reason: Some(reason.into()),
                ..Default::default()
            },
        }
    }

    pub fn invalid_json() -> Self {
        Self::rejected(400, "invalid_json")
    }

    pub fn order_not_found() -> Self {
        Self::rejected(404, "order_not_found")
    }

    pub fn storage_error() -> Self {
        Self::rejected(500, "storage_error")
    }

    pub fn ignored() -> Self {
        Self {
            status: 200,
            body: WebhookReply {
                ok: true,
                ignored: Some(true),
                ..Default::default()
            },
        }
    }

    pub fn already_paid(order_id: u64) -> Self {
        Self {
            status: 200,
            body: WebhookReply {
                ok: true,
                already_paid: Some(true),
                order_id: Some(order_id),
                ..Default::default()
            },
        }
    }

    pub fn paid(order_id: u64, status: OrderStatus) -> Self {
        Self {
            status: 200,
            body: WebhookReply {
                ok: true,
                order_id: Some(order_id),
                status: Some(status.as_str().to_string()),
                ..Default::default()
            },
        }
    }
}

/// Webhook handler
pub struct WebhookHandler {
    orders: Arc<dyn OrderStore>,
    /// Held from the paid check until the order is saved
    completion: Mutex<()>,
}

impl WebhookHandler {
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        Self {
            orders,
            completion: Mutex::new(()),
        }
    }

    /// Parse a raw delivery. Bodies that are not a JSON object or array
    /// (including non-UTF-8 bytes) are rejected; arrays carry no fields and
    /// end up ignored.
    pub fn parse_event(&self, raw: &[u8]) -> Result<WebhookEvent> {
        let data: Value = serde_json::from_slice(raw)
            .map_err(|e| GatewayError::InvalidWebhookPayload(e.to_string()))?;

        if !(data.is_object() || data.is_array()) {
            return Err(GatewayError::InvalidWebhookPayload(
                "expected a JSON object".into(),
            ));
        }

        Ok(WebhookEvent::from_value(&data))
    }

    /// Process one delivery
    pub async fn handle(&self, raw: impl AsRef<[u8]>) -> WebhookResponse {
        let event = match self.parse_event(raw.as_ref()) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected Swapped webhook");
                return WebhookResponse::invalid_json();
            }
        };

        let confirmation = match event {
            WebhookEvent::PaymentConfirmed(confirmation) => confirmation,
            WebhookEvent::Ignored {
                event_type,
                order_status,
            } => {
                tracing::debug!(
                    event_type = %event_type,
                    order_status = %order_status,
                    "Ignoring Swapped webhook"
                );
                return WebhookResponse::ignored();
            }
        };

        let _guard = self.completion.lock().await;

        match self.complete(&confirmation) {
            Ok(response) => response,
            Err(GatewayError::OrderNotFound(order_id)) => {
                tracing::warn!(order_id, "Swapped webhook for unknown order");
                WebhookResponse::order_not_found()
            }
            Err(e) => {
                tracing::error!(
                    order_id = confirmation.external_order_id,
                    error = %e,
                    "Webhook processing error"
                );
                WebhookResponse::storage_error()
            }
        }
    }

    fn complete(&self, confirmation: &PaymentConfirmation) -> Result<WebhookResponse> {
        let order_id = confirmation.external_order_id;
        let mut order = self
            .orders
            .get(order_id)?
            .ok_or(GatewayError::OrderNotFound(order_id))?;

        if order.is_paid() {
            tracing::info!(order_id, "Order already paid, ignoring redelivery");
            return Ok(WebhookResponse::already_paid(order.id));
        }

        let status = order.payment_complete(&confirmation.remote_order_id);
        order.add_note(payment_note(confirmation));
        self.orders.save(&order)?;

        tracing::info!(
            order_id,
            remote_order_id = %confirmation.remote_order_id,
            status = %status,
            "Order paid via Swapped"
        );

        Ok(WebhookResponse::paid(order.id, status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use swapped_core::{MemoryOrderStore, Order};

    const CONFIRMED: &str = r#"{"event_type":"ORDER_COMPLETED","order_status":"PAYMENT_CONFIRMED_ACCURATE","order_id":"SW1","external_order_id":42}"#;

    fn handler_with_order() -> (WebhookHandler, Arc<MemoryOrderStore>) {
        let store = Arc::new(MemoryOrderStore::new());
        store.insert(Order::new(42, dec!(15.5), "USD")).unwrap();
        (WebhookHandler::new(store.clone()), store)
    }

    fn reply_json(response: &WebhookResponse) -> Value {
        serde_json::to_value(&response.body).unwrap()
    }

    #[tokio::test]
    async fn test_confirmed_payment_marks_order_paid() {
        let (handler, store) = handler_with_order();

        let response = handler.handle(CONFIRMED).await;
        assert_eq!(response.status, 200);
        assert_eq!(
            reply_json(&response),
            json!({"ok": true, "order_id": 42, "status": "processing"})
        );

        let order = store.get(42).unwrap().unwrap();
        assert!(order.is_paid());
        assert_eq!(order.transaction_id.as_deref(), Some("SW1"));
        assert_eq!(order.notes.len(), 1);
        assert!(order.notes[0].content.contains("SW1"));
    }

    #[tokio::test]
    async fn test_redelivery_is_idempotent() {
        let (handler, store) = handler_with_order();

        handler.handle(CONFIRMED).await;
        let paid_at = store.get(42).unwrap().unwrap().paid_at;

        let response = handler.handle(CONFIRMED).await;
        assert_eq!(response.status, 200);
        assert_eq!(
            reply_json(&response),
            json!({"ok": true, "already_paid": true, "order_id": 42})
        );

        let order = store.get(42).unwrap().unwrap();
        assert_eq!(order.notes.len(), 1);
        assert_eq!(order.paid_at, paid_at);
    }

    #[tokio::test]
    async fn test_concurrent_deliveries_apply_once() {
        let (handler, store) = handler_with_order();
        let handler = Arc::new(handler);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let handler = handler.clone();
                tokio::spawn(async move { handler.handle(CONFIRMED).await })
            })
            .collect();

        let mut already_paid = 0;
        for task in tasks {
            if task.await.unwrap().body.already_paid == Some(true) {
                already_paid += 1;
            }
        }

        assert_eq!(already_paid, 7);
        assert_eq!(store.get(42).unwrap().unwrap().notes.len(), 1);
    }

    #[tokio::test]
    async fn test_other_events_are_ignored() {
        let (handler, store) = handler_with_order();
        let bodies = [
            json!({"event_type": "ORDER_PENDING", "order_status": "PAYMENT_CONFIRMED_ACCURATE", "order_id": "SW1", "external_order_id": 42}),
            json!({"event_type": "ORDER_COMPLETED", "order_status": "PAYMENT_CONFIRMED_UNDERPAID", "order_id": "SW1", "external_order_id": 42}),
            json!({"event_type": "ORDER_COMPLETED", "order_status": "PAYMENT_CONFIRMED_ACCURATE", "order_id": "", "external_order_id": 42}),
            json!([1, 2, 3]),
        ];

        for body in bodies {
            let response = handler.handle(&body.to_string()).await;
            assert_eq!(response.status, 200, "body: {body}");
            assert_eq!(reply_json(&response), json!({"ok": true, "ignored": true}));
        }

        let order = store.get(42).unwrap().unwrap();
        assert!(!order.is_paid());
        assert!(order.notes.is_empty());
    }

    /// Counts lookups so we can prove ignored events never touch storage
    struct CountingStore {
        inner: MemoryOrderStore,
        lookups: std::sync::atomic::AtomicUsize,
    }

    impl OrderStore for CountingStore {
        fn get(&self, id: u64) -> Result<Option<Order>> {
            self.lookups.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.get(id)
        }

        fn save(&self, order: &Order) -> Result<()> {
            self.inner.save(order)
        }
    }

    #[tokio::test]
    async fn test_zero_or_missing_external_id_is_never_looked_up() {
        let store = Arc::new(CountingStore {
            inner: MemoryOrderStore::new(),
            lookups: std::sync::atomic::AtomicUsize::new(0),
        });
        let handler = WebhookHandler::new(store.clone());

        for body in [
            json!({"event_type": "ORDER_COMPLETED", "order_status": "PAYMENT_CONFIRMED_ACCURATE", "order_id": "SW1", "external_order_id": 0}),
            json!({"event_type": "ORDER_COMPLETED", "order_status": "PAYMENT_CONFIRMED_ACCURATE", "order_id": "SW1"}),
            json!({"event_type": "ORDER_COMPLETED", "order_status": "PAYMENT_CONFIRMED_ACCURATE", "order_id": "SW1", "external_order_id": "n/a"}),
        ] {
            let response = handler.handle(&body.to_string()).await;
            assert_eq!(response.body.ignored, Some(true));
        }

        assert_eq!(store.lookups.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let (handler, _) = handler_with_order();
        for body in ["{not json", "", "\"text\"", "12"] {
            let response = handler.handle(body).await;
            assert_eq!(response.status, 400, "body: {body:?}");
            assert_eq!(reply_json(&response), json!({"ok": false, "reason": "invalid_json"}));
        }
    }

    #[tokio::test]
    async fn test_non_utf8_body_is_invalid_json() {
        let (handler, _) = handler_with_order();
        let response = handler.handle(b"{\"event_type\":\"\xff\xfe\"}".as_slice()).await;
        assert_eq!(response.status, 400);
        assert_eq!(reply_json(&response), json!({"ok": false, "reason": "invalid_json"}));
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let (handler, _) = handler_with_order();
        let body = CONFIRMED.replace("42", "77");

        let response = handler.handle(&body).await;
        assert_eq!(response.status, 404);
        assert_eq!(reply_json(&response), json!({"ok": false, "reason": "order_not_found"}));
    }

    #[tokio::test]
    async fn test_string_external_id_is_coerced() {
        let (handler, store) = handler_with_order();
        let body = json!({
            "event_type": "ORDER_COMPLETED",
            "order_status": "PAYMENT_CONFIRMED_ACCURATE",
            "order_id": " SW1 ",
            "external_order_id": "42",
        });

        let response = handler.handle(&body.to_string()).await;
        assert_eq!(response.body.order_id, Some(42));
        assert_eq!(store.get(42).unwrap().unwrap().transaction_id.as_deref(), Some("SW1"));
    }

    #[test]
    fn test_payment_note_includes_complete_clauses_only() {
        let event = WebhookEvent::from_value(&json!({
            "event_type": "ORDER_COMPLETED",
            "order_status": "PAYMENT_CONFIRMED_ACCURATE",
            "order_id": "SW1",
            "external_order_id": 42,
            "order_purchase_amount": 8,
            "order_purchase_currency": "DKK",
            "order_crypto_amount": 0.01,
            "merchant_id": "m-1",
            "external_customer_id": "c-9",
        }));
        let WebhookEvent::PaymentConfirmed(confirmation) = event else {
            panic!("expected confirmation");
        };

        assert_eq!(
            payment_note(&confirmation),
            "Swapped payment confirmed. Swapped Order: SW1 | Fiat: 8 DKK | Merchant ID: m-1 | External customer ID: c-9"
        );

        let minimal = PaymentConfirmation {
            remote_order_id: "SW2".into(),
            external_order_id: 1,
            crypto_amount: "0.5".into(),
            crypto_symbol: "LTC".into(),
            ..Default::default()
        };
        assert_eq!(
            payment_note(&minimal),
            "Swapped payment confirmed. Swapped Order: SW2 | Crypto: 0.5 LTC"
        );
    }

    #[tokio::test]
    async fn test_order_without_processing_completes() {
        let store = Arc::new(MemoryOrderStore::new());
        let mut order = Order::new(42, dec!(3), "USD");
        order.needs_processing = false;
        store.insert(order).unwrap();

        let handler = WebhookHandler::new(store.clone());
        let response = handler.handle(CONFIRMED).await;
        assert_eq!(response.body.status.as_deref(), Some("completed"));
    }
}
