//! Checkout followed by webhook confirmation, end to end.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal_macros::dec;
use swapped_core::{
    CheckoutFailure, GatewayProfile, GatewaySettings, MemoryCart, MemoryOrderStore, Order,
    OrderPayload, OrderStatus, OrderStore, PaymentApi, RemoteOrderRef, StoreConfig, Viewer,
    classify_response,
    order::{META_PAYMENT_LINK, META_REMOTE_ORDER_ID},
};
use swapped_payments::{
    ALREADY_PAID_NOTICE, CheckoutOutcome, PaymentGateway, SwappedGateway, WebhookHandler,
};

struct CannedApi(&'static str);

#[async_trait]
impl PaymentApi for CannedApi {
    async fn create_remote_order(
        &self,
        payload: &OrderPayload,
    ) -> Result<RemoteOrderRef, CheckoutFailure> {
        assert_eq!(payload.purchase.price, "15.50");
        classify_response(200, self.0)
    }
}

const CONFIRMED: &str = r#"{"event_type":"ORDER_COMPLETED","order_status":"PAYMENT_CONFIRMED_ACCURATE","order_id":"SW1","external_order_id":42}"#;

fn pay_gateway(orders: Arc<MemoryOrderStore>) -> SwappedGateway {
    let mut settings = GatewaySettings::for_profile(&GatewayProfile::PAY);
    settings.enabled = true;
    settings.api_key = "key_123".into();

    SwappedGateway::new(
        GatewayProfile::PAY,
        settings,
        StoreConfig::new("Shop", "https://shop.example"),
        Arc::new(CannedApi(
            r#"{"data":{"order":{"id":"SW1","link":"https://pay.example/x"}}}"#,
        )),
        orders,
        Arc::new(MemoryCart::new()),
    )
}

#[tokio::test]
async fn test_order_is_paid_after_checkout_and_webhook() {
    let orders = Arc::new(MemoryOrderStore::new());
    orders.insert(Order::new(42, dec!(15.5), "USD")).unwrap();
    let gateway = pay_gateway(orders.clone());

    let outcome = gateway.process_payment(42, Viewer::Customer).await.unwrap();
    assert_eq!(outcome.redirect(), Some("https://pay.example/x"));

    let order = orders.get(42).unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.meta(META_REMOTE_ORDER_ID), Some("SW1"));
    assert_eq!(order.meta(META_PAYMENT_LINK), Some("https://pay.example/x"));

    let webhook = WebhookHandler::new(orders.clone());
    let body = CONFIRMED;

    let response = webhook.handle(body).await;
    assert_eq!(response.status, 200);
    assert_eq!(
        serde_json::to_value(&response.body).unwrap(),
        serde_json::json!({"ok": true, "order_id": 42, "status": "processing"})
    );

    let order = orders.get(42).unwrap().unwrap();
    assert!(order.is_paid());
    assert!(order.notes.last().unwrap().content.contains("SW1"));

    let again = webhook.handle(body).await;
    assert_eq!(again.body.already_paid, Some(true));
}

#[tokio::test]
async fn test_repeated_checkout_cannot_reopen_paid_order() {
    let orders = Arc::new(MemoryOrderStore::new());
    orders.insert(Order::new(42, dec!(15.5), "USD")).unwrap();
    let gateway = pay_gateway(orders.clone());
    let webhook = WebhookHandler::new(orders.clone());

    assert!(gateway.process_payment(42, Viewer::Customer).await.unwrap().is_success());
    assert_eq!(webhook.handle(CONFIRMED).await.body.status.as_deref(), Some("processing"));

    let retry = gateway.process_payment(42, Viewer::Customer).await.unwrap();
    let CheckoutOutcome::Failure { notice, .. } = retry else {
        panic!("paid order went back through checkout");
    };
    assert_eq!(notice.message, ALREADY_PAID_NOTICE);
    assert_eq!(orders.get(42).unwrap().unwrap().status, OrderStatus::Processing);

    let redelivery = webhook.handle(CONFIRMED).await;
    assert_eq!(redelivery.status, 200);
    assert_eq!(redelivery.body.already_paid, Some(true));

    let order = orders.get(42).unwrap().unwrap();
    let confirmations = order
        .notes
        .iter()
        .filter(|note| note.content.starts_with("Swapped payment confirmed."))
        .count();
    assert_eq!(confirmations, 1);
}
