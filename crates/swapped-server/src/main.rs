//! Swapped gateway HTTP Server
//!
//! Axum-based server hosting the Swapped checkout and webhook endpoints on
//! top of an in-memory store backend.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swapped_client::{ClientConfig, SwappedClient};
use swapped_core::{
    GatewayProfile, GatewaySettings, MemoryCart, MemoryOrderStore, StoreConfig,
    settings::WEBHOOK_NAMESPACE,
};
use swapped_payments::{GatewayRegistry, SwappedGateway, WebhookHandler};

use crate::handlers::{
    add_to_cart, create_checkout, create_order, get_order, health_check, list_payment_methods,
    swapped_webhook,
};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = StoreConfig::from_env();
    let orders = Arc::new(MemoryOrderStore::new());
    let cart = Arc::new(MemoryCart::new());

    // Register payment methods
    let mut gateways = GatewayRegistry::new();
    for profile in GatewayProfile::ALL {
        let settings = GatewaySettings::from_env(&profile);

        if settings.enabled && settings.api_key.is_empty() {
            tracing::warn!(
                "⚠ {} is enabled but API key is missing - set {}_API_KEY",
                profile.brand,
                profile.env_prefix
            );
        } else if settings.is_available() {
            tracing::info!("✓ {} configured", profile.brand);
        }
        if settings.enabled {
            tracing::info!(
                "  Set your Webhook URL in the Swapped dashboard ({}) to: {}",
                profile.dashboard_url,
                store.webhook_url()
            );
        }

        let client = SwappedClient::from_config(
            ClientConfig::for_gateway(&profile, &settings, &store).with_env_base(),
        )?;

        gateways.register(SwappedGateway::new(
            profile,
            settings,
            store.clone(),
            Arc::new(client),
            orders.clone(),
            cart.clone(),
        ));
    }

    tracing::warn!("Swapped webhooks are not signed; restrict access to the webhook route upstream");

    // Build application state
    let state = AppState {
        gateways: Arc::new(gateways),
        webhook: Arc::new(WebhookHandler::new(orders.clone())),
        orders,
        cart,
        store: Arc::new(store),
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/payment-methods", get(list_payment_methods))

        // Checkout
        .route("/api/checkout/{gateway}", post(create_checkout))

        // Store backend
        .route("/api/orders", post(create_order))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/cart/{customer_id}", post(add_to_cart))

        // Payment provider callbacks
        .route(&format!("/{WEBHOOK_NAMESPACE}/webhook"), post(swapped_webhook))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 swapped-server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                  - Health check");
    tracing::info!("  GET  /api/payment-methods     - Checkout block descriptors");
    tracing::info!("  POST /api/checkout/{{gateway}}  - Start hosted checkout");
    tracing::info!("  POST /api/orders              - Create order");
    tracing::info!("  GET  /api/orders/{{id}}         - Get order");
    tracing::info!("  POST /api/cart/{{customer_id}}  - Add to cart");
    tracing::info!("  POST /{}/webhook      - Swapped webhook", WEBHOOK_NAMESPACE);
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
