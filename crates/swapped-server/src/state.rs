//! Application State

use std::sync::Arc;

use swapped_core::{MemoryCart, MemoryOrderStore, StoreConfig};
use swapped_payments::{GatewayRegistry, WebhookHandler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Registered payment methods
    pub gateways: Arc<GatewayRegistry>,

    /// Payment confirmation webhook
    pub webhook: Arc<WebhookHandler>,

    /// Order storage standing in for the store backend
    pub orders: Arc<MemoryOrderStore>,

    pub cart: Arc<MemoryCart>,

    pub store: Arc<StoreConfig>,
}
