//! Gateway registry
//!
//! Payment methods are registered explicitly at startup and looked up by id.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use swapped_core::{GatewaySettings, Result, Viewer};

use crate::blocks::PaymentMethodDescriptor;
use crate::checkout::CheckoutOutcome;

/// Payment method offered at checkout - implement to add a gateway
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Unique gateway id
    fn id(&self) -> &str;

    fn settings(&self) -> &GatewaySettings;

    /// Whether the method may be used for payment right now
    fn is_available(&self) -> bool {
        self.settings().is_available()
    }

    /// Descriptor for the checkout block renderer
    fn descriptor(&self) -> PaymentMethodDescriptor;

    /// Start payment for an order
    async fn process_payment(&self, order_id: u64, viewer: Viewer) -> Result<CheckoutOutcome>;
}

/// Registry for available gateways
#[derive(Default)]
pub struct GatewayRegistry {
    gateways: BTreeMap<String, Arc<dyn PaymentGateway>>,
}

impl GatewayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new gateway
    pub fn register<G: PaymentGateway + 'static>(&mut self, gateway: G) {
        self.register_arc(Arc::new(gateway));
    }

    /// Register a shared gateway
    pub fn register_arc(&mut self, gateway: Arc<dyn PaymentGateway>) {
        self.gateways.insert(gateway.id().to_string(), gateway);
    }

    /// Get a gateway by id
    pub fn get(&self, id: &str) -> Option<Arc<dyn PaymentGateway>> {
        self.gateways.get(id).cloned()
    }

    /// Gateways usable for payment
    pub fn available(&self) -> Vec<Arc<dyn PaymentGateway>> {
        self.gateways
            .values()
            .filter(|g| g.is_available())
            .cloned()
            .collect()
    }

    /// Descriptors for every registered gateway
    pub fn descriptors(&self) -> Vec<PaymentMethodDescriptor> {
        self.gateways.values().map(|g| g.descriptor()).collect()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.gateways.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.gateways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gateways.is_empty()
    }
}
