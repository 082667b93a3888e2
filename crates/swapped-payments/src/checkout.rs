//! Hosted checkout
//!
//! Creates a remote Swapped order for a local order and hands back the hosted
//! payment page. Nothing on the order changes unless the provider returned a
//! usable link, and a paid order is never moved back to pending.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use swapped_core::{
    Cart, CheckoutFailure, GatewayError, GatewayProfile, GatewaySettings, Notice, OrderStatus,
    OrderStore, PaymentApi, Result, StoreConfig, Viewer, build_order_payload,
    order::{META_PAYMENT_LINK, META_REMOTE_ORDER_ID},
};

use crate::blocks::PaymentMethodDescriptor;
use crate::gateway::PaymentGateway;

/// Note recorded when the buyer is sent to the hosted page
pub const AWAITING_PAYMENT_NOTE: &str = "Awaiting crypto payment via Swapped.";

/// Notice shown when checkout is attempted on an order that is already paid
pub const ALREADY_PAID_NOTICE: &str = "This order has already been paid.";

/// Result of a checkout attempt
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum CheckoutOutcome {
    /// Send the buyer to `redirect`
    Success { redirect: String },

    /// Stay on checkout and show `notice`
    Failure {
        notice: Notice,
        #[serde(skip)]
        cause: Option<CheckoutFailure>,
    },
}

impl CheckoutOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn redirect(&self) -> Option<&str> {
        match self {
            Self::Success { redirect } => Some(redirect),
            Self::Failure { .. } => None,
        }
    }
}

fn already_paid() -> CheckoutOutcome {
    CheckoutOutcome::Failure {
        notice: Notice::error(ALREADY_PAID_NOTICE),
        cause: None,
    }
}

/// Swapped payment method (Commerce or Pay flavour)
pub struct SwappedGateway {
    profile: GatewayProfile,
    settings: GatewaySettings,
    store: StoreConfig,
    api: Arc<dyn PaymentApi>,
    orders: Arc<dyn OrderStore>,
    cart: Arc<dyn Cart>,
}

impl SwappedGateway {
    pub fn new(
        profile: GatewayProfile,
        settings: GatewaySettings,
        store: StoreConfig,
        api: Arc<dyn PaymentApi>,
        orders: Arc<dyn OrderStore>,
        cart: Arc<dyn Cart>,
    ) -> Self {
        Self {
            profile,
            settings,
            store,
            api,
            orders,
            cart,
        }
    }

    pub fn profile(&self) -> &GatewayProfile {
        &self.profile
    }

    fn failure(&self, failure: CheckoutFailure, viewer: Viewer) -> CheckoutOutcome {
        CheckoutOutcome::Failure {
            notice: failure.notice(viewer, self.profile.brand),
            cause: Some(failure),
        }
    }
}

#[async_trait]
impl PaymentGateway for SwappedGateway {
    fn id(&self) -> &str {
        self.profile.slug
    }

    fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    fn descriptor(&self) -> PaymentMethodDescriptor {
        PaymentMethodDescriptor::new(&self.profile, Some(&self.settings), &self.store)
    }

    async fn process_payment(&self, order_id: u64, viewer: Viewer) -> Result<CheckoutOutcome> {
        if !self.is_available() {
            return Ok(CheckoutOutcome::Failure {
                notice: Notice::error(format!("{} is not available.", self.profile.brand)),
                cause: None,
            });
        }

        let order = self
            .orders
            .get(order_id)?
            .ok_or(GatewayError::OrderNotFound(order_id))?;
        if order.is_paid() {
            return Ok(already_paid());
        }

        let payload = build_order_payload(&order, &self.store);
        if self.settings.debug {
            tracing::info!(
                gateway = self.profile.slug,
                payload = %serde_json::to_string(&payload)?,
                "Creating Swapped order (request)"
            );
        }

        let remote = match self.api.create_remote_order(&payload).await {
            Ok(remote) => remote,
            Err(failure) => {
                tracing::warn!(
                    gateway = self.profile.slug,
                    order_id,
                    error = %failure,
                    "Swapped checkout failed"
                );
                return Ok(self.failure(failure, viewer));
            }
        };

        // The webhook may have confirmed payment while the request was in flight.
        let mut order = self
            .orders
            .get(order_id)?
            .ok_or(GatewayError::OrderNotFound(order_id))?;
        if order.is_paid() {
            tracing::warn!(
                gateway = self.profile.slug,
                order_id,
                status = %order.status,
                "Order was paid during checkout; keeping paid status"
            );
            return Ok(already_paid());
        }

        if !remote.remote_order_id.is_empty() {
            order.update_meta(META_REMOTE_ORDER_ID, &remote.remote_order_id);
        }
        order.update_meta(META_PAYMENT_LINK, &remote.link);
        // Stays pending until the webhook confirms payment.
        order.update_status(OrderStatus::Pending, AWAITING_PAYMENT_NOTE);
        self.orders.save(&order)?;

        if let Err(e) = self.cart.empty_cart(order.customer_id) {
            tracing::warn!(customer_id = order.customer_id, error = %e, "Could not empty cart");
        }

        tracing::info!(
            gateway = self.profile.slug,
            order_id,
            remote_order_id = %remote.remote_order_id,
            "Redirecting buyer to Swapped"
        );

        Ok(CheckoutOutcome::Success {
            redirect: remote.link,
        })
    }
}
