//! Checkout block registration
//!
//! Describes a payment method to the block-based checkout renderer: label,
//! content, icons and whether it can be picked.

use serde::{Deserialize, Serialize};
use swapped_core::{GatewayProfile, GatewaySettings, StoreConfig};

/// Text next to the coin icons
pub const MORE_COINS_TEXT: &str = "(+20 more)";

const FALLBACK_DESCRIPTION: &str = "Pay with crypto via Swapped";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodIcons {
    pub btc: String,
    pub eth: String,
    pub usdt: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSupports {
    pub features: Vec<String>,
}

/// Payment method as registered with the checkout renderer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodDescriptor {
    pub name: String,
    pub payment_method_id: String,
    /// Label text
    pub title: String,
    /// Content shown when the method is selected
    pub description: String,
    pub aria_label: String,
    pub icons: MethodIcons,
    pub more_text: String,
    pub can_make_payment: bool,
    pub supports: MethodSupports,
}

impl PaymentMethodDescriptor {
    /// Build the descriptor; without saved settings the brand defaults apply
    /// and the method stays unavailable.
    pub fn new(
        profile: &GatewayProfile,
        settings: Option<&GatewaySettings>,
        store: &StoreConfig,
    ) -> Self {
        let title = settings.map_or_else(|| profile.brand.to_string(), |s| s.title.clone());
        let description = settings.map_or_else(
            || FALLBACK_DESCRIPTION.to_string(),
            |s| s.description.clone(),
        );
        let icon = |coin: &str| format!("{}/{coin}.svg", store.asset_url);

        Self {
            name: profile.slug.to_string(),
            payment_method_id: profile.slug.to_string(),
            aria_label: title.clone(),
            title,
            description,
            icons: MethodIcons {
                btc: icon("BTC"),
                eth: icon("ETH"),
                usdt: icon("USDT"),
            },
            more_text: MORE_COINS_TEXT.to_string(),
            can_make_payment: settings.is_some_and(|s| s.enabled),
            supports: MethodSupports {
                features: vec!["products".to_string()],
            },
        }
    }
}
