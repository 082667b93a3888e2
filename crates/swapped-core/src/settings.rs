//! Gateway Settings
//!
//! Two payment methods ship with the gateway, Swapped Commerce and Swapped Pay.
//! They differ only in branding and defaults, captured by [`GatewayProfile`].
//! Per-instance settings and store details are read from the environment.

use serde::{Deserialize, Serialize};

use crate::order::Order;

/// Product token sent in the `User-Agent` header
pub const USER_AGENT_PRODUCT: &str = "SwappedPayWoo";

/// Route namespace the webhook is mounted under
pub const WEBHOOK_NAMESPACE: &str = "swapped/v1";

/// Static branding and defaults of one payment method
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GatewayProfile {
    /// Gateway id, also the checkout-block payment method name
    pub slug: &'static str,
    pub brand: &'static str,
    pub version: &'static str,
    /// Prefix of the environment variables holding settings
    pub env_prefix: &'static str,
    pub default_title: &'static str,
    pub default_description: &'static str,
    pub dashboard_url: &'static str,
}

impl GatewayProfile {
    pub const COMMERCE: Self = Self {
        slug: "swapped-commerce",
        brand: "Swapped Commerce",
        version: "1.0.0",
        env_prefix: "SWAPPED_COMMERCE",
        default_title: "Swapped Commerce (Crypto)",
        default_description: "Pay securely with cryptocurrency via Swapped Commerce.",
        dashboard_url: "https://dashboard.swapped.com/commerce/developers",
    };

    pub const PAY: Self = Self {
        slug: "swapped-pay",
        brand: "Swapped Pay",
        version: "1.1.3",
        env_prefix: "SWAPPED_PAY",
        default_title: "Swapped Pay (Crypto)",
        default_description: "Pay securely with cryptocurrency via Swapped.",
        dashboard_url: "https://dashboard.swapped.com/pay/developers",
    };

    pub const ALL: [Self; 2] = [Self::COMMERCE, Self::PAY];

    pub fn by_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.slug == slug)
    }

    /// `User-Agent` header value for API calls made on behalf of `store_url`
    pub fn user_agent(&self, store_url: &str) -> String {
        format!("{USER_AGENT_PRODUCT}/{} (+{store_url})", self.version)
    }
}

/// Settings of one gateway instance
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewaySettings {
    pub enabled: bool,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Log request payloads and provider responses
    pub debug: bool,
}

impl GatewaySettings {
    /// Defaults for a profile: disabled, no key
    pub fn for_profile(profile: &GatewayProfile) -> Self {
        Self {
            enabled: false,
            title: profile.default_title.to_string(),
            description: profile.default_description.to_string(),
            api_key: String::new(),
            debug: false,
        }
    }

    /// Create from environment variables (`<PREFIX>_ENABLED`, `_TITLE`, ...)
    pub fn from_env(profile: &GatewayProfile) -> Self {
        Self::from_lookup(profile, |name| std::env::var(name).ok())
    }

    /// Build from any key lookup; keys are `<PREFIX>_<FIELD>`.
    pub fn from_lookup(
        profile: &GatewayProfile,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let var = |field: &str| lookup(&format!("{}_{field}", profile.env_prefix));
        let defaults = Self::for_profile(profile);

        Self {
            enabled: var("ENABLED").is_some_and(|v| parse_flag(&v)),
            title: var("TITLE").unwrap_or(defaults.title),
            description: var("DESCRIPTION").unwrap_or(defaults.description),
            api_key: var("API_KEY").unwrap_or_default().trim().to_string(),
            debug: var("DEBUG").is_some_and(|v| parse_flag(&v)),
        }
    }

    /// Enabled and holding an API key
    pub fn is_available(&self) -> bool {
        self.enabled && !self.api_key.is_empty()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "yes" | "true" | "1" | "on"
    )
}

/// Store-wide details used in payloads and URLs
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Display name, may contain HTML entities
    pub name: String,
    /// Home URL without trailing slash
    pub url: String,
    pub icon_url: Option<String>,
    pub placeholder_image_url: String,
    /// Base URL of the payment method icons
    pub asset_url: String,
    /// Bearer token granting store-manager privileges at checkout
    #[serde(skip_serializing)]
    pub admin_token: Option<String>,
}

impl StoreConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into().trim_end_matches('/').to_string();
        Self {
            name: name.into(),
            placeholder_image_url: format!("{url}/assets/placeholder.png"),
            asset_url: format!("{url}/assets/img"),
            url,
            icon_url: None,
            admin_token: None,
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let mut config = Self::new(
            var("STORE_NAME").unwrap_or_else(|| "My Store".into()),
            var("STORE_URL").unwrap_or_else(|| "http://localhost:3000".into()),
        );
        config.icon_url = var("STORE_ICON_URL");
        if let Some(placeholder) = var("STORE_PLACEHOLDER_IMAGE_URL") {
            config.placeholder_image_url = placeholder;
        }
        if let Some(assets) = var("STORE_ASSET_URL") {
            config.asset_url = assets.trim_end_matches('/').to_string();
        }
        config.admin_token = var("STORE_ADMIN_TOKEN");
        config
    }

    /// Where the buyer lands after paying
    pub fn order_received_url(&self, order: &Order) -> String {
        format!(
            "{}/checkout/order-received/{}/?key={}",
            self.url, order.id, order.order_key
        )
    }

    /// URL to paste into the Swapped dashboard
    pub fn webhook_url(&self) -> String {
        format!("{}/{WEBHOOK_NAMESPACE}/webhook", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_settings_defaults() {
        let settings = GatewaySettings::from_lookup(&GatewayProfile::PAY, lookup(&[]));
        assert!(!settings.enabled);
        assert_eq!(settings.title, "Swapped Pay (Crypto)");
        assert!(!settings.is_available());
    }

    #[test]
    fn test_settings_availability_needs_key() {
        let enabled_only = GatewaySettings::from_lookup(
            &GatewayProfile::COMMERCE,
            lookup(&[("SWAPPED_COMMERCE_ENABLED", "yes")]),
        );
        assert!(enabled_only.enabled);
        assert!(!enabled_only.is_available());

        let ready = GatewaySettings::from_lookup(
            &GatewayProfile::COMMERCE,
            lookup(&[
                ("SWAPPED_COMMERCE_ENABLED", "true"),
                ("SWAPPED_COMMERCE_API_KEY", " sk_live "),
                ("SWAPPED_COMMERCE_DEBUG", "no"),
            ]),
        );
        assert!(ready.is_available());
        assert_eq!(ready.api_key, "sk_live");
        assert!(!ready.debug);
    }

    #[test]
    fn test_user_agent() {
        assert_eq!(
            GatewayProfile::PAY.user_agent("https://shop.example"),
            "SwappedPayWoo/1.1.3 (+https://shop.example)"
        );
    }

    #[test]
    fn test_store_urls() {
        let store = StoreConfig::new("Shop", "https://shop.example/");
        assert_eq!(store.webhook_url(), "https://shop.example/swapped/v1/webhook");
        assert_eq!(store.placeholder_image_url, "https://shop.example/assets/placeholder.png");
        assert_eq!(GatewayProfile::by_slug("swapped-pay"), Some(GatewayProfile::PAY));
        assert!(GatewayProfile::by_slug("stripe").is_none());
    }
}
