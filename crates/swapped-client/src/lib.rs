//! # swapped-client
//!
//! `reqwest` implementation of [`PaymentApi`] for the Swapped payment API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use swapped_core::{
    api::{DEFAULT_API_BASE, ORDERS_PATH},
    settings::USER_AGENT_PRODUCT,
    CheckoutFailure, GatewayError, GatewayProfile, GatewaySettings, OrderPayload, PaymentApi,
    RemoteOrderRef, StoreConfig, classify_response,
};

/// Header carrying the merchant API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Swapped client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// API host, without trailing slash
    pub base_url: String,

    pub api_key: String,

    pub user_agent: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Log provider responses at info level
    pub debug: bool,

    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment
    pub system_proxy: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.into(),
            api_key: String::new(),
            user_agent: format!("{USER_AGENT_PRODUCT}/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 45,
            debug: false,
            system_proxy: true,
        }
    }
}

impl ClientConfig {
    /// Configuration for one gateway instance
    pub fn for_gateway(
        profile: &GatewayProfile,
        settings: &GatewaySettings,
        store: &StoreConfig,
    ) -> Self {
        Self {
            api_key: settings.api_key.clone(),
            user_agent: profile.user_agent(&store.url),
            debug: settings.debug,
            ..Default::default()
        }
    }

    /// Override the API host from `SWAPPED_API_BASE` when set
    pub fn with_env_base(mut self) -> Self {
        if let Some(base) = std::env::var("SWAPPED_API_BASE")
            .ok()
            .filter(|b| !b.trim().is_empty())
        {
            self.base_url = base;
        }
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Swapped API client
pub struct SwappedClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl SwappedClient {
    /// Create from configuration
    pub fn from_config(config: ClientConfig) -> swapped_core::Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone());
        if !config.system_proxy {
            builder = builder.no_proxy();
        }

        let http = builder
            .build()
            .map_err(|e| GatewayError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Full create-order endpoint
    pub fn orders_url(&self) -> String {
        format!("{}{ORDERS_PATH}", self.config.base_url.trim_end_matches('/'))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl PaymentApi for SwappedClient {
    async fn create_remote_order(
        &self,
        payload: &OrderPayload,
    ) -> Result<RemoteOrderRef, CheckoutFailure> {
        let url = self.orders_url();

        let response = self
            .http
            .post(&url)
            .header(ACCEPT, "*/*")
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url = %url, error = %e, "Swapped API unreachable");
                CheckoutFailure::NetworkError(e.to_string())
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| CheckoutFailure::NetworkError(e.to_string()))?;

        if self.config.debug {
            tracing::info!(status, body = %body, "Create order response");
        } else {
            tracing::debug!(status, "Create order response");
        }

        classify_response(status, &body)
    }
}
