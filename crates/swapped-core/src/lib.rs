//! # swapped-core
//!
//! Domain model and contracts for accepting crypto payments through Swapped.
//!
//! ## Flow
//!
//! ```text
//! ┌─────────────┐  POST /v1/orders   ┌─────────────────┐
//! │  Checkout   │───────────────────▶│   Swapped API   │
//! │ (payload)   │◀───── link ────────│                 │
//! └─────────────┘                    └─────────────────┘
//!        │ redirect                           │
//!        ▼                                    │ webhook
//! ┌─────────────────┐                ┌────────▼────────┐
//! │ Hosted payment  │                │ Webhook handler │──▶ order paid
//! │      page       │                │  (idempotent)   │
//! └─────────────────┘                └─────────────────┘
//! ```
//!
//! The host store is reached only through [`OrderStore`] and [`Cart`]; the
//! network only through [`PaymentApi`].

pub mod api;
pub mod error;
pub mod notice;
pub mod order;
pub mod payload;
pub mod sanitize;
pub mod settings;
pub mod store;

pub use api::{PaymentApi, RemoteOrderRef, classify_response};
pub use error::{CheckoutFailure, GatewayError, Result};
pub use notice::{Notice, NoticeLevel, Viewer};
pub use order::{BillingAddress, Order, OrderNote, OrderStatus};
pub use payload::{OrderPayload, build_order_payload, format_price};
pub use settings::{GatewayProfile, GatewaySettings, StoreConfig};
pub use store::{Cart, CartLine, MemoryCart, MemoryOrderStore, OrderStore};
