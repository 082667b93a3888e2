//! Order Model
//!
//! The slice of a store order that the gateway reads and writes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Metadata key holding the Swapped order id
pub const META_REMOTE_ORDER_ID: &str = "_swapped_order_id";

/// Metadata key holding the hosted payment link
pub const META_PAYMENT_LINK: &str = "_swapped_order_link";

/// Order lifecycle states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    Pending,
    OnHold,
    Processing,
    Completed,
    Failed,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::OnHold => "on-hold",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    /// Label used in order notes
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending payment",
            Self::OnHold => "On hold",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
            Self::Refunded => "Refunded",
        }
    }

    /// Statuses that count as paid
    pub fn is_paid(self) -> bool {
        matches!(self, Self::Processing | Self::Completed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Billing details captured at checkout
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingAddress {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    /// ISO 3166-1 alpha-2
    #[serde(default)]
    pub country: String,
}

impl BillingAddress {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Append-only note on an order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderNote {
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A store order
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,

    /// Secret key used in the order-received URL
    pub order_key: String,

    /// Customer id, 0 for guests
    pub customer_id: u64,

    pub total: Decimal,

    /// ISO 4217 code
    pub currency: String,

    pub billing: BillingAddress,

    pub status: OrderStatus,

    /// Orders with only virtual/downloadable items skip processing
    pub needs_processing: bool,

    pub transaction_id: Option<String>,

    pub paid_at: Option<DateTime<Utc>>,

    pub metadata: BTreeMap<String, String>,

    pub notes: Vec<OrderNote>,

    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Create a pending order
    pub fn new(id: u64, total: Decimal, currency: impl Into<String>) -> Self {
        Self {
            id,
            order_key: generate_order_key(),
            customer_id: 0,
            total,
            currency: currency.into(),
            billing: BillingAddress::default(),
            status: OrderStatus::Pending,
            needs_processing: true,
            transaction_id: None,
            paid_at: None,
            metadata: BTreeMap::new(),
            notes: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_billing(mut self, billing: BillingAddress) -> Self {
        self.billing = billing;
        self
    }

    pub fn with_customer(mut self, customer_id: u64) -> Self {
        self.customer_id = customer_id;
        self
    }

    pub fn is_paid(&self) -> bool {
        self.status.is_paid()
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn update_meta(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    pub fn add_note(&mut self, content: impl Into<String>) {
        self.notes.push(OrderNote {
            content: content.into(),
            created_at: Utc::now(),
        });
    }

    /// Move to `status`, recording `note` together with the transition.
    pub fn update_status(&mut self, status: OrderStatus, note: &str) {
        let from = self.status;
        self.status = status;

        if from == status {
            if !note.is_empty() {
                self.add_note(note);
            }
            return;
        }

        let transition = format!(
            "Order status changed from {} to {}.",
            from.label(),
            status.label()
        );
        if note.is_empty() {
            self.add_note(transition);
        } else {
            self.add_note(format!("{note} {transition}"));
        }
    }

    /// Mark the order paid and return the status it landed in.
    pub fn payment_complete(&mut self, transaction_id: &str) -> OrderStatus {
        if !transaction_id.is_empty() {
            self.transaction_id = Some(transaction_id.to_string());
        }
        self.paid_at = Some(Utc::now());
        self.status = if self.needs_processing {
            OrderStatus::Processing
        } else {
            OrderStatus::Completed
        };
        self.status
    }
}

fn generate_order_key() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("wc_order_{}", &hex[..13])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_full_name_is_trimmed() {
        let billing = BillingAddress {
            first_name: "Ada".into(),
            ..Default::default()
        };
        assert_eq!(billing.full_name(), "Ada");
    }

    #[test]
    fn test_update_status_records_transition() {
        let mut order = Order::new(1, dec!(10), "USD");
        order.update_status(OrderStatus::OnHold, "Waiting.");
        assert_eq!(
            order.notes[0].content,
            "Waiting. Order status changed from Pending payment to On hold."
        );

        order.update_status(OrderStatus::OnHold, "Still waiting.");
        assert_eq!(order.notes[1].content, "Still waiting.");
    }

    #[test]
    fn test_payment_complete() {
        let mut order = Order::new(1, dec!(10), "USD");
        assert!(!order.is_paid());

        assert_eq!(order.payment_complete("SW1"), OrderStatus::Processing);
        assert!(order.is_paid());
        assert_eq!(order.transaction_id.as_deref(), Some("SW1"));
        assert!(order.paid_at.is_some());

        let mut digital = Order::new(2, dec!(10), "USD");
        digital.needs_processing = false;
        assert_eq!(digital.payment_complete("SW2"), OrderStatus::Completed);
    }

    #[test]
    fn test_order_key_format() {
        let order = Order::new(1, dec!(1), "EUR");
        assert!(order.order_key.starts_with("wc_order_"));
        assert_eq!(order.order_key.len(), 22);
    }
}
