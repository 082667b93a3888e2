//! Host storage ports
//!
//! The gateway never owns orders or carts; it reaches them through these
//! traits. The in-memory implementations back the bundled server and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::error::{GatewayError, Result};
use crate::order::Order;

/// Order storage trait
pub trait OrderStore: Send + Sync {
    /// Get order by id
    fn get(&self, id: u64) -> Result<Option<Order>>;

    /// Save or update an order
    fn save(&self, order: &Order) -> Result<()>;
}

/// Buyer cart access
pub trait Cart: Send + Sync {
    /// Drop everything in the customer's active cart
    fn empty_cart(&self, customer_id: u64) -> Result<()>;
}

fn poisoned<T>(_: T) -> GatewayError {
    GatewayError::Storage("lock poisoned".into())
}

/// In-memory order store (for development)
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<u64, Order>>,
    next_id: AtomicU64,
}

impl Default for MemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Allocate the next order id
    pub fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Insert an order, keeping id allocation ahead of explicit ids
    pub fn insert(&self, order: Order) -> Result<()> {
        self.next_id.fetch_max(order.id.saturating_add(1), Ordering::Relaxed);
        self.orders.write().map_err(poisoned)?.insert(order.id, order);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.orders.read().map_or(0, |orders| orders.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OrderStore for MemoryOrderStore {
    fn get(&self, id: u64) -> Result<Option<Order>> {
        let orders = self.orders.read().map_err(poisoned)?;
        Ok(orders.get(&id).cloned())
    }

    fn save(&self, order: &Order) -> Result<()> {
        let mut orders = self.orders.write().map_err(poisoned)?;
        orders.insert(order.id, order.clone());
        Ok(())
    }
}

/// Line in a cart
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CartLine {
    pub sku: String,
    pub quantity: u32,
}

/// In-memory carts keyed by customer id
#[derive(Default)]
pub struct MemoryCart {
    carts: RwLock<HashMap<u64, Vec<CartLine>>>,
}

impl MemoryCart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&self, customer_id: u64, line: CartLine) -> Result<()> {
        let mut carts = self.carts.write().map_err(poisoned)?;
        carts.entry(customer_id).or_default().push(line);
        Ok(())
    }

    pub fn items(&self, customer_id: u64) -> Result<Vec<CartLine>> {
        let carts = self.carts.read().map_err(poisoned)?;
        Ok(carts.get(&customer_id).cloned().unwrap_or_default())
    }
}

impl Cart for MemoryCart {
    fn empty_cart(&self, customer_id: u64) -> Result<()> {
        let mut carts = self.carts.write().map_err(poisoned)?;
        carts.remove(&customer_id);
        tracing::debug!(customer_id, "Emptied cart");
        Ok(())
    }
}
