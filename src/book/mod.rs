//! Client-local order book holding pending limit orders.

mod placement;

pub use placement::{
    OrderRejection, PlacementLimits, Sizing, prepare_order, risk_reward_ratio, size_order,
};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Order, PriceSnapshot};

/// A pending order that crossed its entry, with the price it crossed at.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub order: Order,
    pub fill_price: Decimal,
}

/// OrderBook holds pending limit orders in placement order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderBook {
    orders: Vec<Order>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_orders(orders: Vec<Order>) -> Self {
        Self { orders }
    }

    /// Appends a pending order.
    pub fn add(&mut self, order: Order) {
        self.orders.push(order);
    }

    /// Removes a pending order. Unknown ids are a no-op and return `None`.
    pub fn cancel_order(&mut self, id: &str) -> Option<Order> {
        let idx = self.orders.iter().position(|o| o.id == id)?;
        Some(self.orders.remove(idx))
    }

    /// Removes and returns every order the snapshot fills.
    ///
    /// Buys fill at or below their entry, sells at or above; the fill price is
    /// the snapshot price. Orders without a quote stay pending.
    pub fn evaluate_fills(&mut self, prices: &PriceSnapshot) -> Vec<Fill> {
        let mut fills = Vec::new();
        let mut pending = Vec::with_capacity(self.orders.len());

        for order in self.orders.drain(..) {
            match prices.get(&order.symbol) {
                Some(price) if order.is_fillable_at(price) => fills.push(Fill {
                    order,
                    fill_price: price,
                }),
                _ => pending.push(order),
            }
        }

        self.orders = pending;
        fills
    }

    pub fn get(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    pub fn as_slice(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn clear(&mut self) {
        self.orders.clear();
    }
}
