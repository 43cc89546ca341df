//! Orders and order placement requests.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// OrderSide represents the direction of an order (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    /// Buy opens a long position.
    Buy,
    /// Sell opens a short position.
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

/// OrderType represents how an order is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Market orders fill immediately at the current snapshot price.
    Market,
    /// Limit orders wait until the price crosses the requested entry.
    Limit,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Market => write!(f, "market"),
            OrderType::Limit => write!(f, "limit"),
        }
    }
}

/// OrderRequest is what a user submits from the order ticket.
///
/// Stop-loss and take-profit are optional here only so that a missing value
/// can be rejected with a proper reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    /// Requested entry for limit orders; ignored for market orders.
    pub limit_price: Option<Decimal>,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    /// Share of the balance put at risk, in percent (e.g., 1 for 1%).
    pub risk_percent: Decimal,
}

impl OrderRequest {
    /// Builds a market order request.
    pub fn market(
        symbol: impl Into<String>,
        side: OrderSide,
        stop_loss: Decimal,
        take_profit: Decimal,
        risk_percent: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            limit_price: None,
            stop_loss: Some(stop_loss),
            take_profit: Some(take_profit),
            risk_percent,
        }
    }

    /// Builds a limit order request.
    pub fn limit(
        symbol: impl Into<String>,
        side: OrderSide,
        limit_price: Decimal,
        stop_loss: Decimal,
        take_profit: Decimal,
        risk_percent: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Limit,
            limit_price: Some(limit_price),
            stop_loss: Some(stop_loss),
            take_profit: Some(take_profit),
            risk_percent,
        }
    }
}

/// Order is a validated, sized instruction to open a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub symbol: String,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    /// Whole number of contracts.
    pub quantity: Decimal,
    /// Limit price, or the snapshot price at placement for market orders.
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    /// Currency amount lost if the stop-loss is hit at the requested entry.
    pub risk_amount: Decimal,
    pub risk_percent: Decimal,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Returns true if `price` has crossed the entry in the order's favour.
    pub fn is_fillable_at(&self, price: Decimal) -> bool {
        match self.side {
            OrderSide::Buy => price <= self.entry_price,
            OrderSide::Sell => price >= self.entry_price,
        }
    }
}
