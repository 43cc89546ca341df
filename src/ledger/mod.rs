//! Position ledger: open positions, unrealized P/L and stop-loss/take-profit triggers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{CloseReason, Order, OrderSide, Position, PriceSnapshot, generate_id, instrument};

/// Unrealized profit or loss of `position` at `price`.
///
/// `(price - entry) × quantity × contract_size` for buys, negated for sells.
/// Every P/L figure in the crate (display, equity, settlement) goes through here.
pub fn unrealized_pnl(position: &Position, price: Decimal) -> Decimal {
    let diff = match position.side {
        OrderSide::Buy => price - position.entry_price,
        OrderSide::Sell => position.entry_price - price,
    };
    diff * position.quantity * instrument::contract_size(&position.symbol)
}

/// P/L as a percentage of the amount put at risk. Zero when nothing was at risk.
pub fn pnl_percent(position: &Position, price: Decimal) -> Decimal {
    if position.risk_amount.is_zero() {
        return Decimal::ZERO;
    }
    unrealized_pnl(position, price) / position.risk_amount * Decimal::ONE_HUNDRED
}

/// Returns the trigger hit by `price`, checking the stop-loss first.
pub fn trigger_at(position: &Position, price: Decimal) -> Option<CloseReason> {
    let (stop_hit, target_hit) = match position.side {
        OrderSide::Buy => (price <= position.stop_loss, price >= position.take_profit),
        OrderSide::Sell => (price >= position.stop_loss, price <= position.take_profit),
    };
    if stop_hit {
        Some(CloseReason::StopLoss)
    } else if target_hit {
        Some(CloseReason::TakeProfit)
    } else {
        None
    }
}

/// A position removed by a trigger, with the price that triggered it.
#[derive(Debug, Clone, PartialEq)]
pub struct Triggered {
    pub position: Position,
    pub exit_price: Decimal,
    pub reason: CloseReason,
}

/// PositionLedger holds open positions in the order they were opened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionLedger {
    positions: Vec<Position>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_positions(positions: Vec<Position>) -> Self {
        Self { positions }
    }

    /// Opens a position from a filled order using `fill_price` as the entry.
    pub fn open_position(
        &mut self,
        order: &Order,
        fill_price: Decimal,
        opened_at: DateTime<Utc>,
    ) -> &Position {
        self.positions.push(Position {
            id: generate_id("pos"),
            symbol: order.symbol.clone(),
            side: order.side,
            quantity: order.quantity,
            entry_price: fill_price,
            stop_loss: order.stop_loss,
            take_profit: order.take_profit,
            risk_amount: order.risk_amount,
            opened_at,
        });
        &self.positions[self.positions.len() - 1]
    }

    /// Removes every position whose stop-loss or take-profit is reached at the
    /// snapshot price. Positions without a quote are left untouched.
    pub fn evaluate_triggers(&mut self, prices: &PriceSnapshot) -> Vec<Triggered> {
        let mut triggered = Vec::new();
        let mut remaining = Vec::with_capacity(self.positions.len());

        for position in self.positions.drain(..) {
            let hit = prices
                .get(&position.symbol)
                .and_then(|price| trigger_at(&position, price).map(|reason| (price, reason)));

            match hit {
                Some((exit_price, reason)) => triggered.push(Triggered {
                    position,
                    exit_price,
                    reason,
                }),
                None => remaining.push(position),
            }
        }

        self.positions = remaining;
        triggered
    }

    /// Removes a position by id.
    pub fn remove(&mut self, id: &str) -> Option<Position> {
        let idx = self.positions.iter().position(|p| p.id == id)?;
        Some(self.positions.remove(idx))
    }

    pub fn get(&self, id: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.id == id)
    }

    /// Sum of unrealized P/L. Positions without a quote are valued at entry.
    pub fn total_unrealized(&self, prices: &PriceSnapshot) -> Decimal {
        self.positions
            .iter()
            .map(|p| unrealized_pnl(p, prices.get(&p.symbol).unwrap_or(p.entry_price)))
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter()
    }

    pub fn as_slice(&self) -> &[Position] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }
}
