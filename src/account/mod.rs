//! Demo account state: the single owner of balance, positions, orders and history.
//!
//! Every mutation goes through one of the `apply_*` operations or [`AccountState::reset`].
//! Equity is always derived from the balance and a price snapshot, never stored.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::book::{OrderBook, OrderRejection, PlacementLimits, prepare_order};
use crate::domain::{
    CloseReason, HistoryTrade, Order, OrderRequest, OrderType, Position, PriceSnapshot,
    generate_id, now,
};
use crate::ledger::{self, PositionLedger};

/// Starting balance of a fresh demo account.
pub const DEFAULT_INITIAL_BALANCE: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Outcome of a successful placement.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// Market order filled immediately.
    Filled(Position),
    /// Limit order waiting in the book.
    Pending(Order),
}

/// State changes produced by evaluating one price snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    pub fills: Vec<Position>,
    pub closes: Vec<HistoryTrade>,
}

impl TickOutcome {
    pub fn is_empty(&self) -> bool {
        self.fills.is_empty() && self.closes.is_empty()
    }
}

/// Open position together with its live valuation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionView {
    #[serde(flatten)]
    pub position: Position,
    pub current_price: Decimal,
    pub pnl: Decimal,
    pub pnl_percent: Decimal,
}

/// Read-only projection of the account at a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub balance: Decimal,
    pub equity: Decimal,
    pub positions: Vec<PositionView>,
    pub orders: Vec<Order>,
    pub history: Vec<HistoryTrade>,
    /// Snapshot the valuation was taken at.
    pub prices: PriceSnapshot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountState {
    balance: Decimal,
    positions: PositionLedger,
    orders: OrderBook,
    /// Newest first.
    history: Vec<HistoryTrade>,
}

impl AccountState {
    /// Creates a fresh account with the given balance.
    pub fn new(initial_balance: Decimal) -> Self {
        Self {
            balance: initial_balance,
            positions: PositionLedger::new(),
            orders: OrderBook::new(),
            history: Vec::new(),
        }
    }

    /// Rebuilds an account from persisted parts.
    pub fn from_parts(
        balance: Decimal,
        positions: Vec<Position>,
        orders: Vec<Order>,
        history: Vec<HistoryTrade>,
    ) -> Self {
        Self {
            balance,
            positions: PositionLedger::from_positions(positions),
            orders: OrderBook::from_orders(orders),
            history,
        }
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn positions(&self) -> &[Position] {
        self.positions.as_slice()
    }

    pub fn orders(&self) -> &[Order] {
        self.orders.as_slice()
    }

    pub fn history(&self) -> &[HistoryTrade] {
        &self.history
    }

    /// Sum of unrealized P/L over open positions.
    pub fn unrealized(&self, prices: &PriceSnapshot) -> Decimal {
        self.positions.total_unrealized(prices)
    }

    /// Balance plus unrealized P/L at the snapshot.
    pub fn equity(&self, prices: &PriceSnapshot) -> Decimal {
        self.balance + self.unrealized(prices)
    }

    /// Validates and sizes a request against the current balance, then either
    /// fills it (market) or queues it (limit).
    pub fn place_order(
        &mut self,
        request: &OrderRequest,
        prices: &PriceSnapshot,
        limits: &PlacementLimits,
    ) -> Result<Placement, OrderRejection> {
        let order = prepare_order(request, prices, self.balance, limits)?;

        match order.order_type {
            OrderType::Market => {
                let fill_price = order.entry_price;
                Ok(Placement::Filled(self.apply_fill(order, fill_price).clone()))
            }
            OrderType::Limit => {
                self.apply_placement(order.clone());
                Ok(Placement::Pending(order))
            }
        }
    }

    /// Queues a validated limit order.
    pub fn apply_placement(&mut self, order: Order) {
        debug!(order_id = %order.id, symbol = %order.symbol, entry = %order.entry_price, "Limit order queued");
        self.orders.add(order);
    }

    /// Converts an order into a position at `fill_price`, dropping it from the
    /// pending list if it was queued there.
    pub fn apply_fill(&mut self, order: Order, fill_price: Decimal) -> &Position {
        self.orders.cancel_order(&order.id);
        let position = self.positions.open_position(&order, fill_price, now());

        info!(
            position_id = %position.id,
            symbol = %position.symbol,
            side = %position.side,
            quantity = %position.quantity,
            entry = %position.entry_price,
            "Position opened"
        );

        position
    }

    /// Closes a position at `exit_price`, crediting the realized P/L.
    /// Unknown ids are a no-op.
    pub fn apply_close(
        &mut self,
        position_id: &str,
        exit_price: Decimal,
        reason: CloseReason,
    ) -> Option<HistoryTrade> {
        let position = self.positions.remove(position_id)?;
        Some(self.settle(position, exit_price, reason))
    }

    /// Removes a pending order. Unknown ids are a no-op.
    pub fn apply_cancel(&mut self, order_id: &str) -> Option<Order> {
        let order = self.orders.cancel_order(order_id)?;
        info!(order_id = %order.id, symbol = %order.symbol, "Order cancelled");
        Some(order)
    }

    /// Restores the initial balance and drops every position, order and trade.
    pub fn reset(&mut self, initial_balance: Decimal) {
        self.balance = initial_balance;
        self.positions.clear();
        self.orders.clear();
        self.history.clear();
        info!(balance = %initial_balance, "Account reset");
    }

    /// Fills crossed limit orders, then closes positions whose stop-loss or
    /// take-profit is reached, all at the snapshot prices.
    pub fn evaluate(&mut self, prices: &PriceSnapshot) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        for fill in self.orders.evaluate_fills(prices) {
            let position = self.apply_fill(fill.order, fill.fill_price).clone();
            outcome.fills.push(position);
        }

        for hit in self.positions.evaluate_triggers(prices) {
            let trade = self.settle(hit.position, hit.exit_price, hit.reason);
            outcome.closes.push(trade);
        }

        outcome
    }

    /// Live view of the account at the snapshot.
    pub fn summary(&self, prices: &PriceSnapshot) -> AccountSummary {
        let positions = self
            .positions
            .iter()
            .map(|p| {
                let current_price = prices.get(&p.symbol).unwrap_or(p.entry_price);
                PositionView {
                    position: p.clone(),
                    current_price,
                    pnl: ledger::unrealized_pnl(p, current_price),
                    pnl_percent: ledger::pnl_percent(p, current_price),
                }
            })
            .collect();

        AccountSummary {
            balance: self.balance,
            equity: self.equity(prices),
            positions,
            orders: self.orders.as_slice().to_vec(),
            history: self.history.clone(),
            prices: prices.clone(),
        }
    }

    fn settle(&mut self, position: Position, exit_price: Decimal, reason: CloseReason) -> HistoryTrade {
        let pnl = ledger::unrealized_pnl(&position, exit_price);
        self.balance += pnl;

        let trade = HistoryTrade::from_position(
            generate_id("hist"),
            position,
            exit_price,
            pnl,
            reason,
            now(),
        );

        info!(
            position_id = %trade.position_id,
            symbol = %trade.symbol,
            reason = %reason,
            exit = %exit_price,
            pnl = %pnl,
            balance = %self.balance,
            "Position closed"
        );

        self.history.insert(0, trade.clone());
        trade
    }
}

impl Default for AccountState {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_BALANCE)
    }
}
