//! Open positions and closed trade records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::OrderSide;

/// Position represents an open, filled trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub symbol: String,
    pub side: OrderSide,
    /// Always positive.
    pub quantity: Decimal,
    /// Effective fill price.
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub risk_amount: Decimal,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub opened_at: DateTime<Utc>,
}

/// CloseReason records why a position left the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    StopLoss,
    TakeProfit,
    Manual,
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloseReason::StopLoss => write!(f, "stop_loss"),
            CloseReason::TakeProfit => write!(f, "take_profit"),
            CloseReason::Manual => write!(f, "manual"),
        }
    }
}

/// HistoryTrade is the immutable record of a closed position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryTrade {
    pub id: String,
    /// Id of the position this trade closed.
    pub position_id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub risk_amount: Decimal,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub opened_at: DateTime<Utc>,
    pub exit_price: Decimal,
    /// Realized profit or loss credited to the balance.
    pub pnl: Decimal,
    pub reason: CloseReason,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub closed_at: DateTime<Utc>,
}

impl HistoryTrade {
    /// Snapshots a position at close time.
    pub fn from_position(
        id: String,
        position: Position,
        exit_price: Decimal,
        pnl: Decimal,
        reason: CloseReason,
        closed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            position_id: position.id,
            symbol: position.symbol,
            side: position.side,
            quantity: position.quantity,
            entry_price: position.entry_price,
            stop_loss: position.stop_loss,
            take_profit: position.take_profit,
            risk_amount: position.risk_amount,
            opened_at: position.opened_at,
            exit_price,
            pnl,
            reason,
            closed_at,
        }
    }

    /// Returns true if the trade closed with a profit.
    pub fn is_win(&self) -> bool {
        self.pnl > Decimal::ZERO
    }
}
