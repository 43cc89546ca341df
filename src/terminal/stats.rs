//! Runtime statistics for the terminal.

use rust_decimal::Decimal;

use crate::domain::{CloseReason, HistoryTrade};

/// Session counters. Not persisted; a restart starts from zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stats {
    pub ticks: u64,
    pub orders_placed: u64,
    pub orders_rejected: u64,
    pub orders_filled: u64,
    pub orders_cancelled: u64,
    pub stop_loss_hits: u64,
    pub take_profit_hits: u64,
    pub manual_closes: u64,
    /// Closed trades with a positive P/L.
    pub wins: u64,
    /// Closed trades at break-even or worse.
    pub losses: u64,
    pub realized_pnl: Decimal,
    pub resets: u64,
}

impl Stats {
    pub(crate) fn record_close(&mut self, trade: &HistoryTrade) {
        match trade.reason {
            CloseReason::StopLoss => self.stop_loss_hits += 1,
            CloseReason::TakeProfit => self.take_profit_hits += 1,
            CloseReason::Manual => self.manual_closes += 1,
        }
        if trade.is_win() {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        self.realized_pnl += trade.pnl;
    }
}
