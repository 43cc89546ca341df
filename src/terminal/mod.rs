//! Demo trading terminal.
//!
//! Owns the account and the latest price snapshot, applies user commands and
//! price ticks, and persists the account after every change.

mod config;
mod error;
mod handle;
mod stats;

pub use config::TerminalConfig;
pub use error::TerminalError;
pub use handle::TerminalHandle;
pub use stats::Stats;

use rust_decimal::Decimal;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::account::{AccountState, AccountSummary, Placement, TickOutcome};
use crate::book::{OrderRejection, risk_reward_ratio};
use crate::domain::{CloseReason, HistoryTrade, Order, OrderRequest, PriceSnapshot};
use crate::storage::Persistence;
use handle::Command;

/// Capacity of the command queue.
const COMMAND_CAPACITY: usize = 64;

/// Terminal is the single owner of the demo account.
pub struct Terminal {
    cfg: TerminalConfig,
    account: AccountState,
    prices: PriceSnapshot,
    persistence: Persistence,
    stats: Stats,
}

impl Terminal {
    /// Creates a terminal with the account restored from persistence.
    pub async fn restore(cfg: TerminalConfig, persistence: Persistence) -> Self {
        let account = persistence.load().await;

        info!(
            namespace = %persistence.namespace(),
            balance = %account.balance(),
            positions = account.positions().len(),
            orders = account.orders().len(),
            history = account.history().len(),
            "Account loaded"
        );

        Self {
            cfg,
            account,
            prices: PriceSnapshot::initial(),
            persistence,
            stats: Stats::default(),
        }
    }

    pub fn account(&self) -> &AccountState {
        &self.account
    }

    pub fn prices(&self) -> &PriceSnapshot {
        &self.prices
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn equity(&self) -> Decimal {
        self.account.equity(&self.prices)
    }

    pub fn summary(&self) -> AccountSummary {
        self.account.summary(&self.prices)
    }

    /// Places an order against the latest snapshot.
    pub async fn place_order(&mut self, request: &OrderRequest) -> Result<Placement, OrderRejection> {
        match self.account.place_order(request, &self.prices, &self.cfg.limits) {
            Ok(placement) => {
                self.stats.orders_placed += 1;
                let (entry, stop_loss, take_profit) = match &placement {
                    Placement::Filled(p) => {
                        self.stats.orders_filled += 1;
                        (p.entry_price, p.stop_loss, p.take_profit)
                    }
                    Placement::Pending(o) => (o.entry_price, o.stop_loss, o.take_profit),
                };
                info!(
                    symbol = %request.symbol,
                    side = %request.side,
                    order_type = %request.order_type,
                    risk_percent = %request.risk_percent,
                    risk_reward = ?risk_reward_ratio(entry, stop_loss, take_profit),
                    "Order placed"
                );
                self.persistence.save(&self.account).await;
                Ok(placement)
            }
            Err(reason) => {
                self.stats.orders_rejected += 1;
                info!(
                    symbol = %request.symbol,
                    side = %request.side,
                    order_type = %request.order_type,
                    reason = %reason,
                    "Order rejected"
                );
                Err(reason)
            }
        }
    }

    /// Cancels a pending order. Unknown ids are a no-op.
    pub async fn cancel_order(&mut self, id: &str) -> Option<Order> {
        let order = self.account.apply_cancel(id)?;
        self.stats.orders_cancelled += 1;
        self.persistence.save(&self.account).await;
        Some(order)
    }

    /// Closes a position at the latest snapshot price (entry price if unquoted).
    pub async fn close_position(&mut self, id: &str) -> Option<HistoryTrade> {
        let position = self.account.positions().iter().find(|p| p.id == id)?;
        let exit_price = self.prices.get(&position.symbol).unwrap_or(position.entry_price);

        let trade = self.account.apply_close(id, exit_price, CloseReason::Manual)?;
        self.stats.record_close(&trade);
        self.persistence.save(&self.account).await;
        Some(trade)
    }

    /// Restores the initial balance and removes the persisted record.
    pub async fn reset(&mut self) {
        self.account.reset(self.cfg.initial_balance);
        self.stats.resets += 1;
        self.persistence.clear().await;
    }

    /// Applies a new snapshot: pending fills first, then stop-loss/take-profit triggers.
    pub async fn on_prices(&mut self, snapshot: PriceSnapshot) -> TickOutcome {
        self.prices = snapshot;
        self.stats.ticks += 1;

        let outcome = self.account.evaluate(&self.prices);
        if outcome.is_empty() {
            return outcome;
        }

        self.stats.orders_filled += outcome.fills.len() as u64;
        for trade in &outcome.closes {
            self.stats.record_close(trade);
        }

        debug!(
            sequence = self.prices.sequence,
            fills = outcome.fills.len(),
            closes = outcome.closes.len(),
            "Tick applied"
        );

        self.persistence.save(&self.account).await;
        outcome
    }

    /// Spawns the terminal loop consuming `prices` and returns a handle to it.
    ///
    /// The task resolves to the terminal once it shuts down.
    pub fn spawn(self, prices: broadcast::Receiver<PriceSnapshot>) -> (TerminalHandle, JoinHandle<Terminal>) {
        let (tx, rx) = mpsc::channel(COMMAND_CAPACITY);
        let task = tokio::spawn(self.run(prices, rx));
        (TerminalHandle::new(tx), task)
    }

    async fn run(
        mut self,
        mut prices: broadcast::Receiver<PriceSnapshot>,
        mut commands: mpsc::Receiver<Command>,
    ) -> Self {
        let mut summary_timer = tokio::time::interval(self.cfg.summary_interval);
        summary_timer.tick().await;

        info!(
            summary_interval = ?self.cfg.summary_interval,
            max_risk_percent = %self.cfg.limits.max_risk_percent,
            "Terminal running"
        );

        loop {
            tokio::select! {
                // Commands win over ticks so a cancel queued before a tick is
                // applied before that tick can fill the order.
                biased;

                command = commands.recv() => match command {
                    Some(command) => {
                        if !self.handle(command).await {
                            break;
                        }
                    }
                    None => break,
                },
                snapshot = prices.recv() => match snapshot {
                    Ok(snapshot) => {
                        if !self.drain(&mut commands).await {
                            break;
                        }
                        self.on_prices(snapshot).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Terminal lagged behind price feed");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Price feed closed");
                        break;
                    }
                },
                _ = summary_timer.tick() => self.log_summary(),
            }
        }

        self.log_summary();
        info!(ticks = self.stats.ticks, "Terminal stopped");
        self
    }

    /// Handles every command already queued. Returns false on shutdown.
    async fn drain(&mut self, commands: &mut mpsc::Receiver<Command>) -> bool {
        while let Ok(command) = commands.try_recv() {
            if !self.handle(command).await {
                return false;
            }
        }
        true
    }

    /// Applies one command. Returns false on shutdown.
    async fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::PlaceOrder { request, reply } => {
                let _ = reply.send(self.place_order(&request).await);
            }
            Command::CancelOrder { id, reply } => {
                let _ = reply.send(self.cancel_order(&id).await);
            }
            Command::ClosePosition { id, reply } => {
                let _ = reply.send(self.close_position(&id).await);
            }
            Command::Reset { reply } => {
                self.reset().await;
                let _ = reply.send(());
            }
            Command::Summary { reply } => {
                let _ = reply.send(self.summary());
            }
            Command::Stats { reply } => {
                let _ = reply.send(self.stats.clone());
            }
            Command::Shutdown => return false,
        }
        true
    }

    fn log_summary(&self) {
        info!(
            balance = %self.account.balance(),
            equity = %self.equity(),
            positions = self.account.positions().len(),
            orders = self.account.orders().len(),
            closed = self.account.history().len(),
            wins = self.stats.wins,
            losses = self.stats.losses,
            realized_pnl = %self.stats.realized_pnl,
            "Account summary"
        );
    }
}

#[cfg(test)]
mod tests;
