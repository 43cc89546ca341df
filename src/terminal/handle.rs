//! Cloneable handle for sending user actions to a running terminal.

use tokio::sync::{mpsc, oneshot};

use super::{Stats, TerminalError};
use crate::account::{AccountSummary, Placement};
use crate::book::OrderRejection;
use crate::domain::{HistoryTrade, Order, OrderRequest};

pub(crate) enum Command {
    PlaceOrder {
        request: OrderRequest,
        reply: oneshot::Sender<Result<Placement, OrderRejection>>,
    },
    CancelOrder {
        id: String,
        reply: oneshot::Sender<Option<Order>>,
    },
    ClosePosition {
        id: String,
        reply: oneshot::Sender<Option<HistoryTrade>>,
    },
    Reset {
        reply: oneshot::Sender<()>,
    },
    Summary {
        reply: oneshot::Sender<AccountSummary>,
    },
    Stats {
        reply: oneshot::Sender<Stats>,
    },
    Shutdown,
}

/// TerminalHandle is how consumers reach the terminal task.
#[derive(Clone)]
pub struct TerminalHandle {
    tx: mpsc::Sender<Command>,
}

impl TerminalHandle {
    pub(crate) fn new(tx: mpsc::Sender<Command>) -> Self {
        Self { tx }
    }

    pub async fn place_order(&self, request: OrderRequest) -> Result<Placement, TerminalError> {
        let placement = self
            .request(|reply| Command::PlaceOrder { request, reply })
            .await?;
        Ok(placement?)
    }

    /// Cancels a pending order; `None` if it was not pending.
    pub async fn cancel_order(&self, id: impl Into<String>) -> Result<Option<Order>, TerminalError> {
        let id = id.into();
        self.request(|reply| Command::CancelOrder { id, reply }).await
    }

    /// Closes an open position at the current price; `None` if it was not open.
    pub async fn close_position(
        &self,
        id: impl Into<String>,
    ) -> Result<Option<HistoryTrade>, TerminalError> {
        let id = id.into();
        self.request(|reply| Command::ClosePosition { id, reply }).await
    }

    pub async fn reset(&self) -> Result<(), TerminalError> {
        self.request(|reply| Command::Reset { reply }).await
    }

    pub async fn summary(&self) -> Result<AccountSummary, TerminalError> {
        self.request(|reply| Command::Summary { reply }).await
    }

    pub async fn stats(&self) -> Result<Stats, TerminalError> {
        self.request(|reply| Command::Stats { reply }).await
    }

    /// Asks the terminal to stop. Safe to call on a stopped terminal.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown).await;
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, TerminalError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| TerminalError::Stopped)?;
        rx.await.map_err(|_| TerminalError::Stopped)
    }
}
