//! Tests for the terminal and its command loop.

use std::sync::Arc;

use tokio::sync::oneshot;

use super::handle::Command;
use super::*;
use crate::domain::OrderSide;
use crate::storage::{DEFAULT_NAMESPACE, KeyValueStore, MemoryStore};

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn btc_at(price: &str) -> PriceSnapshot {
    PriceSnapshot::initial().with_price("BTC/USDT", d(price))
}

fn btc_long() -> OrderRequest {
    OrderRequest::market("BTC/USDT", OrderSide::Buy, d("43200.50"), d("43350.50"), d("1"))
}

fn btc_limit_long() -> OrderRequest {
    OrderRequest::limit(
        "BTC/USDT",
        OrderSide::Buy,
        d("43000"),
        d("42900"),
        d("43500"),
        d("1"),
    )
}

async fn terminal_with(store: Arc<MemoryStore>) -> Terminal {
    let cfg = TerminalConfig::default();
    let persistence = Persistence::new(store, DEFAULT_NAMESPACE, cfg.initial_balance);
    Terminal::restore(cfg, persistence).await
}

// ==================== Direct operations ====================

#[tokio::test]
async fn test_fresh_terminal_starts_with_default_balance() {
    let terminal = terminal_with(Arc::new(MemoryStore::new())).await;

    assert_eq!(terminal.account().balance(), d("10000"));
    assert_eq!(terminal.equity(), d("10000"));
    assert_eq!(terminal.stats(), &Stats::default());
}

#[tokio::test]
async fn test_take_profit_tick_credits_balance() {
    let mut terminal = terminal_with(Arc::new(MemoryStore::new())).await;
    terminal.place_order(&btc_long()).await.unwrap();

    let outcome = terminal.on_prices(btc_at("43350.50")).await;

    assert_eq!(outcome.closes.len(), 1);
    assert_eq!(outcome.closes[0].reason, CloseReason::TakeProfit);
    assert_eq!(outcome.closes[0].pnl, d("200"));
    assert_eq!(terminal.account().balance(), d("10200"));
    assert!(terminal.account().positions().is_empty());

    let stats = terminal.stats();
    assert_eq!(stats.ticks, 1);
    assert_eq!(stats.orders_placed, 1);
    assert_eq!(stats.orders_filled, 1);
    assert_eq!(stats.take_profit_hits, 1);
    assert_eq!(stats.wins, 1);
    assert_eq!(stats.losses, 0);
    assert_eq!(stats.realized_pnl, d("200"));
}

#[tokio::test]
async fn test_quiet_tick_only_updates_prices() {
    let mut terminal = terminal_with(Arc::new(MemoryStore::new())).await;
    terminal.place_order(&btc_long()).await.unwrap();

    let outcome = terminal.on_prices(btc_at("43260.50")).await;

    assert!(outcome.is_empty());
    assert_eq!(terminal.prices().get("BTC/USDT"), Some(d("43260.50")));
    assert_eq!(terminal.equity(), d("10020"));
}

#[tokio::test]
async fn test_close_position_uses_latest_price() {
    let mut terminal = terminal_with(Arc::new(MemoryStore::new())).await;
    let position = match terminal.place_order(&btc_long()).await.unwrap() {
        Placement::Filled(position) => position,
        Placement::Pending(_) => panic!("market order should fill"),
    };
    terminal.on_prices(btc_at("43230.50")).await;

    let trade = terminal.close_position(&position.id).await.unwrap();

    assert_eq!(trade.reason, CloseReason::Manual);
    assert_eq!(trade.exit_price, d("43230.50"));
    assert_eq!(trade.pnl, d("-40"));
    assert_eq!(terminal.account().balance(), d("9960"));
    assert_eq!(terminal.stats().manual_closes, 1);
    assert_eq!(terminal.stats().losses, 1);
    assert_eq!(terminal.stats().wins, 0);

    assert!(terminal.close_position(&position.id).await.is_none());
    assert_eq!(terminal.stats().manual_closes, 1);
}

#[tokio::test]
async fn test_cancelled_order_is_not_filled_by_later_tick() {
    let mut terminal = terminal_with(Arc::new(MemoryStore::new())).await;
    let order = match terminal.place_order(&btc_limit_long()).await.unwrap() {
        Placement::Pending(order) => order,
        Placement::Filled(_) => panic!("limit order should wait"),
    };

    assert!(terminal.cancel_order(&order.id).await.is_some());
    assert!(terminal.cancel_order(&order.id).await.is_none());
    let outcome = terminal.on_prices(btc_at("42990")).await;

    assert!(outcome.is_empty());
    assert!(terminal.account().positions().is_empty());
    assert_eq!(terminal.stats().orders_cancelled, 1);
}

#[tokio::test]
async fn test_rejection_is_counted_and_not_saved() {
    let store = Arc::new(MemoryStore::new());
    let mut terminal = terminal_with(store.clone()).await;
    let request = OrderRequest::market("BTC/USDT", OrderSide::Buy, d("43200.50"), d("43350.50"), d("6"));

    let err = terminal.place_order(&request).await.unwrap_err();

    assert!(matches!(err, OrderRejection::RiskTooHigh { .. }));
    assert_eq!(terminal.stats().orders_rejected, 1);
    assert_eq!(terminal.stats().orders_placed, 0);
    assert!(store.get(DEFAULT_NAMESPACE).await.unwrap().is_none());
}

#[tokio::test]
async fn test_state_survives_restart() {
    let store = Arc::new(MemoryStore::new());
    let mut terminal = terminal_with(store.clone()).await;
    terminal.place_order(&btc_long()).await.unwrap();
    terminal.place_order(&btc_limit_long()).await.unwrap();
    let before = terminal.account().clone();

    let restarted = terminal_with(store).await;

    assert_eq!(restarted.account(), &before);
    assert_eq!(restarted.account().positions().len(), 1);
    assert_eq!(restarted.account().orders().len(), 1);
}

#[tokio::test]
async fn test_reset_clears_account_and_record() {
    let store = Arc::new(MemoryStore::new());
    let mut terminal = terminal_with(store.clone()).await;
    terminal.place_order(&btc_long()).await.unwrap();
    terminal.on_prices(btc_at("43350.50")).await;
    assert!(store.get(DEFAULT_NAMESPACE).await.unwrap().is_some());

    terminal.reset().await;

    assert_eq!(terminal.account().balance(), d("10000"));
    assert!(terminal.account().history().is_empty());
    assert_eq!(terminal.stats().resets, 1);
    assert!(store.get(DEFAULT_NAMESPACE).await.unwrap().is_none());
}

// ==================== Handle and loop ====================

#[tokio::test]
async fn test_handle_places_and_reads_summary() {
    let terminal = terminal_with(Arc::new(MemoryStore::new())).await;
    let (_tx, rx) = broadcast::channel(8);
    let (handle, task) = terminal.spawn(rx);

    let placement = handle.place_order(btc_long()).await.unwrap();
    assert!(matches!(placement, Placement::Filled(_)));

    let summary = handle.summary().await.unwrap();
    assert_eq!(summary.balance, d("10000"));
    assert_eq!(summary.positions.len(), 1);
    assert_eq!(summary.positions[0].pnl, d("0"));

    let stats = handle.stats().await.unwrap();
    assert_eq!(stats.orders_placed, 1);

    handle.shutdown().await;
    let terminal = task.await.unwrap();
    assert_eq!(terminal.account().positions().len(), 1);
}

#[tokio::test]
async fn test_handle_surfaces_rejection() {
    let terminal = terminal_with(Arc::new(MemoryStore::new())).await;
    let (_tx, rx) = broadcast::channel(8);
    let (handle, task) = terminal.spawn(rx);

    let request = OrderRequest::market("GER40", OrderSide::Buy, d("16800"), d("17000"), d("1"));
    let err = handle.place_order(request).await.unwrap_err();

    assert!(matches!(
        err,
        TerminalError::Rejected(OrderRejection::InstrumentDisabled(_))
    ));

    handle.shutdown().await;
    task.await.unwrap();
}

#[tokio::test]
async fn test_loop_applies_ticks_until_feed_closes() {
    let terminal = terminal_with(Arc::new(MemoryStore::new())).await;
    let (tx, rx) = broadcast::channel(8);
    let (handle, task) = terminal.spawn(rx);

    let order = match handle.place_order(btc_limit_long()).await.unwrap() {
        Placement::Pending(order) => order,
        Placement::Filled(_) => panic!("limit order should wait"),
    };
    handle.place_order(btc_long()).await.unwrap();
    assert!(handle.cancel_order(order.id.clone()).await.unwrap().is_some());

    tx.send(btc_at("42990")).unwrap();
    tx.send(btc_at("43350.50")).unwrap();
    drop(tx);

    let terminal = task.await.unwrap();

    assert_eq!(terminal.stats().ticks, 2);
    assert!(terminal.account().positions().is_empty());
    assert!(terminal.account().orders().is_empty());
    assert_eq!(terminal.account().history().len(), 1);
    assert_eq!(terminal.account().history()[0].reason, CloseReason::StopLoss);

    assert!(matches!(handle.summary().await, Err(TerminalError::Stopped)));
}

// ==================== Queued commands ====================

async fn pending_limit(terminal: &mut Terminal) -> Order {
    match terminal.place_order(&btc_limit_long()).await.unwrap() {
        Placement::Pending(order) => order,
        Placement::Filled(_) => panic!("limit order should wait"),
    }
}

#[tokio::test]
async fn test_drain_applies_queued_cancel_before_tick() {
    let mut terminal = terminal_with(Arc::new(MemoryStore::new())).await;
    let order = pending_limit(&mut terminal).await;
    let (tx, mut rx) = mpsc::channel(4);
    let (reply, cancelled) = oneshot::channel();
    tx.send(Command::CancelOrder { id: order.id.clone(), reply })
        .await
        .unwrap();

    assert!(terminal.drain(&mut rx).await);
    let outcome = terminal.on_prices(btc_at("42990")).await;

    assert!(cancelled.await.unwrap().is_some());
    assert!(outcome.fills.is_empty());
    assert!(terminal.account().positions().is_empty());
    assert!(terminal.account().orders().is_empty());
}

#[tokio::test]
async fn test_drain_stops_at_shutdown() {
    let mut terminal = terminal_with(Arc::new(MemoryStore::new())).await;
    let (tx, mut rx) = mpsc::channel(4);
    let (reply, _reset_done) = oneshot::channel();
    tx.send(Command::Shutdown).await.unwrap();
    tx.send(Command::Reset { reply }).await.unwrap();

    assert!(!terminal.drain(&mut rx).await);

    assert_eq!(terminal.stats().resets, 0);
    assert!(rx.try_recv().is_ok());
}

#[tokio::test]
async fn test_loop_applies_cancel_queued_alongside_crossing_tick() {
    let mut terminal = terminal_with(Arc::new(MemoryStore::new())).await;
    let order = pending_limit(&mut terminal).await;

    let (prices_tx, prices_rx) = broadcast::channel(8);
    let (commands_tx, commands_rx) = mpsc::channel(4);
    let (reply, cancelled) = oneshot::channel();

    prices_tx.send(btc_at("42990")).unwrap();
    commands_tx
        .send(Command::CancelOrder { id: order.id.clone(), reply })
        .await
        .unwrap();
    drop(prices_tx);

    let terminal = tokio::spawn(terminal.run(prices_rx, commands_rx))
        .await
        .unwrap();

    assert!(cancelled.await.unwrap().is_some());
    assert_eq!(terminal.stats().ticks, 1);
    assert_eq!(terminal.stats().orders_cancelled, 1);
    assert!(terminal.account().positions().is_empty());
    drop(commands_tx);
}
