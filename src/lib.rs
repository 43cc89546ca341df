//! Paper trading terminal: a simulated price feed, risk-sized order placement,
//! pending limit orders, stop-loss/take-profit automation and a persisted demo
//! account.

pub mod account;
pub mod book;
pub mod config;
pub mod domain;
pub mod feed;
pub mod ledger;
pub mod storage;
pub mod terminal;
