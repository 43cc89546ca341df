//! Domain models for the demo trading terminal.

pub mod instrument;
mod order;
mod position;
mod prices;

pub use instrument::Instrument;
pub use order::{Order, OrderRequest, OrderSide, OrderType};
pub use position::{CloseReason, HistoryTrade, Position};
pub use prices::PriceSnapshot;

use chrono::{DateTime, SubsecRound, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;

/// Current time truncated to the millisecond precision records are stored with.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Generates a record id like `order_1700000000000_k3j9x0a1b`.
pub fn generate_id(prefix: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|b: u8| (b as char).to_ascii_lowercase())
        .collect();
    format!("{}_{}_{}", prefix, now().timestamp_millis(), suffix)
}
