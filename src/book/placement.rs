//! Order ticket validation and risk-based position sizing.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::{Order, OrderRequest, OrderSide, OrderType, PriceSnapshot, generate_id, instrument, now};

/// Reasons an order placement is rejected. Rejections never mutate state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderRejection {
    #[error("invalid symbol: {0}")]
    UnknownInstrument(String),

    #[error("{0} trading coming soon")]
    InstrumentDisabled(String),

    #[error("risk must be positive")]
    NonPositiveRisk,

    #[error("risk cannot exceed {max}% (requested {requested}%)")]
    RiskTooHigh { requested: Decimal, max: Decimal },

    #[error("stop loss and take profit are mandatory")]
    MissingStops,

    #[error("no market price for {0}")]
    NoMarketPrice(String),

    #[error("limit price is required and must be positive")]
    InvalidLimitPrice,

    #[error("stop loss must be {} entry price for {} positions", expected_side(.0, true), position_kind(.0))]
    StopLossWrongSide(OrderSide),

    #[error("take profit must be {} entry price for {} positions", expected_side(.0, false), position_kind(.0))]
    TakeProfitWrongSide(OrderSide),

    #[error("stop loss too close to entry (distance {distance}, min tick {min_tick})")]
    StopTooClose { distance: Decimal, min_tick: Decimal },

    #[error("position size rounds to zero: increase risk % or widen stop loss")]
    ZeroQuantity,
}

fn expected_side(side: &OrderSide, stop_loss: bool) -> &'static str {
    match (*side, stop_loss) {
        (OrderSide::Buy, true) | (OrderSide::Sell, false) => "below",
        (OrderSide::Buy, false) | (OrderSide::Sell, true) => "above",
    }
}

fn position_kind(side: &OrderSide) -> &'static str {
    match *side {
        OrderSide::Buy => "long",
        OrderSide::Sell => "short",
    }
}

/// Limits applied to every placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementLimits {
    /// Maximum risk per trade in percent of balance.
    pub max_risk_percent: Decimal,
}

impl Default for PlacementLimits {
    fn default() -> Self {
        Self {
            max_risk_percent: Decimal::new(5, 0),
        }
    }
}

/// Result of sizing a position against the account balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sizing {
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub risk_amount: Decimal,
    pub quantity: Decimal,
}

/// Validates a request and turns it into a sized [`Order`].
///
/// Checks run in a fixed order and the first failure is returned.
pub fn prepare_order(
    request: &OrderRequest,
    prices: &PriceSnapshot,
    balance: Decimal,
    limits: &PlacementLimits,
) -> Result<Order, OrderRejection> {
    let sizing = size_order(request, prices, balance, limits)?;

    Ok(Order {
        id: generate_id("order"),
        symbol: request.symbol.clone(),
        side: request.side,
        order_type: request.order_type,
        quantity: sizing.quantity,
        entry_price: sizing.entry_price,
        stop_loss: sizing.stop_loss,
        take_profit: sizing.take_profit,
        risk_amount: sizing.risk_amount,
        risk_percent: request.risk_percent,
        created_at: now(),
    })
}

/// Computes entry, risk amount and quantity for a request.
pub fn size_order(
    request: &OrderRequest,
    prices: &PriceSnapshot,
    balance: Decimal,
    limits: &PlacementLimits,
) -> Result<Sizing, OrderRejection> {
    let inst = instrument::find(&request.symbol)
        .ok_or_else(|| OrderRejection::UnknownInstrument(request.symbol.clone()))?;
    if !inst.enabled {
        return Err(OrderRejection::InstrumentDisabled(request.symbol.clone()));
    }

    if request.risk_percent <= Decimal::ZERO {
        return Err(OrderRejection::NonPositiveRisk);
    }
    if request.risk_percent > limits.max_risk_percent {
        return Err(OrderRejection::RiskTooHigh {
            requested: request.risk_percent,
            max: limits.max_risk_percent,
        });
    }

    let (Some(stop_loss), Some(take_profit)) = (request.stop_loss, request.take_profit) else {
        return Err(OrderRejection::MissingStops);
    };

    let entry_price = match request.order_type {
        OrderType::Market => prices
            .get(&request.symbol)
            .ok_or_else(|| OrderRejection::NoMarketPrice(request.symbol.clone()))?,
        OrderType::Limit => match request.limit_price {
            Some(p) if p > Decimal::ZERO => p,
            _ => return Err(OrderRejection::InvalidLimitPrice),
        },
    };

    let (stop_ok, target_ok) = match request.side {
        OrderSide::Buy => (stop_loss < entry_price, take_profit > entry_price),
        OrderSide::Sell => (stop_loss > entry_price, take_profit < entry_price),
    };
    if !stop_ok {
        return Err(OrderRejection::StopLossWrongSide(request.side));
    }
    if !target_ok {
        return Err(OrderRejection::TakeProfitWrongSide(request.side));
    }

    let distance = (entry_price - stop_loss).abs();
    if distance < inst.min_tick {
        return Err(OrderRejection::StopTooClose {
            distance,
            min_tick: inst.min_tick,
        });
    }

    let risk_amount = balance * request.risk_percent / Decimal::ONE_HUNDRED;
    let risk_per_contract = distance * inst.contract_size;
    let mut quantity = risk_amount
        .checked_div(risk_per_contract)
        .map(|q| q.floor())
        .unwrap_or(Decimal::ZERO);
    // Division rounds at 28 digits; never let the rounding push risk over budget.
    while quantity > Decimal::ZERO && quantity * risk_per_contract > risk_amount {
        quantity -= Decimal::ONE;
    }
    if quantity < Decimal::ONE {
        return Err(OrderRejection::ZeroQuantity);
    }

    Ok(Sizing {
        entry_price,
        stop_loss,
        take_profit,
        risk_amount,
        quantity,
    })
}

/// Reward-to-risk ratio `|tp - entry| / |entry - sl|`, if defined.
pub fn risk_reward_ratio(entry: Decimal, stop_loss: Decimal, take_profit: Decimal) -> Option<Decimal> {
    (take_profit - entry)
        .abs()
        .checked_div((entry - stop_loss).abs())
}
