//! Static instrument metadata for the demo terminal.

use std::sync::LazyLock;

use rust_decimal::Decimal;

/// Volatility used for symbols missing from the table.
pub const DEFAULT_VOLATILITY: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// Contract size used for symbols missing from the table.
pub const DEFAULT_CONTRACT_SIZE: Decimal = Decimal::ONE;

/// Instrument describes a tradable symbol and its fixed contract specification.
#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    /// Symbol in "BASE/QUOTE" or index format (e.g., "BTC/USDT", "GER40").
    pub symbol: &'static str,
    /// Human readable name.
    pub name: &'static str,
    /// Multiplier converting price distance × quantity into account currency.
    pub contract_size: Decimal,
    /// Smallest meaningful price increment.
    pub min_tick: Decimal,
    /// Number of decimals prices are quoted with.
    pub precision: u32,
    /// Maximum relative move per simulated tick (e.g., 0.001 for 0.1%).
    pub volatility: Decimal,
    /// Price the simulated feed starts from.
    pub initial_price: Decimal,
    /// Disabled instruments are quoted but cannot be traded.
    pub enabled: bool,
}

static INSTRUMENTS: LazyLock<Vec<Instrument>> = LazyLock::new(|| {
    vec![
        Instrument {
            symbol: "BTC/USDT",
            name: "Bitcoin",
            contract_size: Decimal::new(1, 3),
            min_tick: Decimal::new(1, 1),
            precision: 2,
            volatility: Decimal::new(1, 3),
            initial_price: Decimal::new(432505, 1),
            enabled: true,
        },
        Instrument {
            symbol: "ETH/USDT",
            name: "Ethereum",
            contract_size: Decimal::new(1, 2),
            min_tick: Decimal::new(1, 2),
            precision: 2,
            volatility: Decimal::new(15, 4),
            initial_price: Decimal::new(258075, 2),
            enabled: true,
        },
        Instrument {
            symbol: "EUR/USD",
            name: "Euro Dollar",
            contract_size: Decimal::new(1000, 0),
            min_tick: Decimal::new(1, 5),
            precision: 5,
            volatility: Decimal::new(5, 4),
            initial_price: Decimal::new(108945, 5),
            enabled: true,
        },
        Instrument {
            symbol: "XAU/USD",
            name: "Gold",
            contract_size: Decimal::ONE,
            min_tick: Decimal::new(1, 2),
            precision: 2,
            volatility: Decimal::new(1, 3),
            initial_price: Decimal::new(202530, 2),
            enabled: true,
        },
        Instrument {
            symbol: "GER40",
            name: "DAX Index",
            contract_size: Decimal::new(1, 1),
            min_tick: Decimal::new(1, 1),
            precision: 1,
            volatility: Decimal::new(8, 4),
            initial_price: Decimal::new(168902, 1),
            enabled: false,
        },
    ]
});

/// Returns the full instrument table, enabled and disabled.
pub fn all() -> &'static [Instrument] {
    &INSTRUMENTS
}

/// Looks up an instrument by symbol.
pub fn find(symbol: &str) -> Option<&'static Instrument> {
    INSTRUMENTS.iter().find(|i| i.symbol == symbol)
}

/// Returns the contract size for a symbol, falling back to 1 for unknown symbols.
pub fn contract_size(symbol: &str) -> Decimal {
    find(symbol)
        .map(|i| i.contract_size)
        .unwrap_or(DEFAULT_CONTRACT_SIZE)
}
