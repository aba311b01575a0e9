//! Narrow interfaces onto data the engine consumes but does not own (spec
//! §1: symbol reference data and IPO pricing live in relational storage
//! that is out of scope here).

use orderbook::Symbol;

/// Read-only access to symbol reference data and listing price.
pub trait SymbolDirectory: Send + Sync {
    fn symbol(&self, symbol: &str) -> Option<Symbol>;
    /// The IPO/listing price, used as the last rung of the "current price"
    /// fallback chain (spec §4.2).
    fn ipo_price(&self, symbol: &str) -> Option<i64>;
}

/// Read-only access to facts the matching path needs but doesn't own: the
/// most recent executed trade price (backed by the today-buffer, C6) and
/// the session code to stamp onto trades (backed by the calendar, C3).
/// Kept as a trait so the engine crate never depends on the hub or
/// calendar crates directly.
pub trait MarketContext: Send + Sync {
    fn last_trade_price(&self, symbol: &str) -> Option<i64>;
    fn session_conditions(&self) -> String;
}

/// A directory entry held purely in memory, for tests and small demos.
pub struct StaticSymbolDirectory {
    symbols: std::collections::HashMap<String, (Symbol, Option<i64>)>,
}

impl StaticSymbolDirectory {
    pub fn new() -> Self {
        Self { symbols: std::collections::HashMap::new() }
    }

    pub fn insert(&mut self, symbol: Symbol, ipo_price: Option<i64>) {
        self.symbols.insert(symbol.symbol.clone(), (symbol, ipo_price));
    }
}

impl Default for StaticSymbolDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolDirectory for StaticSymbolDirectory {
    fn symbol(&self, symbol: &str) -> Option<Symbol> {
        self.symbols.get(symbol).map(|(s, _)| s.clone())
    }

    fn ipo_price(&self, symbol: &str) -> Option<i64> {
        self.symbols.get(symbol).and_then(|(_, p)| *p)
    }
}
