//! Wire-stable order book types: symbols, orders, trades, and the book side enum.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which ladder an order rests on. Buy orders rest on the bid ladder, sell
/// orders on the ask ladder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side that matches against this one.
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Opaque, server-assigned order identifier. Clients echo it back on modify/cancel.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketOrderType {
    IOC,
    FOK,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Open,
    Modified,
    Filled,
    PartiallyFilled,
    Canceled,
}

/// A pre-trade gate for market orders: reject unless the current price is
/// within `max_percent` of `reference_price`. See spec §4.2 / §9 — this gates
/// admission, not individual fills.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Slippage {
    pub reference_price: i64,
    pub max_percent: f64,
}

impl Slippage {
    /// True if `current_price` violates the band for the given aggressor side.
    /// Buys are capped above `reference_price`; sells are floored below it.
    pub fn violates(&self, side: Side, current_price: i64) -> bool {
        let band = self.reference_price as f64 * (self.max_percent / 100.0);
        match side {
            Side::Buy => (current_price as f64) > self.reference_price as f64 + band,
            Side::Sell => (current_price as f64) < self.reference_price as f64 - band,
        }
    }
}

/// A single resting or in-flight order. `price` is in integer ticks; 0 for
/// market orders (per spec §3/§4.2).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: i64,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub price: i64,
    pub quantity: i64,
    pub status: OrderStatus,
    pub slippage: Option<Slippage>,
    pub market_order_type: Option<MarketOrderType>,
    pub timestamp_ms: i64,
}

/// An immutable executed trade. Always quotes the maker's resting price.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub timestamp_ms: i64,
    pub symbol: String,
    pub price: i64,
    pub volume: i64,
    pub aggressor_side: Side,
    pub execution_id: String,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub session_conditions: String,
}

/// The authoritative per-order lookup record; spec §9 names this a "named
/// record" replacing the source's four-element heterogeneous array.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrderIndexEntry {
    pub user_id: i64,
    pub side: Side,
    pub price: i64,
    pub quantity: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolStatus {
    Init,
    Inactive,
    Active,
    Suspended,
    Delisted,
}

/// Symbol reference data: tick size, minimum order quantity, lifecycle
/// status, and an optional tag set (a `cooldown` tag blocks new orders even
/// while `Active`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub symbol: String,
    pub tick_size: i64,
    pub min_order_quantity: i64,
    pub status: SymbolStatus,
    #[serde(default)]
    pub tags: HashSet<String>,
}

impl Symbol {
    /// Whether this symbol currently accepts new orders.
    pub fn accepts_new_orders(&self) -> bool {
        self.status == SymbolStatus::Active && !self.tags.contains("cooldown")
    }

    /// Whether metadata viewing is permitted (active or inactive).
    pub fn viewable(&self) -> bool {
        matches!(self.status, SymbolStatus::Active | SymbolStatus::Inactive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_side_roundtrips() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn slippage_band_buy_side() {
        let s = Slippage { reference_price: 100, max_percent: 1.0 };
        assert!(!s.violates(Side::Buy, 101));
        assert!(s.violates(Side::Buy, 102));
    }

    #[test]
    fn slippage_band_sell_side() {
        let s = Slippage { reference_price: 100, max_percent: 1.0 };
        assert!(!s.violates(Side::Sell, 99));
        assert!(s.violates(Side::Sell, 98));
    }

    #[test]
    fn slippage_zero_percent_requires_exact_match() {
        let s = Slippage { reference_price: 100, max_percent: 0.0 };
        assert!(!s.violates(Side::Buy, 100));
        assert!(s.violates(Side::Buy, 101));
    }

    #[test]
    fn symbol_cooldown_blocks_new_orders() {
        let mut sym = Symbol {
            symbol: "AAPL".into(),
            tick_size: 1,
            min_order_quantity: 1,
            status: SymbolStatus::Active,
            tags: HashSet::new(),
        };
        assert!(sym.accepts_new_orders());
        sym.tags.insert("cooldown".to_string());
        assert!(!sym.accepts_new_orders());
    }

    #[test]
    fn inactive_symbol_is_viewable_but_not_tradable() {
        let sym = Symbol {
            symbol: "AAPL".into(),
            tick_size: 1,
            min_order_quantity: 1,
            status: SymbolStatus::Inactive,
            tags: HashSet::new(),
        };
        assert!(sym.viewable());
        assert!(!sym.accepts_new_orders());
    }
}
