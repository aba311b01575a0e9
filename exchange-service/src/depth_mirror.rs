//! A read-only mirror of each symbol's depth, maintained purely from the
//! [`engine::UpdateDepth`] events the engine already emits. The sharded
//! single-writer engine (spec §5) gives external readers no safe way to
//! lock a live book directly, so REST snapshot queries are served from this
//! mirror instead — the same information the reference `exchange.rs`'s
//! `get_market_depth` read straight off a shared `RwLock<OrderBook>>`,
//! reconstructed here from the emission stream instead of the book itself.

use dashmap::DashMap;
use engine::UpdateDepth;
use orderbook::Side;
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Default)]
struct Sides {
    bids: BTreeMap<i64, i64>,
    asks: BTreeMap<i64, i64>,
}

pub struct DepthMirror {
    symbols: DashMap<String, RwLock<Sides>>,
}

impl DepthMirror {
    pub fn new() -> Self {
        Self { symbols: DashMap::new() }
    }

    pub fn apply(&self, update: &UpdateDepth) {
        let entry = self.symbols.entry(update.symbol.clone()).or_insert_with(|| RwLock::new(Sides::default()));
        let mut sides = entry.write().unwrap();
        let book = match update.side {
            Side::Buy => &mut sides.bids,
            Side::Sell => &mut sides.asks,
        };
        if update.quantity <= 0 {
            book.remove(&update.price);
        } else {
            book.insert(update.price, update.quantity);
        }
    }

    pub fn best_bid(&self, symbol: &str) -> Option<i64> {
        self.symbols.get(symbol).and_then(|e| e.read().unwrap().bids.keys().next_back().copied())
    }

    pub fn best_ask(&self, symbol: &str) -> Option<i64> {
        self.symbols.get(symbol).and_then(|e| e.read().unwrap().asks.keys().next().copied())
    }

    /// Up to `levels` price levels on each side, best price first.
    pub fn levels(&self, symbol: &str, levels: usize) -> (Vec<(i64, i64)>, Vec<(i64, i64)>) {
        let Some(entry) = self.symbols.get(symbol) else { return (Vec::new(), Vec::new()) };
        let sides = entry.read().unwrap();
        let bids = sides.bids.iter().rev().take(levels).map(|(p, q)| (*p, *q)).collect();
        let asks = sides.asks.iter().take(levels).map(|(p, q)| (*p, *q)).collect();
        (bids, asks)
    }
}

impl Default for DepthMirror {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(symbol: &str, side: Side, price: i64, quantity: i64) -> UpdateDepth {
        UpdateDepth { timestamp: 0, symbol: symbol.to_string(), side, price, quantity }
    }

    #[test]
    fn tracks_best_prices_per_side() {
        let mirror = DepthMirror::new();
        mirror.apply(&update("AAPL", Side::Buy, 99, 10));
        mirror.apply(&update("AAPL", Side::Sell, 101, 5));
        assert_eq!(mirror.best_bid("AAPL"), Some(99));
        assert_eq!(mirror.best_ask("AAPL"), Some(101));
    }

    #[test]
    fn zero_quantity_removes_the_level() {
        let mirror = DepthMirror::new();
        mirror.apply(&update("AAPL", Side::Buy, 99, 10));
        mirror.apply(&update("AAPL", Side::Buy, 99, 0));
        assert_eq!(mirror.best_bid("AAPL"), None);
    }

    #[test]
    fn levels_are_best_first() {
        let mirror = DepthMirror::new();
        for (p, q) in [(98, 1), (99, 2), (100, 3)] {
            mirror.apply(&update("AAPL", Side::Buy, p, q));
        }
        let (bids, _) = mirror.levels("AAPL", 2);
        assert_eq!(bids, vec![(100, 3), (99, 2)]);
    }
}
