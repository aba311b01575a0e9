//! The symbol registry: exchange-service owns this (spec §0 says so
//! explicitly) since relational persistence for symbol reference data is
//! out of scope for the engine itself. Loaded once from a JSON file at
//! startup, the same shape the reference `exchange.rs` pre-populated in
//! code (`AAPL`, `TSLA`, ...), generalized into data.

use orderbook::{Symbol, SymbolStatus};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// One entry in the on-disk symbol registry file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub symbol: String,
    pub tick_size: i64,
    pub min_order_quantity: i64,
    pub status: SymbolStatus,
    #[serde(default)]
    pub tags: HashSet<String>,
    /// Listing/IPO price, the last rung of the "current price" fallback
    /// chain (spec §4.2).
    pub ipo_price: Option<i64>,
}

/// An in-memory directory of tradable symbols, satisfying
/// [`engine::SymbolDirectory`]. Read-only after load: editing the roster is
/// an admin-CRUD concern, out of scope per spec §1.
pub struct SymbolRegistry {
    entries: HashMap<String, SymbolEntry>,
}

impl SymbolRegistry {
    pub fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let entries: Vec<SymbolEntry> = serde_json::from_str(&data)?;
        Ok(Self { entries: entries.into_iter().map(|e| (e.symbol.clone(), e)).collect() })
    }

    /// A handful of active tech symbols, matching the reference
    /// `Exchange::new`'s pre-populated default roster, for demos and tests
    /// where no registry file is supplied.
    pub fn demo_defaults() -> Self {
        let demo = ["AAPL", "TSLA", "MSFT", "NVDA", "GOOGL"];
        let entries = demo
            .into_iter()
            .map(|symbol| {
                (
                    symbol.to_string(),
                    SymbolEntry {
                        symbol: symbol.to_string(),
                        tick_size: 1,
                        min_order_quantity: 1,
                        status: SymbolStatus::Active,
                        tags: HashSet::new(),
                        ipo_price: Some(100),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn list(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.entries.keys().cloned().collect();
        symbols.sort();
        symbols
    }
}

impl engine::SymbolDirectory for SymbolRegistry {
    fn symbol(&self, symbol: &str) -> Option<Symbol> {
        self.entries.get(symbol).map(|e| Symbol {
            symbol: e.symbol.clone(),
            tick_size: e.tick_size,
            min_order_quantity: e.min_order_quantity,
            status: e.status,
            tags: e.tags.clone(),
        })
    }

    fn ipo_price(&self, symbol: &str) -> Option<i64> {
        self.entries.get(symbol).and_then(|e| e.ipo_price)
    }
}
