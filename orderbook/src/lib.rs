//! Price-time priority limit order book primitives (C1).
//!
//! This crate owns the book's data structures only: price ladders, the
//! per-order index, and the crossability probe. It deliberately knows
//! nothing about validation, matching policy, or trade emission — those
//! live in the engine crate, which drives an [`OrderBook`] through its
//! public methods.

mod book;
mod price_levels;
mod types;

pub use book::{FillOutcome, OrderBook};
pub use price_levels::{PriceLevels, RestingOrder};
pub use types::{
    MarketOrderType, Order, OrderId, OrderIndexEntry, OrderStatus, OrderType, Side, Slippage,
    Symbol, SymbolStatus, Trade,
};
