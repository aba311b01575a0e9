//! The per-symbol order book aggregate (C1): bid/ask ladders, the order
//! index, and the overlap set, exposed as a single owned struct per spec §9
//! ("in the target these are fields of a single `OrderBook` aggregate").

use crate::price_levels::{PriceLevels, RestingOrder};
use crate::types::{Order, OrderId, OrderIndexEntry, Side};
use std::collections::HashSet;

/// Outcome of removing quantity from a resting maker order during matching.
#[derive(Debug, PartialEq)]
pub enum FillOutcome {
    /// The maker had exactly `filled` quantity left; it is now gone.
    FullyConsumed { filled: i64 },
    /// The maker had more than `filled` quantity; `remaining` rests.
    PartiallyConsumed { filled: i64, remaining: i64 },
}

/// Per-symbol limit order book: bid ladder, ask ladder, the authoritative
/// order index, and the bid/ask overlap set used as a crossability probe.
pub struct OrderBook {
    pub symbol: String,
    pub bids: PriceLevels,
    pub asks: PriceLevels,
    order_index: std::collections::HashMap<OrderId, OrderIndexEntry>,
    overlap_set: HashSet<i64>,
}

impl OrderBook {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bids: PriceLevels::new(Side::Buy),
            asks: PriceLevels::new(Side::Sell),
            order_index: std::collections::HashMap::new(),
            overlap_set: HashSet::new(),
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut PriceLevels {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    pub fn side(&self, side: Side) -> &PriceLevels {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    /// Registers `order` as a fresh resting order (spec §4.1 `open`).
    pub fn open(&mut self, order: &Order) {
        let price = order.price;
        self.side_mut(order.side).open(
            order.order_id.clone(),
            price,
            order.user_id,
            order.quantity,
        );
        self.order_index.insert(
            order.order_id.clone(),
            OrderIndexEntry { user_id: order.user_id, side: order.side, price, quantity: order.quantity },
        );
        self.refresh_overlap(price);
    }

    /// Cancels `order_id`, reversing `open` entirely if there were no
    /// intervening fills (spec §8 law). Returns the removed index entry.
    pub fn cancel(&mut self, order_id: &OrderId) -> Option<OrderIndexEntry> {
        let entry = self.order_index.remove(order_id)?;
        self.side_mut(entry.side).cancel(order_id, entry.price);
        self.drop_overlap_if_uncrossed(entry.price);
        Some(entry)
    }

    /// Applies a modification. A strict quantity decrease at the same price
    /// (same side, same type already enforced by the caller) preserves FIFO
    /// position; anything else is cancel-then-open (spec §4.1 `modify`).
    pub fn modify(&mut self, order: &Order) {
        let Some(existing) = self.order_index.get(&order.order_id).copied() else {
            self.open(order);
            return;
        };
        if order.quantity < existing.quantity
            && order.price == existing.price
            && order.side == existing.side
        {
            self.side_mut(order.side).set_quantity(&order.order_id, order.price, order.quantity);
            if let Some(e) = self.order_index.get_mut(&order.order_id) {
                e.quantity = order.quantity;
            }
        } else {
            self.cancel(&order.order_id);
            self.open(order);
        }
    }

    pub fn best_bid(&self) -> Option<i64> {
        self.bids.best_price()
    }

    pub fn best_ask(&self) -> Option<i64> {
        self.asks.best_price()
    }

    pub fn crossable(&self, price: i64) -> bool {
        self.overlap_set.contains(&price)
    }

    pub fn total_at(&self, side: Side, price: i64) -> i64 {
        self.side(side).total_at(price)
    }

    pub fn order_index_entry(&self, order_id: &OrderId) -> Option<OrderIndexEntry> {
        self.order_index.get(order_id).copied()
    }

    pub fn contains_order(&self, order_id: &OrderId) -> bool {
        self.order_index.contains_key(order_id)
    }

    /// Ascending asks from the best outward, optionally bounded below (inclusive).
    pub fn iterate_asks_ascending(&self, from: Option<i64>) -> Vec<i64> {
        self.asks
            .levels_best_first(usize::MAX)
            .into_iter()
            .map(|(p, _)| p)
            .filter(|p| from.map_or(true, |floor| *p >= floor))
            .collect()
    }

    /// Descending bids from the best outward, optionally bounded above (inclusive).
    pub fn iterate_bids_descending(&self, from: Option<i64>) -> Vec<i64> {
        self.bids
            .levels_best_first(usize::MAX)
            .into_iter()
            .map(|(p, _)| p)
            .filter(|p| from.map_or(true, |ceil| *p <= ceil))
            .collect()
    }

    /// The order at the front of the FIFO queue on `side` at `price`.
    pub fn front_order(&self, side: Side, price: i64) -> Option<OrderId> {
        self.side(side).front_at(price)
    }

    pub fn resting(&self, side: Side, order_id: &OrderId, price: i64) -> Option<RestingOrder> {
        self.side(side).order_at(order_id, price)
    }

    /// Fills `fill_qty` off the maker order at `side`/`price` (front of FIFO
    /// expected). Fully consumed makers are canceled; partial fills shrink in
    /// place, preserving the maker's queue position (it already has
    /// priority; a partial fill never re-queues it).
    pub fn fill_maker(&mut self, side: Side, order_id: &OrderId, price: i64, fill_qty: i64) -> FillOutcome {
        let resting = self.side(side).order_at(order_id, price).expect("maker must exist");
        let remaining = resting.quantity - fill_qty;
        if remaining <= 0 {
            self.side_mut(side).cancel(order_id, price);
            self.order_index.remove(order_id);
            self.drop_overlap_if_uncrossed(price);
            FillOutcome::FullyConsumed { filled: fill_qty }
        } else {
            self.side_mut(side).set_quantity(order_id, price, remaining);
            if let Some(e) = self.order_index.get_mut(order_id) {
                e.quantity = remaining;
            }
            FillOutcome::PartiallyConsumed { filled: fill_qty, remaining }
        }
    }

    /// Sums available resting quantity across the whole opposite side;
    /// used for the FOK pre-check (spec §4.2).
    pub fn total_depth(&self, side: Side) -> i64 {
        self.side(side)
            .levels_best_first(usize::MAX)
            .into_iter()
            .map(|(_, q)| q)
            .sum()
    }

    fn refresh_overlap(&mut self, price: i64) {
        if self.bids.has_price(price) && self.asks.has_price(price) {
            self.overlap_set.insert(price);
        }
    }

    fn drop_overlap_if_uncrossed(&mut self, price: i64) {
        if !(self.bids.has_price(price) && self.asks.has_price(price)) {
            self.overlap_set.remove(&price);
        }
    }

    /// Walks the six invariants of spec §3 and returns the first violation
    /// found, if any. Intended for tests only.
    pub fn check_invariants(&self) -> Result<(), String> {
        for (order_id, entry) in &self.order_index {
            let resting = self
                .side(entry.side)
                .order_at(order_id, entry.price)
                .ok_or_else(|| format!("{order_id} in index but missing from {:?} bucket", entry.side))?;
            if resting.quantity != entry.quantity {
                return Err(format!("{order_id} quantity mismatch: index={} bucket={}", entry.quantity, resting.quantity));
            }
        }
        if let (Some(bb), Some(ba)) = (self.best_bid(), self.best_ask()) {
            if bb >= ba {
                return Err(format!("book crossed at rest: best_bid={bb} >= best_ask={ba}"));
            }
        }
        for price in &self.overlap_set {
            if !(self.bids.has_price(*price) && self.asks.has_price(*price)) {
                return Err(format!("overlap_set contains {price} without both sides populated"));
            }
        }
        Ok(())
    }
}
