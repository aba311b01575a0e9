//! One side (bids or asks) of a symbol's order book: a price-indexed ladder
//! of FIFO queues, keyed by an ordered tree for O(log n) best-price lookup
//! and ascending/descending traversal.

use crate::types::{OrderId, Side};
use std::collections::{BTreeMap, HashMap, VecDeque};

/// What the book remembers about a resting order beyond its id and price
/// (the price and side are implied by where the record lives).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RestingOrder {
    pub user_id: i64,
    pub quantity: i64,
}

struct PriceLevel {
    orders: HashMap<OrderId, RestingOrder>,
    queue: VecDeque<OrderId>,
    total_qty: i64,
}

impl PriceLevel {
    fn new() -> Self {
        Self {
            orders: HashMap::new(),
            queue: VecDeque::new(),
            total_qty: 0,
        }
    }
}

/// A single side's price ladder. For asks, "best" is the lowest price; for
/// bids, the highest. Each populated price carries a FIFO queue preserving
/// arrival order (price-time priority, spec §3).
pub struct PriceLevels {
    side: Side,
    levels: BTreeMap<i64, PriceLevel>,
}

impl PriceLevels {
    pub fn new(side: Side) -> Self {
        Self { side, levels: BTreeMap::new() }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn has_price(&self, price: i64) -> bool {
        self.levels.contains_key(&price)
    }

    /// Best price for this side, or `None` if empty.
    pub fn best_price(&self) -> Option<i64> {
        match self.side {
            Side::Sell => self.levels.keys().next().copied(),
            Side::Buy => self.levels.keys().next_back().copied(),
        }
    }

    pub fn total_at(&self, price: i64) -> i64 {
        self.levels.get(&price).map(|l| l.total_qty).unwrap_or(0)
    }

    pub fn order_count_at(&self, price: i64) -> usize {
        self.levels.get(&price).map(|l| l.orders.len()).unwrap_or(0)
    }

    /// Registers a new resting order at `price`, appended to the tail of the
    /// FIFO queue (spec §4.1 `open`).
    pub fn open(&mut self, order_id: OrderId, price: i64, user_id: i64, quantity: i64) {
        let level = self.levels.entry(price).or_insert_with(PriceLevel::new);
        level.orders.insert(order_id.clone(), RestingOrder { user_id, quantity });
        level.queue.push_back(order_id);
        level.total_qty += quantity;
    }

    /// Removes `order_id` from `price` entirely (spec §4.1 `cancel`).
    /// Returns the removed record, or `None` if it wasn't there.
    pub fn cancel(&mut self, order_id: &OrderId, price: i64) -> Option<RestingOrder> {
        let level = self.levels.get_mut(&price)?;
        let removed = level.orders.remove(order_id)?;
        if let Some(pos) = level.queue.iter().position(|id| id == order_id) {
            level.queue.remove(pos);
        }
        level.total_qty -= removed.quantity;
        if level.orders.is_empty() {
            self.levels.remove(&price);
        }
        Some(removed)
    }

    /// Reduces `order_id`'s quantity in place, preserving its FIFO position
    /// (spec §4.1 `modify`, quantity-decrease case). Panics-free: returns
    /// `false` if the order or price wasn't found.
    pub fn set_quantity(&mut self, order_id: &OrderId, price: i64, new_quantity: i64) -> bool {
        let Some(level) = self.levels.get_mut(&price) else { return false };
        let Some(rec) = level.orders.get_mut(order_id) else { return false };
        level.total_qty += new_quantity - rec.quantity;
        rec.quantity = new_quantity;
        true
    }

    /// The order at the front of the FIFO queue at `price`.
    pub fn front_at(&self, price: i64) -> Option<OrderId> {
        self.levels.get(&price).and_then(|l| l.queue.front().cloned())
    }

    pub fn order_at(&self, order_id: &OrderId, price: i64) -> Option<RestingOrder> {
        self.levels.get(&price).and_then(|l| l.orders.get(order_id)).copied()
    }

    /// Prices strictly better than `limit` for an aggressor crossing this
    /// side: ascending asks below `limit` for a buy, descending bids above
    /// `limit` for a sell. Does not include `limit` itself.
    pub fn prices_better_than(&self, limit: i64) -> Vec<i64> {
        match self.side {
            Side::Sell => self.levels.range(..limit).map(|(p, _)| *p).collect(),
            Side::Buy => self.levels.range(limit + 1..).rev().map(|(p, _)| *p).collect(),
        }
    }

    /// All prices on this side in best-first order, ascending for asks,
    /// descending for bids, bounded to `levels`.
    pub fn levels_best_first(&self, levels: usize) -> Vec<(i64, i64)> {
        match self.side {
            Side::Sell => self
                .levels
                .iter()
                .take(levels)
                .map(|(p, l)| (*p, l.total_qty))
                .collect(),
            Side::Buy => self
                .levels
                .iter()
                .rev()
                .take(levels)
                .map(|(p, l)| (*p, l.total_qty))
                .collect(),
        }
    }

    pub fn total_orders(&self) -> usize {
        self.levels.values().map(|l| l.orders.len()).sum()
    }

    pub fn price_count(&self) -> usize {
        self.levels.len()
    }

    #[cfg(test)]
    pub(crate) fn queue_order(&self, price: i64) -> Vec<OrderId> {
        self.levels
            .get(&price)
            .map(|l| l.queue.iter().cloned().collect())
            .unwrap_or_default()
    }
}
