//! Stable wire shapes for the engine boundary (spec §6). These are kept
//! distinct from the internal [`orderbook`] types so that a rename of an
//! internal field never ripples into a published JSON shape.

use orderbook::{MarketOrderType, OrderId, OrderType, Side, Slippage};
use serde::{Deserialize, Serialize};

/// What a client actually sends in the body of an order submission. Fields
/// the server derives from the route or the caller's identity (`user_id`,
/// `symbol`, `side`, `status`, `timestamp`) are deliberately absent here —
/// spec §6 marks them as ignored on input.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OrderRequestWire {
    pub order_id: Option<OrderId>,
    /// `None` on a modify/cancel means "retain the previous type".
    pub order_type: Option<OrderType>,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub quantity: i64,
    pub slippage: Option<Slippage>,
    pub market_order_type: Option<MarketOrderType>,
}

/// Synchronous acknowledgment delivered over the request's result channel.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WireResult {
    pub timestamp: i64,
    pub success: bool,
    pub message: String,
    pub code: u16,
}

impl WireResult {
    pub fn ok(timestamp: i64) -> Self {
        Self { timestamp, success: true, message: "accepted".to_string(), code: 200 }
    }

    pub fn rejected(timestamp: i64, message: impl Into<String>, code: u16) -> Self {
        Self { timestamp, success: false, message: message.into(), code }
    }
}

/// A change in resting quantity at one price level on one side.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateDepth {
    pub timestamp: i64,
    pub symbol: String,
    pub side: Side,
    pub price: i64,
    pub quantity: i64,
}

/// The wire shape of an executed trade, field-named per spec §6 (`side`,
/// `conditions`) rather than the internal [`orderbook::Trade`]'s
/// `aggressor_side`/`session_conditions`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub timestamp: i64,
    pub symbol: String,
    pub price: i64,
    pub volume: i64,
    pub side: Side,
    pub execution_id: String,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub conditions: String,
}

impl From<&orderbook::Trade> for LedgerEntry {
    fn from(t: &orderbook::Trade) -> Self {
        Self {
            timestamp: t.timestamp_ms,
            symbol: t.symbol.clone(),
            price: t.price,
            volume: t.volume,
            side: t.aggressor_side,
            execution_id: t.execution_id.clone(),
            buy_order_id: t.buy_order_id.clone(),
            sell_order_id: t.sell_order_id.clone(),
            conditions: t.session_conditions.clone(),
        }
    }
}

/// A per-participant status push for one of their own orders.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderNotification {
    pub timestamp: i64,
    pub symbol: String,
    pub order_id: OrderId,
    pub user_id: i64,
    pub status: orderbook::OrderStatus,
    pub price: i64,
    pub quantity: i64,
    pub filled_quantity: i64,
}
