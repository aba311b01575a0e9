//! REST-only response shapes and the session-status wire wrapper. Order
//! submission/result bodies reuse [`engine::OrderRequestWire`] and
//! [`engine::WireResult`] directly; these are the extra shapes spec §6
//! names (symbol listing, depth snapshot) that sit outside the engine
//! boundary.

use orderbook::Symbol;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct SymbolsResponse {
    pub symbols: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SymbolResponse {
    #[serde(flatten)]
    pub symbol: Symbol,
}

#[derive(Debug, Serialize)]
pub struct PriceLevel {
    pub price: i64,
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct DepthSnapshot {
    pub symbol: String,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

#[derive(Debug, Deserialize)]
pub struct DepthQuery {
    pub levels: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct RecentTradesQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SubscribeQuery {
    pub since: Option<i64>,
    pub user_id: Option<i64>,
}

/// Wraps [`calendar::SessionStatus`] as `{"session": ...}` per spec §6's
/// `SessionStatus: {session}` wire shape; the bare enum would otherwise
/// serialize as a JSON string.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatusMessage {
    pub session: calendar::SessionStatus,
}
