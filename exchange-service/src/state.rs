//! Application state shared across all handlers: the engine registry, the
//! calendar, the four subscriber hubs, and the depth/trade read-side
//! mirrors. Generalizes the reference `AppState`'s
//! `{exchange, trade_broadcaster}` pair to the full fan-out fabric.

use crate::depth_mirror::DepthMirror;
use crate::market::TradeBuffers;
use crate::symbols::SymbolRegistry;
use dashmap::DashMap;
use engine::{LedgerEntry, OrderNotification, UpdateDepth};
use hub::Hub;
use std::sync::Arc;

/// The session hub hands out a single shared identity to every connection,
/// matching `routes/ws/session.go`'s hardcoded `client.ID = 1` — session
/// status is exchange-wide, not per-user, and the hub's single-connection
/// mode means a new viewer evicts the previous one by design.
pub const SESSION_USER_ID: i64 = 1;

#[derive(Clone)]
pub struct AppState {
    pub exchange: Arc<engine::Exchange>,
    pub symbols: Arc<SymbolRegistry>,
    pub calendar: Arc<calendar::Calendar>,
    pub depth_mirror: Arc<DepthMirror>,
    pub trades: Arc<TradeBuffers>,
    pub depth_hubs: Arc<DashMap<String, Arc<Hub<UpdateDepth>>>>,
    pub ledger_hub: Arc<Hub<LedgerEntry>>,
    pub notify_hub: Arc<Hub<OrderNotification>>,
    pub session_hub: Arc<Hub<calendar::SessionStatus>>,
}

impl AppState {
    pub fn depth_hub_for(&self, symbol: &str) -> Arc<Hub<UpdateDepth>> {
        self.depth_hubs.entry(symbol.to_string()).or_insert_with(|| Arc::new(Hub::new(true))).clone()
    }
}
