//! Bridges the per-symbol trade buffers (C6) and the session calendar (C3)
//! into the engine's narrow [`engine::MarketContext`] interface, so the
//! engine crate never links against `hub` or `calendar` directly (spec §9's
//! "encapsulate each behind an explicit handle").

use calendar::SessionKind;
use dashmap::DashMap;
use engine::{LedgerEntry, MarketContext};
use hub::ChunkedBuffer;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

fn encode(kind: SessionKind) -> i64 {
    match kind {
        SessionKind::Pre => 0,
        SessionKind::Regular => 1,
        SessionKind::Post => 2,
        SessionKind::Closed => 3,
    }
}

fn decode(code: i64) -> SessionKind {
    match code {
        0 => SessionKind::Pre,
        1 => SessionKind::Regular,
        2 => SessionKind::Post,
        _ => SessionKind::Closed,
    }
}

/// Per-symbol same-day trade history, read by [`MarketContext::last_trade_price`]
/// and by the REST "recent trades" endpoint. One buffer per symbol, created
/// lazily on first trade.
pub struct TradeBuffers {
    buffers: DashMap<String, Arc<ChunkedBuffer<LedgerEntry>>>,
}

impl TradeBuffers {
    pub fn new() -> Self {
        Self { buffers: DashMap::new() }
    }

    pub fn record(&self, trade: LedgerEntry) {
        self.buffer_for(&trade.symbol).append(trade);
    }

    pub fn buffer_for(&self, symbol: &str) -> Arc<ChunkedBuffer<LedgerEntry>> {
        self.buffers
            .entry(symbol.to_string())
            .or_insert_with(|| Arc::new(ChunkedBuffer::new(hub::DEFAULT_CHUNK_SIZE)))
            .clone()
    }
}

impl Default for TradeBuffers {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ExchangeMarketContext {
    trades: Arc<TradeBuffers>,
    calendar: Arc<calendar::Calendar>,
    /// Last successfully loaded session, retained across calendar load
    /// failures so trades keep getting stamped (spec §7: "the engine keeps
    /// the last known session status").
    last_known_session: AtomicI64,
}

impl ExchangeMarketContext {
    pub fn new(trades: Arc<TradeBuffers>, calendar: Arc<calendar::Calendar>) -> Self {
        Self { trades, calendar, last_known_session: AtomicI64::new(encode(SessionKind::Closed)) }
    }
}

impl MarketContext for ExchangeMarketContext {
    fn last_trade_price(&self, symbol: &str) -> Option<i64> {
        self.trades.buffer_for(symbol).most_recent().map(|t| t.price)
    }

    fn session_conditions(&self) -> String {
        match self.calendar.load() {
            Ok(cfg) => {
                let now = chrono::Local::now().naive_local();
                let current = calendar::current_session(&cfg, now);
                self.last_known_session.store(encode(current), Ordering::SeqCst);
                current.to_string()
            }
            Err(err) => {
                tracing::warn!(%err, "calendar load failed, stamping trade with last known session");
                decode(self.last_known_session.load(Ordering::SeqCst)).to_string()
            }
        }
    }
}
