//! Fans emissions from the single-writer engine tasks out to the
//! subscriber hubs (C5) and the per-symbol trade buffer (C6), plus the
//! REST-queryable depth mirror. This is the engine's only outward
//! dependency (spec §9); the engine crate never sees `hub` or
//! `axum` directly.

use crate::depth_mirror::DepthMirror;
use crate::market::TradeBuffers;
use engine::{EventSink, LedgerEntry, OrderNotification, UpdateDepth};
use hub::Hub;
use std::sync::Arc;

pub struct HubSink {
    depth_hubs: Arc<dashmap::DashMap<String, Arc<Hub<UpdateDepth>>>>,
    ledger_hub: Arc<Hub<LedgerEntry>>,
    notify_hub: Arc<Hub<OrderNotification>>,
    depth_mirror: Arc<DepthMirror>,
    trades: Arc<TradeBuffers>,
}

impl HubSink {
    pub fn new(
        depth_hubs: Arc<dashmap::DashMap<String, Arc<Hub<UpdateDepth>>>>,
        ledger_hub: Arc<Hub<LedgerEntry>>,
        notify_hub: Arc<Hub<OrderNotification>>,
        depth_mirror: Arc<DepthMirror>,
        trades: Arc<TradeBuffers>,
    ) -> Self {
        Self { depth_hubs, ledger_hub, notify_hub, depth_mirror, trades }
    }

    fn depth_hub_for(&self, symbol: &str) -> Arc<Hub<UpdateDepth>> {
        self.depth_hubs.entry(symbol.to_string()).or_insert_with(|| Arc::new(Hub::new(true))).clone()
    }
}

impl EventSink for HubSink {
    fn emit_depth(&self, update: UpdateDepth) {
        self.depth_mirror.apply(&update);
        let hub = self.depth_hub_for(&update.symbol);
        hub.broadcast(update.timestamp, update);
    }

    fn emit_trade(&self, trade: LedgerEntry) {
        self.trades.record(trade.clone());
        self.ledger_hub.broadcast(trade.timestamp, trade);
    }

    fn emit_notification(&self, notification: OrderNotification) {
        self.notify_hub.send_to_user(notification.user_id, notification.timestamp, notification);
    }
}
