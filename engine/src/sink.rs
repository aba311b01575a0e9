//! The engine's only outward-facing dependency: somewhere to put the
//! messages a processed request produces. Kept as a trait so the engine
//! crate never links against the hub or HTTP layers (spec §9: "encapsulate
//! each behind an explicit handle").

use crate::wire::{LedgerEntry, OrderNotification, UpdateDepth};

pub trait EventSink: Send + Sync {
    fn emit_depth(&self, update: UpdateDepth);
    fn emit_trade(&self, trade: LedgerEntry);
    fn emit_notification(&self, notification: OrderNotification);
}

/// An in-memory sink that just remembers everything it was handed, for
/// tests that assert on emission order and content.
#[derive(Default)]
pub struct RecordingSink {
    pub depths: std::sync::Mutex<Vec<UpdateDepth>>,
    pub trades: std::sync::Mutex<Vec<LedgerEntry>>,
    pub notifications: std::sync::Mutex<Vec<OrderNotification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for RecordingSink {
    fn emit_depth(&self, update: UpdateDepth) {
        self.depths.lock().unwrap().push(update);
    }

    fn emit_trade(&self, trade: LedgerEntry) {
        self.trades.lock().unwrap().push(trade);
    }

    fn emit_notification(&self, notification: OrderNotification) {
        self.notifications.lock().unwrap().push(notification);
    }
}
