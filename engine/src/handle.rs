//! Per-symbol single-writer tasks (spec §5's sharding option): each symbol
//! gets its own bounded `mpsc` channel and owns its [`OrderBook`] outright,
//! generalizing the reference `exchange-service`'s
//! `DashMap<String, RwLock<OrderBook>>` to `DashMap<String, EngineHandle>`
//! so no lock is ever taken around a book mutation.

use crate::error::EngineError;
use crate::matching::register_and_match;
use crate::request::SubmitRequest;
use crate::sink::EventSink;
use crate::symbol::{MarketContext, SymbolDirectory};
use crate::validate::validate;
use crate::wire::WireResult;
use dashmap::DashMap;
use orderbook::OrderBook;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Reference channel capacity: "on the order of hundreds" per spec §4.2.
pub const REQUEST_CHANNEL_CAPACITY: usize = 256;

struct Envelope {
    request: SubmitRequest,
    ack: oneshot::Sender<WireResult>,
}

/// A live handle to one symbol's single-writer task. Cloning shares the
/// same underlying channel; dropping every clone lets the task's receiver
/// close, ending the task.
#[derive(Clone)]
pub struct EngineHandle {
    sender: mpsc::Sender<Envelope>,
}

impl EngineHandle {
    /// Submits `request`, returning the synchronous acknowledgment once the
    /// task has validated it. Book mutation and matching continue on the
    /// task after the acknowledgment is sent, per spec §4.2.
    pub async fn submit(&self, request: SubmitRequest) -> Result<WireResult, EngineError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.sender
            .try_send(Envelope { request, ack: ack_tx })
            .map_err(|_| EngineError::Saturated)?;
        ack_rx.await.map_err(|_| EngineError::Saturated)
    }
}

/// Spawns the single-writer task for one symbol and returns a handle to it.
pub fn spawn_symbol_task(
    symbol: String,
    symbols: Arc<dyn SymbolDirectory>,
    market: Arc<dyn MarketContext>,
    sink: Arc<dyn EventSink>,
) -> EngineHandle {
    let (tx, mut rx) = mpsc::channel::<Envelope>(REQUEST_CHANNEL_CAPACITY);

    tokio::spawn(async move {
        let mut book = OrderBook::new(symbol);
        while let Some(envelope) = rx.recv().await {
            let Envelope { request, ack } = envelope;
            let timestamp_ms = request.timestamp_ms;
            match validate(&request, &book, symbols.as_ref()) {
                Ok(validated) => {
                    let _ = ack.send(WireResult::ok(timestamp_ms));
                    register_and_match(
                        validated.order,
                        &mut book,
                        symbols.as_ref(),
                        market.as_ref(),
                        sink.as_ref(),
                    );
                }
                Err(err) => {
                    let _ = ack.send(WireResult::rejected(timestamp_ms, err.to_string(), err.code()));
                }
            }
        }
        tracing::info!(symbol = %book.symbol, "engine task shutting down, no more handles");
    });

    EngineHandle { sender: tx }
}

/// The exchange-wide registry of per-symbol engine handles. A symbol is
/// lazily given a task the first time it's referenced.
pub struct Exchange {
    handles: DashMap<String, EngineHandle>,
    symbols: Arc<dyn SymbolDirectory>,
    market: Arc<dyn MarketContext>,
    sink: Arc<dyn EventSink>,
}

impl Exchange {
    pub fn new(symbols: Arc<dyn SymbolDirectory>, market: Arc<dyn MarketContext>, sink: Arc<dyn EventSink>) -> Self {
        Self { handles: DashMap::new(), symbols, market, sink }
    }

    /// Returns the handle for `symbol`, spawning its task on first use.
    pub fn handle_for(&self, symbol: &str) -> EngineHandle {
        if let Some(existing) = self.handles.get(symbol) {
            return existing.clone();
        }
        let handle = spawn_symbol_task(
            symbol.to_string(),
            self.symbols.clone(),
            self.market.clone(),
            self.sink.clone(),
        );
        self.handles.insert(symbol.to_string(), handle.clone());
        handle
    }

    pub async fn submit(&self, request: SubmitRequest) -> Result<WireResult, EngineError> {
        self.handle_for(&request.symbol).submit(request).await
    }
}
