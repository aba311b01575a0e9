use orderbook::OrderId;
use thiserror::Error;

/// The validation taxonomy of spec §7, one variant per rejection reason.
/// Every variant carries an HTTP-style code via [`EngineError::code`].
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("order {0} not found")]
    OrderNotFound(OrderId),
    #[error("order {0} is not owned by the requester")]
    NotOwner(OrderId),
    #[error("order_type must be limit or market")]
    InvalidOrderType,
    #[error("price must be positive")]
    InvalidPrice,
    #[error("price {price} is not a multiple of tick size {tick_size} for {symbol}")]
    InvalidTick { symbol: String, price: i64, tick_size: i64 },
    #[error("quantity must be positive")]
    InvalidQuantity,
    #[error("modify would apply no changes")]
    NoChanges,
    #[error("symbol {0} is not tradable")]
    SymbolNotTradable(String),
    #[error("unknown symbol {0}")]
    UnknownSymbol(String),
    #[error("engine request queue is saturated")]
    Saturated,
}

impl EngineError {
    pub fn code(&self) -> u16 {
        match self {
            EngineError::Saturated => 503,
            _ => 400,
        }
    }
}
