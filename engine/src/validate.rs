//! The validation pipeline of spec §4.2, run in order; the first failure
//! aborts with no book mutation.

use crate::error::EngineError;
use crate::request::{Action, SubmitRequest};
use crate::symbol::SymbolDirectory;
use orderbook::{MarketOrderType, Order, OrderBook, OrderId, OrderStatus, OrderType, Slippage};

/// The fully resolved order, ready for the registration phase.
pub struct Validated {
    pub order: Order,
}

/// Infers order type for a modify/cancel whose wire `order_type` was
/// omitted: price 0 means the resting order was a market order (which
/// never rests, so this really only fires for a cancel racing a fill), any
/// other price means limit (spec §4.2 step 2).
fn infer_type_from_price(price: i64) -> OrderType {
    if price == 0 {
        OrderType::Market
    } else {
        OrderType::Limit
    }
}

pub fn validate(
    req: &SubmitRequest,
    book: &OrderBook,
    symbols: &dyn SymbolDirectory,
) -> Result<Validated, EngineError> {
    let symbol = symbols
        .symbol(&req.symbol)
        .ok_or_else(|| EngineError::UnknownSymbol(req.symbol.clone()))?;

    // Step 1: for modify/cancel, the order must exist and belong to the requester.
    let existing = match req.action {
        Action::Modified | Action::Canceled => {
            let order_id = req
                .wire
                .order_id
                .clone()
                .ok_or_else(|| EngineError::OrderNotFound(OrderId(String::new())))?;
            let entry = book
                .order_index_entry(&order_id)
                .ok_or_else(|| EngineError::OrderNotFound(order_id.clone()))?;
            if entry.user_id != req.user_id {
                return Err(EngineError::NotOwner(order_id));
            }
            Some((order_id, entry))
        }
        Action::Open => None,
    };

    // Open orders must land on a tradable symbol; modify/cancel of an
    // already-resting order is always allowed (it can only shrink exposure).
    if matches!(req.action, Action::Open) && !symbol.accepts_new_orders() {
        return Err(EngineError::SymbolNotTradable(req.symbol.clone()));
    }

    // Step 2: order type, with "empty means retain previous" for modify/cancel.
    let order_type = match (req.action, req.wire.order_type) {
        (Action::Open, Some(t)) => t,
        (Action::Open, None) => return Err(EngineError::InvalidOrderType),
        (_, Some(t)) => t,
        (_, None) => {
            let (_, entry) = existing.as_ref().expect("modify/cancel always has existing entry");
            infer_type_from_price(entry.price)
        }
    };

    let (mut price, mut quantity) = (req.wire.price, req.wire.quantity);

    // Step 6: for a cancel, price/quantity are restored from the index —
    // the client's values (if any) are ignored entirely.
    if let Action::Canceled = req.action {
        let (_, entry) = existing.as_ref().unwrap();
        price = entry.price;
        quantity = entry.quantity;
    }

    // Step 3: price must be positive unless market or canceled.
    if !matches!(req.action, Action::Canceled) && !matches!(order_type, OrderType::Market) && price <= 0 {
        return Err(EngineError::InvalidPrice);
    }

    // Step 3a: tick-size validation (supplemental; see SPEC_FULL §3).
    if !matches!(req.action, Action::Canceled)
        && !matches!(order_type, OrderType::Market)
        && price % symbol.tick_size != 0
    {
        return Err(EngineError::InvalidTick {
            symbol: req.symbol.clone(),
            price,
            tick_size: symbol.tick_size,
        });
    }

    // Step 4: quantity must be positive unless canceled.
    if !matches!(req.action, Action::Canceled) && quantity <= 0 {
        return Err(EngineError::InvalidQuantity);
    }

    // Step 5: market orders carry no price.
    if matches!(order_type, OrderType::Market) {
        price = 0;
    }

    // Step 7: a modify that changes nothing is rejected outright.
    if let Action::Modified = req.action {
        let (_, entry) = existing.as_ref().unwrap();
        if price == entry.price && quantity == entry.quantity {
            return Err(EngineError::NoChanges);
        }
    }

    let order_id = match req.action {
        Action::Open => req
            .wire
            .order_id
            .clone()
            .unwrap_or_else(|| OrderId(uuid::Uuid::new_v4().to_string())),
        Action::Modified | Action::Canceled => existing.unwrap().0,
    };

    let status = match req.action {
        Action::Open => OrderStatus::Open,
        Action::Modified => OrderStatus::Modified,
        Action::Canceled => OrderStatus::Canceled,
    };

    let market_order_type: Option<MarketOrderType> =
        if matches!(order_type, OrderType::Market) { req.wire.market_order_type } else { None };
    let slippage: Option<Slippage> =
        if matches!(order_type, OrderType::Market) { req.wire.slippage } else { None };

    Ok(Validated {
        order: Order {
            order_id,
            user_id: req.user_id,
            symbol: req.symbol.clone(),
            side: req.side,
            order_type,
            price,
            quantity,
            status,
            slippage,
            market_order_type,
            timestamp_ms: req.timestamp_ms,
        },
    })
}
