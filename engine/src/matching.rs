//! Registration and matching (spec §4.2): what happens to the book and
//! what gets emitted, once a request has passed [`crate::validate::validate`].

use crate::sink::EventSink;
use crate::symbol::{MarketContext, SymbolDirectory};
use crate::wire::{LedgerEntry, OrderNotification, UpdateDepth};
use orderbook::{MarketOrderType, Order, OrderBook, OrderStatus, OrderType, Side};

fn notify(sink: &dyn EventSink, order: &Order, status: OrderStatus, filled_quantity: i64, resting_quantity: i64) {
    sink.emit_notification(OrderNotification {
        timestamp: order.timestamp_ms,
        symbol: order.symbol.clone(),
        order_id: order.order_id.clone(),
        user_id: order.user_id,
        status,
        price: order.price,
        quantity: resting_quantity,
        filled_quantity,
    });
}

fn depth(sink: &dyn EventSink, symbol: &str, side: Side, price: i64, quantity: i64, timestamp_ms: i64) {
    sink.emit_depth(UpdateDepth { timestamp: timestamp_ms, symbol: symbol.to_string(), side, price, quantity });
}

/// Resolves "current price" per spec §4.2: last trade in today's buffer,
/// else the IPO/listing price. ("Yesterday's close" is an open question
/// left unimplemented — see DESIGN.md.)
fn current_price(symbol: &str, symbols: &dyn SymbolDirectory, market: &dyn MarketContext) -> Option<i64> {
    market.last_trade_price(symbol).or_else(|| symbols.ipo_price(symbol))
}

/// Drains resting quantity from `side`/`price`'s FIFO into the taker until
/// either the taker's remaining quantity reaches zero or the level
/// exhausts. Returns the quantity actually filled at this price.
#[allow(clippy::too_many_arguments)]
fn fill_at_price(
    book: &mut OrderBook,
    side: Side,
    price: i64,
    taker: &Order,
    taker_remaining: &mut i64,
    taker_filled_so_far: &mut i64,
    sink: &dyn EventSink,
    market: &dyn MarketContext,
) {
    while *taker_remaining > 0 {
        let Some(maker_id) = book.front_order(side, price) else { break };
        let Some(maker) = book.resting(side, &maker_id, price) else { break };
        let fill_qty = (*taker_remaining).min(maker.quantity);

        let outcome = book.fill_maker(side, &maker_id, price, fill_qty);
        *taker_remaining -= fill_qty;
        *taker_filled_so_far += fill_qty;

        let (buy_order_id, sell_order_id) = match taker.side {
            Side::Buy => (taker.order_id.clone(), maker_id.clone()),
            Side::Sell => (maker_id.clone(), taker.order_id.clone()),
        };

        let taker_status =
            if *taker_remaining <= 0 { OrderStatus::Filled } else { OrderStatus::PartiallyFilled };
        notify(sink, taker, taker_status, *taker_filled_so_far, (*taker_remaining).max(0));

        let (maker_status, maker_resting_quantity) = match outcome {
            orderbook::FillOutcome::FullyConsumed { .. } => (OrderStatus::Filled, 0),
            orderbook::FillOutcome::PartiallyConsumed { remaining, .. } => {
                (OrderStatus::PartiallyFilled, remaining)
            }
        };
        let maker_order = Order {
            order_id: maker_id.clone(),
            user_id: maker.user_id,
            symbol: taker.symbol.clone(),
            side,
            order_type: OrderType::Limit,
            price,
            quantity: fill_qty,
            status: maker_status,
            slippage: None,
            market_order_type: None,
            timestamp_ms: taker.timestamp_ms,
        };
        notify(sink, &maker_order, maker_status, fill_qty, maker_resting_quantity);

        depth(sink, &taker.symbol, side, price, book.total_at(side, price), taker.timestamp_ms);

        sink.emit_trade(LedgerEntry::from(&orderbook::Trade {
            timestamp_ms: taker.timestamp_ms,
            symbol: taker.symbol.clone(),
            price,
            volume: fill_qty,
            aggressor_side: taker.side,
            execution_id: uuid::Uuid::new_v4().to_string(),
            buy_order_id,
            sell_order_id,
            session_conditions: market.session_conditions(),
        }));
    }
}

/// Registers the validated order (spec's registration phase) and, unless
/// it was a cancel, runs the matching phase against the book.
pub fn register_and_match(
    order: Order,
    book: &mut OrderBook,
    symbols: &dyn SymbolDirectory,
    market: &dyn MarketContext,
    sink: &dyn EventSink,
) {
    // Market orders never rest: registering one in the book only to remove
    // it again a few lines later (in `match_market`'s terminal `cancel`)
    // would leave a phantom price-0 level visible to anyone reading the
    // book between registration and matching. They're threaded straight
    // through to the matching phase instead; a market order being
    // "modified" (type changed from a prior resting limit order, per the
    // open question in spec §9) still needs its old resting entry cleared.
    match (order.status, order.order_type) {
        (OrderStatus::Canceled, _) | (OrderStatus::Modified, OrderType::Market) => {
            book.cancel(&order.order_id);
        }
        (OrderStatus::Modified, OrderType::Limit) => book.modify(&order),
        (OrderStatus::Open, OrderType::Limit) => book.open(&order),
        _ => {}
    }

    // Spec §4.2: "Immediately after registration, if the order is a limit
    // order the engine emits a depth update ... and an order notification
    // to the submitting user" — this applies to open, modify, and cancel
    // alike, per the registration handler's uniform emission in
    // processOrders.go.
    if let OrderType::Limit = order.order_type {
        depth(sink, &order.symbol, order.side, order.price, book.total_at(order.side, order.price), order.timestamp_ms);
        let resting_quantity = if order.status == OrderStatus::Canceled { 0 } else { order.quantity };
        notify(sink, &order, order.status, 0, resting_quantity);
    }

    if let OrderStatus::Canceled = order.status {
        return;
    }

    match order.order_type {
        OrderType::Market => match_market(order, book, symbols, market, sink),
        OrderType::Limit => match_limit(order, book, sink, market),
    }
}

fn match_market(
    order: Order,
    book: &mut OrderBook,
    symbols: &dyn SymbolDirectory,
    market: &dyn MarketContext,
    sink: &dyn EventSink,
) {
    let opposite = order.side.opposite();

    if book.side(opposite).is_empty() {
        book.cancel(&order.order_id);
        notify(sink, &order, OrderStatus::Canceled, 0, 0);
        return;
    }

    if let Some(MarketOrderType::FOK) = order.market_order_type {
        if book.total_depth(opposite) < order.quantity {
            book.cancel(&order.order_id);
            notify(sink, &order, OrderStatus::Canceled, 0, 0);
            return;
        }
    }

    if let Some(slippage) = order.slippage {
        if let Some(price) = current_price(&order.symbol, symbols, market) {
            if slippage.violates(order.side, price) {
                book.cancel(&order.order_id);
                notify(sink, &order, OrderStatus::Canceled, 0, 0);
                return;
            }
        }
    }

    let mut remaining = order.quantity;
    let mut filled = 0i64;
    for price in book.side(opposite).levels_best_first(usize::MAX).into_iter().map(|(p, _)| p) {
        if remaining <= 0 {
            break;
        }
        fill_at_price(book, opposite, price, &order, &mut remaining, &mut filled, sink, market);
    }

    book.cancel(&order.order_id);
    if remaining > 0 {
        notify(sink, &order, OrderStatus::Canceled, filled, remaining);
    }
}

fn match_limit(order: Order, book: &mut OrderBook, sink: &dyn EventSink, market: &dyn MarketContext) {
    let opposite = order.side.opposite();
    let limit = order.price;

    let crosses = match order.side {
        Side::Buy => book.best_ask().is_some_and(|ask| ask <= limit),
        Side::Sell => book.best_bid().is_some_and(|bid| bid >= limit),
    };
    if !crosses {
        return;
    }

    let mut remaining = order.quantity;
    let mut filled = 0i64;

    for price in book.side(opposite).prices_better_than(limit) {
        if remaining <= 0 {
            break;
        }
        fill_at_price(book, opposite, price, &order, &mut remaining, &mut filled, sink, market);
    }

    if remaining > 0 && book.side(opposite).has_price(limit) {
        fill_at_price(book, opposite, limit, &order, &mut remaining, &mut filled, sink, market);
    }

    if remaining <= 0 {
        book.cancel(&order.order_id);
    } else if remaining < order.quantity {
        let mut resting = order.clone();
        resting.quantity = remaining;
        resting.status = OrderStatus::Modified;
        book.modify(&resting);
    }

    depth(sink, &order.symbol, order.side, limit, book.total_at(order.side, limit), order.timestamp_ms);
}
