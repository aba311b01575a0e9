//! The single-writer matching engine (C2): validation, registration, and
//! price-time-priority matching for limit and market orders, run one
//! symbol-task per symbol (spec §5).

mod error;
mod handle;
mod matching;
mod request;
mod sink;
mod symbol;
mod validate;
mod wire;

pub use error::EngineError;
pub use handle::{spawn_symbol_task, EngineHandle, Exchange, REQUEST_CHANNEL_CAPACITY};
pub use matching::register_and_match;
pub use request::{Action, SubmitRequest};
pub use sink::{EventSink, RecordingSink};
pub use symbol::{MarketContext, StaticSymbolDirectory, SymbolDirectory};
pub use validate::validate;
pub use wire::{LedgerEntry, OrderNotification, OrderRequestWire, UpdateDepth, WireResult};

#[cfg(test)]
mod tests {
    use super::*;
    use orderbook::{MarketOrderType, OrderBook, OrderId, OrderStatus, Side, Slippage, Symbol, SymbolStatus};
    use std::collections::HashSet;

    struct FixedMarket {
        last_trade: Option<i64>,
    }

    impl MarketContext for FixedMarket {
        fn last_trade_price(&self, _symbol: &str) -> Option<i64> {
            self.last_trade
        }

        fn session_conditions(&self) -> String {
            "regular".to_string()
        }
    }

    fn aapl() -> Symbol {
        Symbol {
            symbol: "AAPL".to_string(),
            tick_size: 1,
            min_order_quantity: 1,
            status: SymbolStatus::Active,
            tags: HashSet::new(),
        }
    }

    fn directory() -> StaticSymbolDirectory {
        let mut dir = StaticSymbolDirectory::new();
        dir.insert(aapl(), Some(100));
        dir
    }

    fn submit(symbol: &str, side: Side, order_id: &str, price: i64, qty: i64) -> SubmitRequest {
        SubmitRequest {
            action: Action::Open,
            symbol: symbol.to_string(),
            side,
            user_id: 1,
            timestamp_ms: 0,
            wire: OrderRequestWire {
                order_id: Some(OrderId(order_id.to_string())),
                order_type: Some(orderbook::OrderType::Limit),
                price,
                quantity: qty,
                slippage: None,
                market_order_type: None,
            },
        }
    }

    fn run(book: &mut OrderBook, dir: &StaticSymbolDirectory, market: &FixedMarket, sink: &RecordingSink, req: SubmitRequest) {
        let validated = validate(&req, book, dir).expect("request should validate");
        register_and_match(validated.order, book, dir, market, sink);
    }

    // Scenario 1: simple cross.
    #[test]
    fn scenario_simple_cross() {
        let mut book = OrderBook::new("AAPL");
        let dir = directory();
        let market = FixedMarket { last_trade: None };
        let sink = RecordingSink::new();

        run(&mut book, &dir, &market, &sink, submit("AAPL", Side::Sell, "S1", 100, 10));
        run(&mut book, &dir, &market, &sink, submit("AAPL", Side::Buy, "B1", 100, 4));

        let trades = sink.trades.lock().unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].price, 100);
        assert_eq!(trades[0].volume, 4);
        assert_eq!(trades[0].buy_order_id, OrderId("B1".into()));
        assert_eq!(trades[0].sell_order_id, OrderId("S1".into()));
        assert_eq!(trades[0].side, Side::Buy);

        assert_eq!(book.total_at(Side::Sell, 100), 6);
        assert!(book.best_bid().is_none());
    }

    // Scenario 2: FOK market insufficient liquidity.
    #[test]
    fn scenario_fok_insufficient_liquidity() {
        let mut book = OrderBook::new("AAPL");
        let dir = directory();
        let market = FixedMarket { last_trade: None };
        let sink = RecordingSink::new();

        run(&mut book, &dir, &market, &sink, submit("AAPL", Side::Sell, "A1", 101, 3));
        run(&mut book, &dir, &market, &sink, submit("AAPL", Side::Sell, "A2", 102, 2));

        let req = SubmitRequest {
            action: Action::Open,
            symbol: "AAPL".to_string(),
            side: Side::Buy,
            user_id: 2,
            timestamp_ms: 0,
            wire: OrderRequestWire {
                order_id: Some(OrderId("B".to_string())),
                order_type: Some(orderbook::OrderType::Market),
                price: 0,
                quantity: 10,
                slippage: None,
                market_order_type: Some(MarketOrderType::FOK),
            },
        };
        run(&mut book, &dir, &market, &sink, req);

        assert!(sink.trades.lock().unwrap().is_empty());
        let notes = sink.notifications.lock().unwrap();
        let last = notes.last().unwrap();
        assert_eq!(last.order_id, OrderId("B".into()));
        assert_eq!(last.status, OrderStatus::Canceled);

        assert_eq!(book.total_at(Side::Sell, 101), 3);
        assert_eq!(book.total_at(Side::Sell, 102), 2);
    }

    // Scenario 3: price-time priority.
    #[test]
    fn scenario_price_time_priority() {
        let mut book = OrderBook::new("AAPL");
        let dir = directory();
        let market = FixedMarket { last_trade: None };
        let sink = RecordingSink::new();

        run(&mut book, &dir, &market, &sink, submit("AAPL", Side::Buy, "X", 50, 5));
        run(&mut book, &dir, &market, &sink, submit("AAPL", Side::Buy, "Y", 50, 5));

        let req = SubmitRequest {
            action: Action::Open,
            symbol: "AAPL".to_string(),
            side: Side::Sell,
            user_id: 3,
            timestamp_ms: 0,
            wire: OrderRequestWire {
                order_id: Some(OrderId("M".to_string())),
                order_type: Some(orderbook::OrderType::Market),
                price: 0,
                quantity: 7,
                slippage: None,
                market_order_type: Some(MarketOrderType::IOC),
            },
        };
        run(&mut book, &dir, &market, &sink, req);

        let trades = sink.trades.lock().unwrap();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].volume, 5);
        assert_eq!(trades[0].buy_order_id, OrderId("X".into()));
        assert_eq!(trades[1].volume, 2);
        assert_eq!(trades[1].buy_order_id, OrderId("Y".into()));

        assert_eq!(book.total_at(Side::Buy, 50), 3);
    }

    // Scenario 4: modify preserves priority on shrink, loses it on grow.
    #[test]
    fn scenario_modify_priority() {
        let mut book = OrderBook::new("AAPL");
        let dir = directory();
        let market = FixedMarket { last_trade: None };
        let sink = RecordingSink::new();

        run(&mut book, &dir, &market, &sink, submit("AAPL", Side::Buy, "X", 50, 5));
        run(&mut book, &dir, &market, &sink, submit("AAPL", Side::Buy, "Y", 50, 5));

        let modify_down = SubmitRequest {
            action: Action::Modified,
            symbol: "AAPL".to_string(),
            side: Side::Buy,
            user_id: 1,
            timestamp_ms: 0,
            wire: OrderRequestWire {
                order_id: Some(OrderId("X".to_string())),
                order_type: Some(orderbook::OrderType::Limit),
                price: 50,
                quantity: 3,
                slippage: None,
                market_order_type: None,
            },
        };
        run(&mut book, &dir, &market, &sink, modify_down);
        assert_eq!(book.front_order(Side::Buy, 50), Some(OrderId("X".into())));

        let sell = SubmitRequest {
            action: Action::Open,
            symbol: "AAPL".to_string(),
            side: Side::Sell,
            user_id: 4,
            timestamp_ms: 0,
            wire: OrderRequestWire {
                order_id: Some(OrderId("M1".to_string())),
                order_type: Some(orderbook::OrderType::Market),
                price: 0,
                quantity: 3,
                slippage: None,
                market_order_type: Some(MarketOrderType::IOC),
            },
        };
        run(&mut book, &dir, &market, &sink, sell);
        assert!(!book.contains_order(&OrderId("X".into())));
        assert_eq!(book.total_at(Side::Buy, 50), 5);

        let modify_up = SubmitRequest {
            action: Action::Open,
            symbol: "AAPL".to_string(),
            side: Side::Buy,
            user_id: 1,
            timestamp_ms: 0,
            wire: OrderRequestWire {
                order_id: Some(OrderId("X".to_string())),
                order_type: Some(orderbook::OrderType::Limit),
                price: 50,
                quantity: 5,
                slippage: None,
                market_order_type: None,
            },
        };
        run(&mut book, &dir, &market, &sink, modify_up);
        assert_eq!(book.front_order(Side::Buy, 50), Some(OrderId("Y".into())));

        let sell2 = SubmitRequest {
            action: Action::Open,
            symbol: "AAPL".to_string(),
            side: Side::Sell,
            user_id: 4,
            timestamp_ms: 0,
            wire: OrderRequestWire {
                order_id: Some(OrderId("M2".to_string())),
                order_type: Some(orderbook::OrderType::Market),
                price: 0,
                quantity: 6,
                slippage: None,
                market_order_type: Some(MarketOrderType::IOC),
            },
        };
        run(&mut book, &dir, &market, &sink, sell2);
        assert_eq!(book.total_at(Side::Buy, 50), 4);
        assert!(!book.contains_order(&OrderId("Y".into())));
        assert_eq!(book.total_at(Side::Buy, 50), 4);
    }

    // Boundary: slippage gate with pct = 0 rejects unless price matches exactly.
    #[test]
    fn slippage_zero_percent_exact_match_required() {
        let mut book = OrderBook::new("AAPL");
        let dir = directory();
        let market = FixedMarket { last_trade: Some(100) };
        let sink = RecordingSink::new();

        run(&mut book, &dir, &market, &sink, submit("AAPL", Side::Sell, "A1", 105, 10));

        let buy = SubmitRequest {
            action: Action::Open,
            symbol: "AAPL".to_string(),
            side: Side::Buy,
            user_id: 2,
            timestamp_ms: 0,
            wire: OrderRequestWire {
                order_id: Some(OrderId("B".to_string())),
                order_type: Some(orderbook::OrderType::Market),
                price: 0,
                quantity: 5,
                slippage: Some(Slippage { reference_price: 100, max_percent: 0.0 }),
                market_order_type: Some(MarketOrderType::IOC),
            },
        };
        run(&mut book, &dir, &market, &sink, buy);

        assert!(sink.trades.lock().unwrap().is_empty());
        let notes = sink.notifications.lock().unwrap();
        assert_eq!(notes.last().unwrap().status, OrderStatus::Canceled);
    }

    // Boundary: market order against an empty opposite side is canceled, no trade.
    #[test]
    fn market_order_against_empty_side_is_canceled() {
        let mut book = OrderBook::new("AAPL");
        let dir = directory();
        let market = FixedMarket { last_trade: None };
        let sink = RecordingSink::new();

        let buy = SubmitRequest {
            action: Action::Open,
            symbol: "AAPL".to_string(),
            side: Side::Buy,
            user_id: 2,
            timestamp_ms: 0,
            wire: OrderRequestWire {
                order_id: Some(OrderId("B".to_string())),
                order_type: Some(orderbook::OrderType::Market),
                price: 0,
                quantity: 5,
                slippage: None,
                market_order_type: None,
            },
        };
        run(&mut book, &dir, &market, &sink, buy);

        assert!(sink.trades.lock().unwrap().is_empty());
        assert_eq!(sink.notifications.lock().unwrap().last().unwrap().status, OrderStatus::Canceled);
    }

    // Boundary: a limit buy priced exactly at the lowest ask matches (equality crosses).
    #[test]
    fn limit_equal_to_best_ask_crosses() {
        let mut book = OrderBook::new("AAPL");
        let dir = directory();
        let market = FixedMarket { last_trade: None };
        let sink = RecordingSink::new();

        run(&mut book, &dir, &market, &sink, submit("AAPL", Side::Sell, "S1", 100, 5));
        run(&mut book, &dir, &market, &sink, submit("AAPL", Side::Buy, "B1", 100, 5));

        assert_eq!(sink.trades.lock().unwrap().len(), 1);
        assert!(book.best_ask().is_none());
        assert!(book.best_bid().is_none());
    }

    #[test]
    fn unknown_symbol_is_rejected() {
        let book = OrderBook::new("ZZZZ");
        let dir = directory();
        let req = submit("ZZZZ", Side::Buy, "B1", 100, 5);
        let err = validate(&req, &book, &dir).unwrap_err();
        assert!(matches!(err, EngineError::UnknownSymbol(_)));
    }

    #[test]
    fn cancel_without_ownership_is_rejected() {
        let mut book = OrderBook::new("AAPL");
        let dir = directory();
        let market = FixedMarket { last_trade: None };
        let sink = RecordingSink::new();
        run(&mut book, &dir, &market, &sink, submit("AAPL", Side::Buy, "X", 50, 5));

        let cancel = SubmitRequest {
            action: Action::Canceled,
            symbol: "AAPL".to_string(),
            side: Side::Buy,
            user_id: 999,
            timestamp_ms: 0,
            wire: OrderRequestWire { order_id: Some(OrderId("X".to_string())), ..Default::default() },
        };
        let err = validate(&cancel, &book, &dir).unwrap_err();
        assert!(matches!(err, EngineError::NotOwner(_)));
    }

    #[test]
    fn price_not_a_multiple_of_tick_size_is_rejected() {
        let book = OrderBook::new("NVDA");
        let mut dir = StaticSymbolDirectory::new();
        dir.insert(
            Symbol {
                symbol: "NVDA".to_string(),
                tick_size: 5,
                min_order_quantity: 1,
                status: SymbolStatus::Active,
                tags: HashSet::new(),
            },
            Some(500),
        );

        let aligned = submit("NVDA", Side::Buy, "B1", 500, 5);
        assert!(validate(&aligned, &book, &dir).is_ok());

        let misaligned = submit("NVDA", Side::Buy, "B2", 503, 5);
        assert!(matches!(validate(&misaligned, &book, &dir).unwrap_err(), EngineError::InvalidTick { .. }));
    }
}
