//! Matching engine performance lab and scenario demo.
//!
//! Runs the latency/throughput suite against the engine's validation and
//! matching pipeline, then walks through the price-time-priority crossing
//! scenario from the spec's testable properties directly against an
//! in-memory book, mirroring the reference repo's non-workspace root
//! package (`hftx/src/latency_test.rs`).

use engine::{Action, MarketContext, OrderRequestWire, RecordingSink, StaticSymbolDirectory, SubmitRequest};
use orderbook::{OrderBook, OrderId, OrderType, Side, Symbol, SymbolStatus};
use std::collections::HashSet;

mod latency_test;

fn main() {
    println!("=== Matching Engine Performance Lab ===");

    latency_test::run_latency_tests();
    latency_test::run_throughput_test();

    println!("\n=== 1-Minute Sustained Throughput Test ===");
    latency_test::run_throughput_test_1min();

    println!("\n=== Scenario Demo: Simple Cross ===");
    run_basic_demo();
}

struct DemoMarket;

impl MarketContext for DemoMarket {
    fn last_trade_price(&self, _symbol: &str) -> Option<i64> {
        None
    }

    fn session_conditions(&self) -> String {
        "regular".to_string()
    }
}

fn limit_request(order_id: &str, side: Side, price: i64, qty: i64) -> SubmitRequest {
    SubmitRequest {
        action: Action::Open,
        symbol: "AAPL".to_string(),
        side,
        user_id: 1,
        timestamp_ms: 1_000,
        wire: OrderRequestWire {
            order_id: Some(OrderId(order_id.to_string())),
            order_type: Some(OrderType::Limit),
            price,
            quantity: qty,
            slippage: None,
            market_order_type: None,
        },
    }
}

/// Walks through spec §8 scenario 1 ("simple cross") against a bare
/// `OrderBook`, driven through the real validation + matching pipeline.
fn run_basic_demo() {
    let mut book = OrderBook::new("AAPL");
    let mut directory = StaticSymbolDirectory::new();
    directory.insert(
        Symbol {
            symbol: "AAPL".to_string(),
            tick_size: 1,
            min_order_quantity: 1,
            status: SymbolStatus::Active,
            tags: HashSet::new(),
        },
        Some(100),
    );
    let market = DemoMarket;
    let sink = RecordingSink::new();

    let ask = limit_request("S1", Side::Sell, 15000, 100);
    println!("Submitting ask: {} @ {} ticks", ask.wire.quantity, ask.wire.price);
    let validated = engine::validate(&ask, &book, &directory).expect("ask should validate");
    engine::register_and_match(validated.order, &mut book, &directory, &market, &sink);

    let bid = limit_request("B1", Side::Buy, 14950, 50);
    println!("Submitting bid: {} @ {} ticks (no cross)", bid.wire.quantity, bid.wire.price);
    let validated = engine::validate(&bid, &book, &directory).expect("bid should validate");
    engine::register_and_match(validated.order, &mut book, &directory, &market, &sink);

    println!("Best bid: {:?}", book.best_bid());
    println!("Best ask: {:?}", book.best_ask());

    let crossing_bid = limit_request("B2", Side::Buy, 15000, 75);
    println!("Submitting crossing bid: {} @ {} ticks", crossing_bid.wire.quantity, crossing_bid.wire.price);
    let validated = engine::validate(&crossing_bid, &book, &directory).expect("crossing bid should validate");
    engine::register_and_match(validated.order, &mut book, &directory, &market, &sink);

    let trades = sink.trades.lock().unwrap();
    println!("Trades executed: {}", trades.len());
    for trade in trades.iter() {
        println!(
            "  Trade: {} shares @ {} ticks (maker={}, taker={})",
            trade.volume, trade.price, trade.sell_order_id, trade.buy_order_id
        );
    }

    println!("Final best bid: {:?}", book.best_bid());
    println!("Final best ask: {:?}", book.best_ask());
}
