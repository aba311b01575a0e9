//! Performance testing suite for the matching engine.
//!
//! Measures latency and throughput under various scenarios by driving
//! [`engine::validate`] and [`engine::register_and_match`] directly against
//! an in-memory [`orderbook::OrderBook`] — the same single-writer hot path
//! a per-symbol engine task runs, minus the channel and the service around
//! it.

use engine::{Action, MarketContext, OrderRequestWire, RecordingSink, StaticSymbolDirectory, SubmitRequest};
use orderbook::{MarketOrderType, OrderBook, OrderId, OrderType, Side, Symbol, SymbolStatus};
use std::collections::HashSet;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

fn now_ms() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_millis() as i64
}

struct NoPriceMarket;

impl MarketContext for NoPriceMarket {
    fn last_trade_price(&self, _symbol: &str) -> Option<i64> {
        None
    }

    fn session_conditions(&self) -> String {
        "regular".to_string()
    }
}

fn aapl_directory() -> StaticSymbolDirectory {
    let mut dir = StaticSymbolDirectory::new();
    dir.insert(
        Symbol {
            symbol: "AAPL".to_string(),
            tick_size: 1,
            min_order_quantity: 1,
            status: SymbolStatus::Active,
            tags: HashSet::new(),
        },
        Some(100),
    );
    dir
}

fn limit_request(order_id: &str, side: Side, price: i64, qty: i64) -> SubmitRequest {
    SubmitRequest {
        action: Action::Open,
        symbol: "AAPL".to_string(),
        side,
        user_id: 1,
        timestamp_ms: now_ms(),
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

fn market_request(order_id: &str, side: Side, qty: i64) -> SubmitRequest {
    SubmitRequest {
        action: Action::Open,
        symbol: "AAPL".to_string(),
        side,
        user_id: 1,
        timestamp_ms: now_ms(),
        wire: OrderRequestWire {
            order_id: Some(OrderId(order_id.to_string())),
            order_type: Some(OrderType::Market),
            price: 0,
            quantity: qty,
            slippage: None,
            market_order_type: Some(MarketOrderType::IOC),
        },
    }
}

fn cancel_request(order_id: &str, side: Side) -> SubmitRequest {
    SubmitRequest {
        action: Action::Canceled,
        symbol: "AAPL".to_string(),
        side,
        user_id: 1,
        timestamp_ms: now_ms(),
        wire: OrderRequestWire { order_id: Some(OrderId(order_id.to_string())), ..Default::default() },
    }
}

/// Runs one request all the way through the validation + matching pipeline.
fn run_request(
    book: &mut OrderBook,
    dir: &StaticSymbolDirectory,
    market: &NoPriceMarket,
    sink: &RecordingSink,
    req: SubmitRequest,
) {
    match engine::validate(&req, book, dir) {
        Ok(validated) => engine::register_and_match(validated.order, book, dir, market, sink),
        Err(err) => panic!("unexpected validation failure in latency harness: {err}"),
    }
}

fn percentile(sorted_ns: &[u128], pct: f64) -> u128 {
    if sorted_ns.is_empty() {
        return 0;
    }
    let idx = ((sorted_ns.len() as f64 - 1.0) * pct).round() as usize;
    sorted_ns[idx]
}

fn report(label: &str, mut samples_ns: Vec<u128>) {
    samples_ns.sort_unstable();
    let count = samples_ns.len();
    let sum: u128 = samples_ns.iter().sum();
    let mean = sum / count.max(1) as u128;
    println!(
        "  {label}: n={count} mean={mean}ns p50={}ns p99={}ns max={}ns",
        percentile(&samples_ns, 0.50),
        percentile(&samples_ns, 0.99),
        samples_ns.last().copied().unwrap_or(0),
    );
}

/// Runs the full latency suite: market data reads, registration, matching,
/// and cancellation.
pub fn run_latency_tests() {
    println!(" Matching Engine - Latency Tests\n");

    test_market_data_latency();
    test_order_registration_latency();
    test_order_matching_latency();
    test_cancellation_latency();
}

/// Best-bid/best-ask lookup performance with a moderately deep book.
fn test_market_data_latency() {
    println!(" Market Data Latency Test");
    let mut book = OrderBook::new("AAPL");
    let dir = aapl_directory();
    let market = NoPriceMarket;
    let sink = RecordingSink::new();

    for i in 0..100i64 {
        run_request(&mut book, &dir, &market, &sink, limit_request(&format!("ask-{i}"), Side::Sell, 10_000 + i, 100));
        run_request(&mut book, &dir, &market, &sink, limit_request(&format!("bid-{i}"), Side::Buy, 9_999 - i, 100));
    }

    let iterations = 1_000_000;
    let mut samples = Vec::with_capacity(iterations);
    for _ in 0..iterations {
        let start = Instant::now();
        std::hint::black_box(book.best_bid());
        std::hint::black_box(book.best_ask());
        samples.push(start.elapsed().as_nanos());
    }
    report("best_bid + best_ask", samples);
    println!();
}

/// Resting-limit-order registration latency, always appending to a fresh
/// price level so no matching occurs.
fn test_order_registration_latency() {
    println!(" Order Registration Latency Test");
    let mut book = OrderBook::new("AAPL");
    let dir = aapl_directory();
    let market = NoPriceMarket;
    let sink = RecordingSink::new();

    let iterations = 100_000;
    let mut samples = Vec::with_capacity(iterations);
    for i in 0..iterations {
        let req = limit_request(&format!("reg-{i}"), Side::Buy, 1_000 + i as i64, 10);
        let start = Instant::now();
        run_request(&mut book, &dir, &market, &sink, req);
        samples.push(start.elapsed().as_nanos());
    }
    report("registration (non-crossing)", samples);
    println!();
}

/// Latency of a market order that walks and fully consumes one resting
/// maker per iteration.
fn test_order_matching_latency() {
    println!(" Order Matching Latency Test");
    let mut book = OrderBook::new("AAPL");
    let dir = aapl_directory();
    let market = NoPriceMarket;
    let sink = RecordingSink::new();

    let iterations = 50_000;
    for i in 0..iterations {
        run_request(&mut book, &dir, &market, &sink, limit_request(&format!("mk-{i}"), Side::Sell, 100, 10));
    }

    let mut samples = Vec::with_capacity(iterations);
    for i in 0..iterations {
        let req = market_request(&format!("tk-{i}"), Side::Buy, 10);
        let start = Instant::now();
        run_request(&mut book, &dir, &market, &sink, req);
        samples.push(start.elapsed().as_nanos());
    }
    report("market order (full consume)", samples);
    println!();
}

/// Cancellation latency for resting orders at the front of their queue.
fn test_cancellation_latency() {
    println!(" Cancellation Latency Test");
    let mut book = OrderBook::new("AAPL");
    let dir = aapl_directory();
    let market = NoPriceMarket;
    let sink = RecordingSink::new();

    let iterations = 100_000;
    for i in 0..iterations {
        run_request(&mut book, &dir, &market, &sink, limit_request(&format!("c-{i}"), Side::Buy, 500, 5));
    }

    let mut samples = Vec::with_capacity(iterations);
    for i in 0..iterations {
        let req = cancel_request(&format!("c-{i}"), Side::Buy);
        let start = Instant::now();
        run_request(&mut book, &dir, &market, &sink, req);
        samples.push(start.elapsed().as_nanos());
    }
    report("cancellation", samples);
    println!();
}

/// Runs a mixed open/market/cancel workload for a fixed wall-clock
/// duration rather than a fixed iteration count, reporting throughput.
fn run_sustained_throughput(duration: std::time::Duration) {
    let mut book = OrderBook::new("AAPL");
    let dir = aapl_directory();
    let market = NoPriceMarket;
    let sink = RecordingSink::new();

    let start = Instant::now();
    let mut processed: u64 = 0;
    let mut next_id: u64 = 0;
    let mut resting: Vec<(String, Side)> = Vec::new();

    while start.elapsed() < duration {
        match next_id % 4 {
            0 => {
                let id = format!("t-{next_id}");
                run_request(&mut book, &dir, &market, &sink, limit_request(&id, Side::Buy, 9_999 - (next_id % 100) as i64, 100));
                resting.push((id, Side::Buy));
            }
            1 => {
                let id = format!("t-{next_id}");
                run_request(&mut book, &dir, &market, &sink, limit_request(&id, Side::Sell, 10_001 + (next_id % 100) as i64, 100));
                resting.push((id, Side::Sell));
            }
            2 => {
                let id = format!("t-{next_id}");
                run_request(&mut book, &dir, &market, &sink, market_request(&id, Side::Buy, 50));
            }
            _ => {
                if let Some((order_id, side)) = resting.pop() {
                    run_request(&mut book, &dir, &market, &sink, cancel_request(&order_id, side));
                }
            }
        }

        if next_id % 100 == 0 {
            std::hint::black_box(book.best_bid());
            std::hint::black_box(book.best_ask());
        }

        processed += 1;
        next_id += 1;
    }

    let elapsed = start.elapsed();
    let per_sec = processed as f64 / elapsed.as_secs_f64();
    println!("  Duration: {:.1} seconds", elapsed.as_secs_f64());
    println!("  Requests processed: {processed}");
    println!("  Throughput: {per_sec:.0} requests/second");
    println!("  Final book state: bid={:?}, ask={:?}", book.best_bid(), book.best_ask());
}

/// Runs sustained throughput test with mixed workload for 10 seconds.
pub fn run_throughput_test() {
    println!(" Sustained Throughput Test (10 seconds)");
    run_sustained_throughput(std::time::Duration::from_secs(10));
}

/// Runs 1-minute sustained throughput test with mixed workload.
pub fn run_throughput_test_1min() {
    println!(" Sustained Throughput Test (60 seconds)");
    run_sustained_throughput(std::time::Duration::from_secs(60));
}
