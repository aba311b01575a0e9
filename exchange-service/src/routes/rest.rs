//! REST handlers: symbol listing/metadata, depth and recent-trade
//! snapshots, and order submission/modify/cancel against the matching
//! engine. Generalizes the reference `main.rs`'s handler set onto the
//! sharded per-symbol engine and the read-side mirrors.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::auth::UserId;
use crate::error::AppError;
use crate::state::AppState;
use crate::wire::{DepthQuery, DepthSnapshot, PriceLevel, RecentTradesQuery, SymbolResponse, SymbolsResponse};
use engine::{Action, OrderRequestWire, SubmitRequest};
use orderbook::{OrderId, Side};

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "exchange-service",
    }))
}

pub async fn list_symbols(State(state): State<AppState>) -> impl IntoResponse {
    Json(SymbolsResponse { symbols: state.symbols.list() })
}

pub async fn get_symbol(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    use engine::SymbolDirectory;
    let symbol_data = state.symbols.symbol(&symbol).ok_or_else(|| AppError::SymbolNotFound(symbol))?;
    Ok(Json(SymbolResponse { symbol: symbol_data }))
}

pub async fn get_depth(
    Path(symbol): Path<String>,
    Query(query): Query<DepthQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let levels = query.levels.unwrap_or(10);
    let (bids, asks) = state.depth_mirror.levels(&symbol, levels);
    Json(DepthSnapshot {
        symbol,
        bids: bids.into_iter().map(|(price, quantity)| PriceLevel { price, quantity }).collect(),
        asks: asks.into_iter().map(|(price, quantity)| PriceLevel { price, quantity }).collect(),
    })
}

pub async fn get_recent_trades(
    Path(symbol): Path<String>,
    Query(query): Query<RecentTradesQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(50);
    let trades = state.trades.buffer_for(&symbol).latest(limit);
    Json(trades)
}

fn parse_side(raw: &str) -> Result<Side, AppError> {
    match raw {
        "buy" => Ok(Side::Buy),
        "sell" => Ok(Side::Sell),
        other => Err(AppError::InvalidSide(other.to_string())),
    }
}

fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

pub async fn submit_order(
    Path((symbol, side)): Path<(String, String)>,
    UserId(user_id): UserId,
    State(state): State<AppState>,
    Json(wire): Json<OrderRequestWire>,
) -> Result<impl IntoResponse, AppError> {
    let side = parse_side(&side)?;
    let request = SubmitRequest { action: Action::Open, symbol, side, user_id, timestamp_ms: now_millis(), wire };
    let result = state.exchange.submit(request).await?;
    let status = if result.success { StatusCode::CREATED } else { StatusCode::from_u16(result.code).unwrap_or(StatusCode::BAD_REQUEST) };
    Ok((status, Json(result)))
}

pub async fn modify_order(
    Path((symbol, side, order_id)): Path<(String, String, String)>,
    UserId(user_id): UserId,
    State(state): State<AppState>,
    Json(mut wire): Json<OrderRequestWire>,
) -> Result<impl IntoResponse, AppError> {
    let side = parse_side(&side)?;
    wire.order_id = Some(OrderId(order_id));
    let request = SubmitRequest { action: Action::Modified, symbol, side, user_id, timestamp_ms: now_millis(), wire };
    let result = state.exchange.submit(request).await?;
    Ok(Json(result))
}

pub async fn cancel_order(
    Path((symbol, side, order_id)): Path<(String, String, String)>,
    UserId(user_id): UserId,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let side = parse_side(&side)?;
    let wire = OrderRequestWire { order_id: Some(OrderId(order_id)), ..Default::default() };
    let request = SubmitRequest { action: Action::Canceled, symbol, side, user_id, timestamp_ms: now_millis(), wire };
    let result = state.exchange.submit(request).await?;
    Ok(Json(result))
}
