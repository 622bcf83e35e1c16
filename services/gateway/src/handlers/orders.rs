use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use matching_engine::{BookSnapshot, OrderRequest};
use types::ids::{OrderId, PairId};
use types::order::Order;
use types::trade::Trade;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    CancelOrderRequest, CreateOrderRequest, DepthQuery, OrderResponse, OwnerQuery, TradesQuery,
};
use crate::state::{now_nanos, AppState};

const DEFAULT_TRADE_LIMIT: usize = 100;
const DEFAULT_DEPTH: usize = 20;

pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let pair = PairId::try_new(&payload.pair)
        .ok_or_else(|| AppError::bad_request(format!("invalid pair: {}", payload.pair)))?;

    let outcome = state.matching.place_order(
        OrderRequest {
            owner: payload.owner,
            pair,
            side: payload.side,
            order_type: payload.order_type,
            limit_price: payload.limit_price,
            trigger_price: payload.trigger_price,
            quantity: payload.quantity,
        },
        now_nanos(),
    )?;

    Ok(Json(OrderResponse {
        order_id: outcome.order_id,
        status: outcome.status,
    }))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<CancelOrderRequest>,
) -> Result<StatusCode, AppError> {
    state
        .matching
        .cancel_order(OrderId::from_uuid(order_id), payload.owner, now_nanos())?;
    Ok(StatusCode::OK)
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Json<Vec<Order>> {
    Json(state.matching.orders_for(query.owner))
}

pub async fn list_trades(
    State(state): State<AppState>,
    Path((base, quote)): Path<(String, String)>,
    Query(query): Query<TradesQuery>,
) -> Result<Json<Vec<Trade>>, AppError> {
    let pair = parse_pair(&base, &quote)?;
    let limit = query.limit.unwrap_or(DEFAULT_TRADE_LIMIT);
    Ok(Json(state.matching.trades_for(&pair, limit)))
}

pub async fn book_depth(
    State(state): State<AppState>,
    Path((base, quote)): Path<(String, String)>,
    Query(query): Query<DepthQuery>,
) -> Result<Json<BookSnapshot>, AppError> {
    let pair = parse_pair(&base, &quote)?;
    let depth = query.depth.unwrap_or(DEFAULT_DEPTH);
    Ok(Json(state.matching.book_depth(&pair, depth)))
}

fn parse_pair(base: &str, quote: &str) -> Result<PairId, AppError> {
    PairId::try_new(format!("{base}/{quote}"))
        .ok_or_else(|| AppError::bad_request(format!("invalid pair: {base}/{quote}")))
}
