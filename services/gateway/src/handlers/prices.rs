//! Oracle feed routes
//!
//! The engine consumes prices but never fetches them; the host's market
//! data source pushes updates through these routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use market::PriceOracle;
use types::ids::Symbol;
use types::numeric::is_positive;

use crate::error::AppError;
use crate::models::{PriceResponse, PriceUpdateRequest};
use crate::state::AppState;

pub async fn set_price(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Json(payload): Json<PriceUpdateRequest>,
) -> Result<StatusCode, AppError> {
    let symbol = parse_symbol(&symbol)?;
    if !is_positive(payload.price) {
        return Err(AppError::bad_request("price must be positive"));
    }
    state.oracle.set(symbol, payload.price);
    Ok(StatusCode::OK)
}

pub async fn get_price(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<PriceResponse>, AppError> {
    let parsed = parse_symbol(&symbol)?;
    Ok(Json(PriceResponse {
        symbol: parsed.to_string(),
        price: state.oracle.price(&parsed),
    }))
}

fn parse_symbol(symbol: &str) -> Result<Symbol, AppError> {
    Symbol::try_new(symbol)
        .ok_or_else(|| AppError::bad_request(format!("invalid symbol: {symbol}")))
}
