use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use types::ids::{AccountId, Symbol};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{BalanceResponse, TransferRequest};
use crate::state::AppState;

pub async fn get_balance(
    State(state): State<AppState>,
    Path((owner, asset)): Path<(Uuid, String)>,
) -> Result<Json<BalanceResponse>, AppError> {
    let asset = parse_asset(&asset)?;
    let balance = state.ledger.balance(AccountId::from_uuid(owner), &asset);
    Ok(Json(BalanceResponse {
        available: balance.available,
        locked: balance.locked,
    }))
}

pub async fn deposit(
    State(state): State<AppState>,
    Json(payload): Json<TransferRequest>,
) -> Result<StatusCode, AppError> {
    let asset = parse_asset(&payload.asset)?;
    state.ledger.deposit(payload.owner, &asset, payload.amount)?;
    Ok(StatusCode::CREATED)
}

pub async fn request_withdrawal(
    State(state): State<AppState>,
    Json(payload): Json<TransferRequest>,
) -> Result<StatusCode, AppError> {
    let asset = parse_asset(&payload.asset)?;
    state
        .ledger
        .request_withdrawal(payload.owner, &asset, payload.amount)?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn approve_withdrawal(
    State(state): State<AppState>,
    Json(payload): Json<TransferRequest>,
) -> Result<StatusCode, AppError> {
    let asset = parse_asset(&payload.asset)?;
    state
        .ledger
        .approve_withdrawal(payload.owner, &asset, payload.amount)?;
    Ok(StatusCode::OK)
}

pub async fn reject_withdrawal(
    State(state): State<AppState>,
    Json(payload): Json<TransferRequest>,
) -> Result<StatusCode, AppError> {
    let asset = parse_asset(&payload.asset)?;
    state
        .ledger
        .reject_withdrawal(payload.owner, &asset, payload.amount)?;
    Ok(StatusCode::OK)
}

fn parse_asset(asset: &str) -> Result<Symbol, AppError> {
    Symbol::try_new(asset).ok_or_else(|| AppError::bad_request(format!("invalid asset: {asset}")))
}
