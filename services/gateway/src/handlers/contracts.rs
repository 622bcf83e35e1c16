use axum::{
    extract::{Query, State},
    Json,
};
use types::contract::BinaryContract;
use types::ids::Symbol;

use crate::error::AppError;
use crate::models::{ContractResponse, CreateContractRequest, OwnerQuery};
use crate::state::{now_nanos, AppState};

pub async fn create_contract(
    State(state): State<AppState>,
    Json(payload): Json<CreateContractRequest>,
) -> Result<Json<ContractResponse>, AppError> {
    let symbol = Symbol::try_new(&payload.symbol)
        .ok_or_else(|| AppError::bad_request(format!("invalid symbol: {}", payload.symbol)))?;

    let receipt = state.settlement.create_contract(
        payload.owner,
        symbol,
        payload.direction,
        payload.stake,
        payload.duration_secs,
        now_nanos(),
    )?;

    Ok(Json(ContractResponse {
        contract_id: receipt.contract_id,
        strike_price: receipt.strike_price,
        expiry_at: receipt.expiry_at,
    }))
}

pub async fn list_contracts(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Json<Vec<BinaryContract>> {
    Json(state.settlement.contracts_for(query.owner))
}
