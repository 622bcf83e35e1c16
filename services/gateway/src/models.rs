//! Request/response shapes for the HTTP surface
//!
//! Thin JSON mirrors of the engine operations; symbols and pairs arrive as
//! strings and are validated at the handler boundary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::contract::Direction;
use types::ids::{AccountId, ContractId, OrderId};
use types::order::{OrderStatus, OrderType, Side};

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub owner: AccountId,
    pub pair: String,
    pub side: Side,
    pub order_type: OrderType,
    pub limit_price: Option<Decimal>,
    pub trigger_price: Option<Decimal>,
    pub quantity: Decimal,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order_id: OrderId,
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct CancelOrderRequest {
    pub owner: AccountId,
}

#[derive(Debug, Deserialize)]
pub struct CreateContractRequest {
    pub owner: AccountId,
    pub symbol: String,
    pub direction: Direction,
    pub stake: Decimal,
    pub duration_secs: i64,
}

#[derive(Debug, Serialize)]
pub struct ContractResponse {
    pub contract_id: ContractId,
    pub strike_price: Decimal,
    pub expiry_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub owner: AccountId,
}

#[derive(Debug, Deserialize)]
pub struct TradesQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct DepthQuery {
    pub depth: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub owner: AccountId,
    pub asset: String,
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub available: Decimal,
    pub locked: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct PriceUpdateRequest {
    pub price: Decimal,
}

#[derive(Debug, Serialize)]
pub struct PriceResponse {
    pub symbol: String,
    pub price: Option<Decimal>,
}
