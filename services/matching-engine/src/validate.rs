//! Pre-trade order validation
//!
//! Pure checks over the incoming request. Funds checks happen later at the
//! ledger; this layer only rejects shapes that can never be valid.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::errors::EngineError;
use types::ids::{AccountId, PairId};
use types::numeric::is_positive;
use types::order::{OrderType, Side};

/// An order placement request as it arrives from a caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub owner: AccountId,
    pub pair: PairId,
    pub side: Side,
    pub order_type: OrderType,
    pub limit_price: Option<Decimal>,
    pub trigger_price: Option<Decimal>,
    pub quantity: Decimal,
}

/// Validate an order request's shape.
///
/// Checks performed:
/// 1. Quantity strictly positive
/// 2. Limit and stop-limit orders carry a positive limit price
/// 3. Stop-limit orders carry a positive trigger price
/// 4. Market orders carry neither price
pub fn validate(request: &OrderRequest) -> Result<(), EngineError> {
    if !is_positive(request.quantity) {
        return Err(EngineError::invalid_order("quantity must be positive"));
    }

    match request.order_type {
        OrderType::Limit => {
            match request.limit_price {
                Some(price) if is_positive(price) => {}
                _ => {
                    return Err(EngineError::invalid_order(
                        "limit orders require a positive limit price",
                    ))
                }
            }
            if request.trigger_price.is_some() {
                return Err(EngineError::invalid_order(
                    "limit orders must not carry a trigger price",
                ));
            }
        }
        OrderType::Market => {
            if request.limit_price.is_some() || request.trigger_price.is_some() {
                return Err(EngineError::invalid_order(
                    "market orders must not carry prices",
                ));
            }
        }
        OrderType::StopLimit => {
            match request.limit_price {
                Some(price) if is_positive(price) => {}
                _ => {
                    return Err(EngineError::invalid_order(
                        "stop-limit orders require a positive limit price",
                    ))
                }
            }
            match request.trigger_price {
                Some(price) if is_positive(price) => {}
                _ => {
                    return Err(EngineError::invalid_order(
                        "stop-limit orders require a positive trigger price",
                    ))
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> OrderRequest {
        OrderRequest {
            owner: AccountId::new(),
            pair: PairId::new("BTC/USD"),
            side: Side::BUY,
            order_type: OrderType::Limit,
            limit_price: Some(Decimal::from(50000)),
            trigger_price: None,
            quantity: Decimal::ONE,
        }
    }

    #[test]
    fn test_valid_limit_order() {
        assert!(validate(&base_request()).is_ok());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut request = base_request();
        request.quantity = Decimal::ZERO;
        assert!(matches!(
            validate(&request),
            Err(EngineError::InvalidOrder { .. })
        ));
    }

    #[test]
    fn test_limit_without_price_rejected() {
        let mut request = base_request();
        request.limit_price = None;
        assert!(validate(&request).is_err());

        request.limit_price = Some(Decimal::ZERO);
        assert!(validate(&request).is_err());
    }

    #[test]
    fn test_market_with_price_rejected() {
        let mut request = base_request();
        request.order_type = OrderType::Market;
        assert!(validate(&request).is_err());

        request.limit_price = None;
        assert!(validate(&request).is_ok());
    }

    #[test]
    fn test_stop_limit_requires_both_prices() {
        let mut request = base_request();
        request.order_type = OrderType::StopLimit;
        assert!(validate(&request).is_err());

        request.trigger_price = Some(Decimal::from(49000));
        assert!(validate(&request).is_ok());

        request.limit_price = None;
        assert!(validate(&request).is_err());
    }
}
