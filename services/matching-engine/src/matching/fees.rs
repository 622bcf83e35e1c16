//! Per-fill fee computation
//!
//! The resting order is the maker, the incoming order is the taker. Each
//! side's fee discounts its own proceeds: the buyer receives base net of
//! fee, the seller receives quote net of fee. Fees round half-up to the
//! receiving asset's display precision, once per fill.

use rust_decimal::Decimal;
use market::PairFees;
use types::numeric::round_half_up;
use types::order::Side;

/// Fees for one fill, in the asset each side receives
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillFees {
    /// Withheld from the seller's quote proceeds
    pub quote_fee: Decimal,
    /// Withheld from the buyer's base proceeds
    pub base_fee: Decimal,
    /// The maker's fee, whichever leg that is (for the trade record)
    pub maker_fee: Decimal,
    /// The taker's fee, whichever leg that is (for the trade record)
    pub taker_fee: Decimal,
}

/// Compute both fees for a fill.
///
/// `taker_side` identifies which role the buyer holds: when the taker
/// bought, the maker sold, and vice versa.
pub fn fill_fees(
    rates: PairFees,
    taker_side: Side,
    price: Decimal,
    quantity: Decimal,
    base_precision: u32,
    quote_precision: u32,
) -> FillFees {
    let notional = price * quantity;

    let (buyer_rate, seller_rate) = match taker_side {
        // Taker bought → seller is the maker
        Side::BUY => (rates.taker_rate, rates.maker_rate),
        // Taker sold → buyer is the maker
        Side::SELL => (rates.maker_rate, rates.taker_rate),
    };

    let base_fee = round_half_up(quantity * buyer_rate, base_precision);
    let quote_fee = round_half_up(notional * seller_rate, quote_precision);

    let (maker_fee, taker_fee) = match taker_side {
        Side::BUY => (quote_fee, base_fee),
        Side::SELL => (base_fee, quote_fee),
    };

    FillFees {
        quote_fee,
        base_fee,
        maker_fee,
        taker_fee,
    }
}
