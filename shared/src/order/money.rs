//! Money helpers
//!
//! 所有金额统一为 2 位小数，四舍五入 (half away from zero)。

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places stored for every amount
pub const MONEY_SCALE: u32 = 2;

/// Round and rescale an amount to exactly two decimal places
pub fn to_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// `price × quantity`, unrounded; `None` on overflow
pub fn line_total(price: Decimal, quantity: u32) -> Option<Decimal> {
    price.checked_mul(Decimal::from(quantity))
}
