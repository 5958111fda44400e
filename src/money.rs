use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};

pub const CURRENCY_PREFIX: &str = "Nu.";

/// Number of decimals every amount is kept at.
pub const DECIMAL_PLACES: u32 = 2;

/// Rounds an amount to [`DECIMAL_PLACES`] using round-half-even.
pub fn normalize(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven)
}

/// Display wrapper rendering an amount as `Nu.1234.50`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nu(pub Decimal);

impl fmt::Display for Nu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CURRENCY_PREFIX}{:.2}", normalize(self.0))
    }
}
