use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

/// Decimal places of the currency's minor unit.
pub const CENT_SCALE: u32 = 2;

/// Decimal places a quoted annual rate is rounded to before accrual.
pub const RATE_SCALE: u32 = 6;

/// Cent-rounding policy. Payments and interest use different policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundingMode {
    /// Ceiling: any fraction of a cent rounds towards positive infinity.
    RoundUp,
    /// Nearest cent, an exact half cent rounds away from zero.
    RoundHalfUp,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::RoundUp => RoundingStrategy::ToPositiveInfinity,
            RoundingMode::RoundHalfUp => RoundingStrategy::MidpointAwayFromZero,
        }
    }
}

/// Round an amount to whole cents. The result always carries a scale of two
/// so that serialised rows read `10.00`, not `10`.
pub fn round_to_cents(amount: Money, mode: RoundingMode) -> Money {
    let mut rounded = amount.round_dp_with_strategy(CENT_SCALE, mode.strategy());
    rounded.rescale(CENT_SCALE);
    rounded
}

/// Quote an annual rate to six decimal places (banker's rounding).
pub fn round_rate(rate: Rate) -> Rate {
    rate.round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Zero with cent scale.
pub fn zero_cents() -> Money {
    Decimal::new(0, CENT_SCALE)
}
