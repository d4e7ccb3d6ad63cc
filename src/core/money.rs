use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Number of decimal places balances and settlements are reported with.
pub const SCALE: u32 = 2;

/// Smallest magnitude treated as a real amount (one currency subunit).
///
/// Balances within `[-TOLERANCE, TOLERANCE]` are considered settled.
pub const TOLERANCE: Decimal = dec!(0.01);

/// Round an amount to [`SCALE`] decimal places, midpoint away from zero.
///
/// # Examples
///
/// ```
/// use splitledger::core::money::round_amount;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(round_amount(dec!(33.335)), dec!(33.34));
/// assert_eq!(round_amount(dec!(-33.335)), dec!(-33.34));
/// ```
pub fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Whether an amount is within [`TOLERANCE`] of zero.
pub fn is_settled(amount: Decimal) -> bool {
    amount.abs() <= TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_amount() {
        assert_eq!(round_amount(dec!(10)), dec!(10));
        assert_eq!(round_amount(dec!(0.005)), dec!(0.01));
        assert_eq!(round_amount(dec!(-0.005)), dec!(-0.01));
        assert_eq!(round_amount(dec!(33.3333333)), dec!(33.33));
    }

    #[test]
    fn test_is_settled_boundaries() {
        assert!(is_settled(Decimal::ZERO));
        assert!(is_settled(dec!(0.01)));
        assert!(is_settled(dec!(-0.01)));
        assert!(!is_settled(dec!(0.011)));
        assert!(!is_settled(dec!(-0.02)));
    }
}
