//! Money
//!
//! All amounts are [`Decimal`]s in the store's base currency. Every aggregation
//! step rounds to two places before the next one consumes it, so a subtotal is
//! always the sum of already-rounded line totals.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept on every amount.
pub const MONEY_SCALE: u32 = 2;

/// Round an amount to two decimal places, halves away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// `percent`% of `amount`, rounded.
#[must_use]
pub fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    round_money(amount * percent / Decimal::ONE_HUNDRED)
}

/// Unit price times quantity, rounded.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    round_money(unit_price * Decimal::from(quantity))
}

/// Sum of amounts that have each already been rounded.
pub fn sum_rounded<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .map(round_money)
        .fold(Decimal::ZERO, |acc, amount| acc + amount)
}

/// Clamp an amount into `[0, ceiling]`.
#[must_use]
pub fn clamp_to(amount: Decimal, ceiling: Decimal) -> Decimal {
    amount.max(Decimal::ZERO).min(ceiling.max(Decimal::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_money(Decimal::new(12_345, 3)), Decimal::new(1235, 2));
        assert_eq!(round_money(Decimal::new(12_344, 3)), Decimal::new(1234, 2));
    }

    #[test]
    fn percent_of_rounds_result() {
        // 15% of 33.33 = 4.9995
        assert_eq!(
            percent_of(Decimal::new(3333, 2), Decimal::from(15)),
            Decimal::new(500, 2)
        );
    }

    #[test]
    fn line_total_multiplies_then_rounds() {
        assert_eq!(line_total(Decimal::new(333, 2), 3), Decimal::new(999, 2));
    }

    #[test]
    fn clamp_never_goes_negative() {
        assert_eq!(clamp_to(Decimal::from(-5), Decimal::from(10)), Decimal::ZERO);
        assert_eq!(clamp_to(Decimal::from(15), Decimal::from(10)), Decimal::from(10));
        assert_eq!(clamp_to(Decimal::from(5), Decimal::from(-1)), Decimal::ZERO);
    }
}
