use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// fractional digits kept for currency amounts
pub const CURRENCY_SCALE: u32 = 2;

/// minimum fractional digits kept for periodic rates
pub const MIN_RATE_SCALE: u32 = 15;

/// half-up rounding, the only mode used for persisted or displayed values
pub const ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

/// round half-up to `dp` places and pin the scale so `1` renders as `1.00`
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, ROUNDING);
    rounded.rescale(dp);
    rounded
}

/// Money type with 2 decimal places, rounded half-up on construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::from_parts(0, 0, 0, false, CURRENCY_SCALE));
    /// one paisa / cent
    pub const MINOR_UNIT: Money = Money(Decimal::from_parts(1, 0, 0, false, CURRENCY_SCALE));

    /// create from decimal, rounding half-up to currency scale
    pub fn from_decimal(d: Decimal) -> Self {
        Money(round_half_up(d, CURRENCY_SCALE))
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money::from_decimal(Decimal::from_str(s)?))
    }

    /// create from integer amount (rupees, dollars, etc)
    pub fn from_major(amount: i64) -> Self {
        Money::from_decimal(Decimal::from(amount))
    }

    /// create from minor amount (paise, cents)
    pub fn from_minor(amount: i64) -> Self {
        Money(Decimal::new(amount, CURRENCY_SCALE))
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// multiply by an unrounded factor and round the product half-up.
    /// returns None on overflow
    pub fn checked_mul(self, factor: Decimal) -> Option<Money> {
        self.0.checked_mul(factor).map(Money::from_decimal)
    }

    /// divide by an unrounded divisor and round the quotient half-up.
    /// returns None on overflow or a zero divisor
    pub fn checked_div(self, divisor: Decimal) -> Option<Money> {
        self.0.checked_div(divisor).map(Money::from_decimal)
    }

    /// returns None on overflow
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money::from_decimal)
    }

    /// returns None on overflow
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money::from_decimal)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money::from_decimal(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money::from_decimal(self.0 - other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, x| acc + x)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, x| acc + *x)
    }
}

/// rate type for periodic interest rates, stored as a fraction (0.01 for 1%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    /// monthly rate from an annual percentage: `A / 12 / 100`.
    ///
    /// Each division is rounded half-up to `scale` fractional digits and the
    /// result is never rounded to currency scale.
    pub fn monthly_from_annual_percent(annual_percent: Decimal, scale: u32) -> Self {
        let per_month = round_half_up(annual_percent / Decimal::from(12), scale);
        Rate(round_half_up(per_month / Decimal::ONE_HUNDRED, scale))
    }

    /// daily rate from an annual percentage on an Actual/365 basis
    pub fn daily_from_annual_percent(annual_percent: Decimal, scale: u32) -> Self {
        let fraction = round_half_up(annual_percent / Decimal::ONE_HUNDRED, scale);
        Rate(round_half_up(fraction / Decimal::from(365), scale))
    }

    /// get as decimal fraction
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_rounds_half_up() {
        assert_eq!(Money::from_str_exact("100.125").unwrap().to_string(), "100.13");
        assert_eq!(Money::from_str_exact("100.124").unwrap().to_string(), "100.12");
        assert_eq!(Money::from_str_exact("-100.125").unwrap().to_string(), "-100.13");
    }

    #[test]
    fn test_money_keeps_currency_scale() {
        assert_eq!(Money::from_major(1_000_000).to_string(), "1000000.00");
        assert_eq!(Money::ZERO.to_string(), "0.00");
        assert_eq!(Money::from_minor(1), Money::MINOR_UNIT);
        assert_eq!(Money::from_minor(12_345), Money::from_str_exact("123.45").unwrap());
    }

    #[test]
    fn test_checked_mul_rounds_product() {
        let balance = Money::from_major(1_000_000);
        let rate = Rate::monthly_from_annual_percent(dec!(8.5), 15);

        let interest = balance.checked_mul(rate.as_decimal()).unwrap();
        assert_eq!(interest.to_string(), "7083.33");
    }

    #[test]
    fn test_checked_div_by_zero() {
        assert!(Money::from_major(10).checked_div(Decimal::ZERO).is_none());
    }

    #[test]
    fn test_monthly_rate_precision() {
        let rate = Rate::monthly_from_annual_percent(dec!(8.5), 15);
        assert_eq!(rate.to_string(), "0.007083333333333");

        let rate = Rate::monthly_from_annual_percent(dec!(12), 15);
        assert_eq!(rate.to_string(), "0.010000000000000");
        assert_eq!(rate.as_decimal(), dec!(0.01));

        assert!(Rate::monthly_from_annual_percent(Decimal::ZERO, 15).is_zero());
    }

    #[test]
    fn test_daily_rate() {
        let rate = Rate::daily_from_annual_percent(dec!(36.5), 15);
        assert_eq!(rate.as_decimal(), dec!(0.001));
    }

    #[test]
    fn test_money_sum() {
        let parts = vec![Money::from_minor(1), Money::from_minor(2), Money::from_minor(3)];
        let total: Money = parts.iter().sum();
        assert_eq!(total, Money::from_minor(6));
    }
}
