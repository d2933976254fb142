//! Signed USD amounts backed by rust_decimal.
//!
//! Balances are unsigned integers clamped at zero; USD metrics are not.
//! Liquidation profit in particular may legitimately go negative, so Usd
//! keeps full signedness.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::str::FromStr;

/// A signed USD value with lossless decimal arithmetic.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Usd(Decimal);

impl Usd {
    pub const ZERO: Usd = Usd(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Usd(value)
    }

    pub fn inner(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        !self.0.is_zero() && self.0.is_sign_negative()
    }

    pub fn abs(&self) -> Self {
        Usd(self.0.abs())
    }
}

impl fmt::Display for Usd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for Usd {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s).map(Usd)
    }
}

impl From<Decimal> for Usd {
    fn from(value: Decimal) -> Self {
        Usd(value)
    }
}

impl From<Usd> for Decimal {
    fn from(value: Usd) -> Self {
        value.0
    }
}

impl std::ops::Add for Usd {
    type Output = Usd;

    fn add(self, rhs: Usd) -> Usd {
        Usd(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Usd {
    fn add_assign(&mut self, rhs: Usd) {
        self.0 += rhs.0;
    }
}

impl std::ops::Sub for Usd {
    type Output = Usd;

    fn sub(self, rhs: Usd) -> Usd {
        Usd(self.0 - rhs.0)
    }
}

impl std::ops::Mul for Usd {
    type Output = Usd;

    fn mul(self, rhs: Usd) -> Usd {
        Usd(self.0 * rhs.0)
    }
}

impl std::ops::Neg for Usd {
    type Output = Usd;

    fn neg(self) -> Usd {
        Usd(-self.0)
    }
}

impl Sum for Usd {
    fn sum<I: Iterator<Item = Usd>>(iter: I) -> Usd {
        iter.fold(Usd::ZERO, |acc, v| acc + v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn usd_arithmetic() {
        let a = Usd::new(dec!(90));
        let b = Usd::new(dec!(100));
        assert_eq!(a - b, Usd::new(dec!(-10)));
        assert_eq!(a + b, Usd::new(dec!(190)));
        assert_eq!(a * Usd::new(dec!(0.1)), Usd::new(dec!(9)));
    }

    #[test]
    fn usd_stays_signed() {
        let loss = Usd::new(dec!(90)) - Usd::new(dec!(100));
        assert!(loss.is_negative());
        assert_eq!(-loss, Usd::new(dec!(10)));
        assert_eq!(loss.abs(), Usd::new(dec!(10)));
    }

    #[test]
    fn usd_sum_over_iterator() {
        let total: Usd = [dec!(100), dec!(50), dec!(25)]
            .into_iter()
            .map(Usd::new)
            .sum();
        assert_eq!(total, Usd::new(dec!(175)));
    }

    #[test]
    fn usd_display_normalizes() {
        assert_eq!(Usd::new(dec!(10.500)).to_string(), "10.5");
    }
}
