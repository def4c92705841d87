use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum MoneyError {
    #[error("invalid amount: {0:?}")]
    Invalid(String),
}

/// An exact currency amount, stored as minor units (cents).
///
/// Parsed amounts are bounded by `Money::MAX` and arithmetic
/// saturates, so sums over any realistic ledger stay exact.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    sqlx::Type,
    Serialize,
    Deserialize,
)]
#[sqlx(transparent)]
#[serde(try_from = "String", into = "String")]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest amount accepted from text: 100 billion units
    pub const MAX: Money = Money(10_000_000_000_000);

    pub fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Whole currency units, e.g. `Money::from_units(1500)` is 1500.00
    pub fn from_units(units: i64) -> Self {
        Money(units.saturating_mul(100))
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        f.pad(&format!("{}{}.{:02}", sign, abs / 100, abs % 100))
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    /// Parse `"12"`, `"12.5"` or `"-12.50"`. More than two
    /// decimal places are rejected rather than rounded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MoneyError::Invalid(s.to_string());
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (units, fraction) = match digits.split_once('.') {
            Some((units, fraction)) => (units, fraction),
            None => (digits, ""),
        };
        if units.is_empty() || !units.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let units: i64 = units.parse().map_err(|_| invalid())?;
        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };
        let total = units
            .checked_mul(100)
            .and_then(|u| u.checked_add(cents))
            .filter(|total| *total <= Money::MAX.0)
            .ok_or_else(invalid)?;
        Ok(Money(if negative { -total } else { total }))
    }
}

impl TryFrom<String> for Money {
    type Error = MoneyError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Money> for String {
    fn from(money: Money) -> Self {
        money.to_string()
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + *m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_money() {
        assert_eq!("12".parse::<Money>().unwrap(), Money::from_cents(1200));
        assert_eq!("12.5".parse::<Money>().unwrap(), Money::from_cents(1250));
        assert_eq!("0.07".parse::<Money>().unwrap(), Money::from_cents(7));
        assert_eq!("-3.20".parse::<Money>().unwrap(), Money::from_cents(-320));
        assert!("12.345".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!(".50".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
    }

    #[test]
    fn test_parse_money_bound() {
        assert_eq!(
            "100000000000".parse::<Money>().unwrap(),
            Money::MAX
        );
        assert!("100000000000.01".parse::<Money>().is_err());
        assert!("-100000000000.01".parse::<Money>().is_err());
        assert!("92233720368547758.07".parse::<Money>().is_err());
    }

    #[test]
    fn test_sum_saturates() {
        let huge = Money::from_cents(i64::MAX - 1);
        let total: Money = [huge, huge, Money::from_cents(5)].iter().sum();
        assert_eq!(total, Money::from_cents(i64::MAX));
        assert_eq!(huge.checked_add(huge), None);
        assert_eq!(
            Money::from_cents(1).checked_add(Money::from_cents(2)),
            Some(Money::from_cents(3))
        );
    }

    #[test]
    fn test_display_money() {
        assert_eq!(Money::from_cents(150000).to_string(), "1500.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-1234).to_string(), "-12.34");
    }

    #[test]
    fn test_sum_does_not_drift() {
        // 0.1 added ten times is exactly 1.00
        let total: Money = std::iter::repeat(Money::from_cents(10))
            .take(10)
            .sum();
        assert_eq!(total, Money::from_units(1));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Money::from_cents(2342)).unwrap();
        assert_eq!(json, "\"23.42\"");
        let money: Money = serde_json::from_str("\"23.42\"").unwrap();
        assert_eq!(money, Money::from_cents(2342));
    }
}
