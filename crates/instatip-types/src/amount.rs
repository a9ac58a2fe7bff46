//! Decimal amounts
//!
//! Amounts are exact base-10 decimals so that allowance bookkeeping never
//! drifts the way binary floating point does (0.1 + 0.2 == 0.3 here).

use crate::{InstaTipError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// A non-denominated decimal amount. The token label travels separately on
/// the ledger entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(pub Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Create an amount from a float, rejecting NaN and infinities
    pub fn from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(InstaTipError::invalid_amount(format!(
                "{value} is not a finite number"
            )));
        }
        Decimal::try_from(value)
            .map(Self)
            .map_err(|e| InstaTipError::invalid_amount(e.to_string()))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Divide evenly across `count` parts; zero when `count` is zero
    pub fn split(self, count: usize) -> Self {
        if count == 0 {
            return Self::zero();
        }
        self.0
            .checked_div(Decimal::from(count))
            .map(Self)
            .unwrap_or_default()
    }

    /// Round to `dp` decimal places (banker's rounding)
    pub fn round_dp(self, dp: u32) -> Self {
        Self(self.0.round_dp(dp))
    }

    /// Lossy conversion for display and heuristics
    pub fn to_f64(&self) -> f64 {
        use rust_decimal::prelude::ToPrimitive;
        self.0.to_f64().unwrap_or_default()
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<u32> for Amount {
    fn from(value: u32) -> Self {
        Self(Decimal::from(value))
    }
}

impl FromStr for Amount {
    type Err = InstaTipError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<Decimal>()
            .map(Self)
            .map_err(|e| InstaTipError::invalid_amount(format!("'{s}': {e}")))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, a| acc + *a)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, a| acc + a)
    }
}
