//! Money as an integer count of minor currency units.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts travel as decimal strings (`"-123.45"`) and are held as `i64` cents.
//! The string codec is exact in both directions; `rust_decimal::Decimal` is the
//! bridge for callers that already hold decimals.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of decimal places carried by a cent amount.
pub const CENT_SCALE: u32 = 2;

/// Errors produced while converting to or from cents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// The input string was empty.
    #[error("Money amount is empty")]
    Empty,

    /// The input is not of the form `-?digits(.digits)?`.
    #[error("Malformed money amount: {0:?}")]
    Malformed(String),

    /// The input carries more than two fraction digits.
    #[error("Money amount has more than two fraction digits: {0:?}")]
    SubCentPrecision(String),

    /// The amount does not fit into 64-bit cents.
    #[error("Money amount out of range: {0}")]
    Overflow(String),
}

impl MoneyError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "MONEY_EMPTY",
            Self::Malformed(_) => "MONEY_MALFORMED",
            Self::SubCentPrecision(_) => "MONEY_SUB_CENT_PRECISION",
            Self::Overflow(_) => "MONEY_OVERFLOW",
        }
    }
}

/// A signed amount of money in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(i64);

impl Cents {
    /// Zero cents.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw cent count.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw cent count.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Parses a decimal string such as `"-123.45"`, `"10"` or `"0.5"`.
    ///
    /// Accepted grammar: an optional leading `-`, one or more ASCII digits, and an
    /// optional `.` followed by one or two digits. Anything else (`+`, whitespace,
    /// exponents, repeated signs, sub-cent precision) is rejected, never truncated.
    pub fn parse(input: &str) -> Result<Self, MoneyError> {
        if input.is_empty() {
            return Err(MoneyError::Empty);
        }

        let unsigned = input.strip_prefix('-').unwrap_or(input);
        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (unsigned, None),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MoneyError::Malformed(input.to_string()));
        }

        if let Some(fraction) = fraction {
            if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
                return Err(MoneyError::Malformed(input.to_string()));
            }
            if fraction.len() > CENT_SCALE as usize {
                return Err(MoneyError::SubCentPrecision(input.to_string()));
            }
        }

        let amount = Decimal::from_str_exact(input)
            .map_err(|_| MoneyError::Overflow(input.to_string()))?;
        Self::from_decimal(amount)
    }

    /// Converts an exact decimal amount to cents.
    ///
    /// Fails if the decimal carries significant digits below one cent.
    pub fn from_decimal(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.normalize().scale() > CENT_SCALE {
            return Err(MoneyError::SubCentPrecision(amount.to_string()));
        }

        let mut scaled = amount;
        scaled.rescale(CENT_SCALE);
        i64::try_from(scaled.mantissa())
            .map(Self)
            .map_err(|_| MoneyError::Overflow(amount.to_string()))
    }

    /// Returns the amount as a two-place decimal.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, CENT_SCALE)
    }

    /// Renders the amount as a decimal string with exactly two fraction digits.
    ///
    /// The sign precedes the absolute value: `-12345` renders as `"-123.45"`.
    #[must_use]
    pub fn to_decimal_string(self) -> String {
        self.to_decimal().to_string()
    }

    /// Adds two amounts, failing on overflow.
    pub fn checked_add(self, other: Self) -> Result<Self, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or_else(|| MoneyError::Overflow(format!("{self} + {other}")))
    }

    /// Subtracts `other` from `self`, failing on overflow.
    pub fn checked_sub(self, other: Self) -> Result<Self, MoneyError> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or_else(|| MoneyError::Overflow(format!("{self} - {other}")))
    }

    /// Sums an iterator of amounts, failing on overflow.
    pub fn checked_sum<I>(amounts: I) -> Result<Self, MoneyError>
    where
        I: IntoIterator<Item = Self>,
    {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |acc, amount| acc.checked_add(amount))
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

impl std::str::FromStr for Cents {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<i64> for Cents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}
