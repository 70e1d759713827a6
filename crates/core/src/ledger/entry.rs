//! Ledger line domain types.

use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, Cents, MoneyError};

/// A single line of a posted transaction.
///
/// Amounts arrive from the store as decimal strings and are parsed with the
/// strict money grammar when read. Debit and credit are mutually exclusive in
/// practice, but both are representable; the net effect is `debit - credit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerLine {
    /// The account affected by this line.
    pub account_id: AccountId,
    /// Debit amount as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debit: Option<String>,
    /// Credit amount as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit: Option<String>,
}

impl LedgerLine {
    /// Creates a debit line.
    #[must_use]
    pub fn debit(account_id: impl Into<AccountId>, amount: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            debit: Some(amount.into()),
            credit: None,
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub fn credit(account_id: impl Into<AccountId>, amount: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            debit: None,
            credit: Some(amount.into()),
        }
    }

    /// Parsed debit amount (zero when absent).
    pub fn debit_cents(&self) -> Result<Cents, MoneyError> {
        parse_optional(self.debit.as_deref())
    }

    /// Parsed credit amount (zero when absent).
    pub fn credit_cents(&self) -> Result<Cents, MoneyError> {
        parse_optional(self.credit.as_deref())
    }

    /// Net effect of the line: `debit - credit`.
    pub fn delta_cents(&self) -> Result<Cents, MoneyError> {
        self.debit_cents()?.checked_sub(self.credit_cents()?)
    }
}

fn parse_optional(amount: Option<&str>) -> Result<Cents, MoneyError> {
    amount.map_or(Ok(Cents::ZERO), Cents::parse)
}
