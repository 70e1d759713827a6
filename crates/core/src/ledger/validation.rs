//! Business rule validation for postings.

use tally_shared::types::{Cents, MoneyError};
use thiserror::Error;

use super::entry::LedgerLine;
use super::transaction::NewTransaction;

/// Validation errors for submitted transactions.
#[derive(Debug, Error)]
pub enum LedgerValidationError {
    /// Transaction must have at least 2 lines.
    #[error("Transaction must have at least 2 lines")]
    InsufficientLines,

    /// Transaction number is blank.
    #[error("Transaction number cannot be empty")]
    MissingTransactionNumber,

    /// A line amount is not valid money.
    #[error("Line {line}: {source}")]
    InvalidAmount {
        /// Zero-based line index.
        line: usize,
        /// Parser failure.
        source: MoneyError,
    },

    /// A line amount is negative.
    #[error("Line {line}: amount cannot be negative")]
    NegativeAmount {
        /// Zero-based line index.
        line: usize,
    },

    /// A line carries both a debit and a credit.
    #[error("Line {line}: specify either debit or credit, not both")]
    BothSides {
        /// Zero-based line index.
        line: usize,
    },

    /// A line has no effect.
    #[error("Line {line}: amount cannot be zero")]
    ZeroAmount {
        /// Zero-based line index.
        line: usize,
    },

    /// Debits and credits do not balance.
    #[error("Transaction is unbalanced: debits ({debits}) != credits ({credits})")]
    Unbalanced {
        /// Total debit amount.
        debits: Cents,
        /// Total credit amount.
        credits: Cents,
    },
}

impl LedgerValidationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::MissingTransactionNumber => "MISSING_TRANSACTION_NUMBER",
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::BothSides { .. } => "INVALID_ENTRY_TYPE",
            Self::ZeroAmount { .. } => "ZERO_AMOUNT",
            Self::Unbalanced { .. } => "UNBALANCED_TRANSACTION",
        }
    }
}

/// Validates a transaction before it is appended.
///
/// # Errors
///
/// Returns an error if the transaction is not balanced or violates line rules.
pub fn validate_posting(transaction: &NewTransaction) -> Result<(), LedgerValidationError> {
    if transaction.transaction_number.trim().is_empty() {
        return Err(LedgerValidationError::MissingTransactionNumber);
    }

    if transaction.lines.len() < 2 {
        return Err(LedgerValidationError::InsufficientLines);
    }

    let mut total_debits = Cents::ZERO;
    let mut total_credits = Cents::ZERO;

    for (index, line) in transaction.lines.iter().enumerate() {
        let (debit, credit) = validate_line(index, line)?;
        let invalid = |source| LedgerValidationError::InvalidAmount {
            line: index,
            source,
        };
        total_debits = total_debits.checked_add(debit).map_err(invalid)?;
        total_credits = total_credits.checked_add(credit).map_err(invalid)?;
    }

    if total_debits != total_credits {
        return Err(LedgerValidationError::Unbalanced {
            debits: total_debits,
            credits: total_credits,
        });
    }

    Ok(())
}

fn validate_line(index: usize, line: &LedgerLine) -> Result<(Cents, Cents), LedgerValidationError> {
    let invalid = |source| LedgerValidationError::InvalidAmount {
        line: index,
        source,
    };
    let debit = line.debit_cents().map_err(invalid)?;
    let credit = line.credit_cents().map_err(invalid)?;

    if debit.is_negative() || credit.is_negative() {
        return Err(LedgerValidationError::NegativeAmount { line: index });
    }
    if !debit.is_zero() && !credit.is_zero() {
        return Err(LedgerValidationError::BothSides { line: index });
    }
    if debit.is_zero() && credit.is_zero() {
        return Err(LedgerValidationError::ZeroAmount { line: index });
    }

    Ok((debit, credit))
}
