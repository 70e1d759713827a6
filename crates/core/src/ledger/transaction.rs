//! Transaction aggregate.
//!
//! Transactions are append-only: once posted they are never mutated or
//! deleted. Corrections are new reversing transactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::{CompanyId, TransactionId};

use super::entry::LedgerLine;
use crate::canonical::serde_fmt::iso_millis_format;

/// A posted, immutable transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier.
    pub id: TransactionId,
    /// Company this transaction belongs to.
    pub company_id: CompanyId,
    /// Human-facing transaction number, unique per company.
    pub transaction_number: String,
    /// Posting timestamp.
    #[serde(with = "iso_millis_format")]
    pub posted_at: DateTime<Utc>,
    /// Ordered lines.
    pub lines: Vec<LedgerLine>,
}

/// A transaction submitted for posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// Company the transaction is posted to.
    pub company_id: CompanyId,
    /// Human-facing transaction number, unique per company.
    pub transaction_number: String,
    /// Posting timestamp.
    #[serde(with = "iso_millis_format")]
    pub posted_at: DateTime<Utc>,
    /// Ordered lines.
    pub lines: Vec<LedgerLine>,
}

impl NewTransaction {
    /// Finalizes the submission under the given identifier.
    #[must_use]
    pub fn into_posted(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            company_id: self.company_id,
            transaction_number: self.transaction_number,
            posted_at: self.posted_at,
            lines: self.lines,
        }
    }
}
