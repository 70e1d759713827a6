//! Report data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, Cents, CompanyId};

use crate::canonical::serde_fmt::iso_millis_format;
use crate::canonical::{Attested, iso_millis};

/// Version tag of the trial balance canonical field list.
pub const TRIAL_BALANCE_SCHEMA_VERSION: &str = "trial_balance.v1";

/// Reporting currency applied to every account.
///
/// Lines carry no currency of their own yet, so a single currency per tenant
/// is assumed. Multi-currency ledgers would misreport here.
pub const DEFAULT_CURRENCY: &str = "USD";

/// One account's balances over the report range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// Account ID.
    pub account_id: AccountId,
    /// Currency code.
    pub currency: String,
    /// Sum of deltas strictly before `from`.
    pub opening_cents: Cents,
    /// Sum of deltas in `[from, to)`.
    pub activity_cents: Cents,
    /// `opening_cents + activity_cents`.
    pub closing_cents: Cents,
}

/// Trial balance totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Total opening.
    pub opening_cents: Cents,
    /// Total activity.
    pub activity_cents: Cents,
    /// Total closing.
    pub closing_cents: Cents,
    /// Whether closing balances net to zero (debits equal credits).
    pub is_balanced: bool,
}

/// Trial balance report over `[from, to)` for one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalance {
    /// Company the report covers.
    pub company_id: CompanyId,
    /// Inclusive range start.
    #[serde(with = "iso_millis_format")]
    pub from: DateTime<Utc>,
    /// Exclusive range end.
    #[serde(with = "iso_millis_format")]
    pub to: DateTime<Utc>,
    /// Currency code.
    pub currency: String,
    /// Rows sorted by account id ascending.
    pub rows: Vec<TrialBalanceRow>,
    /// Totals.
    pub totals: TrialBalanceTotals,
    /// Digest of [`TrialBalanceCanonical`].
    pub integrity_hash: String,
}

/// Hash input of a trial balance. Amounts are decimal strings so the digest
/// survives changes to the in-memory representation.
#[derive(Debug, Serialize)]
pub struct TrialBalanceCanonical<'a> {
    schema_version: &'static str,
    company_id: &'a str,
    from: String,
    to: String,
    rows: Vec<CanonicalRow<'a>>,
}

#[derive(Debug, Serialize)]
struct CanonicalRow<'a> {
    account_id: &'a str,
    opening: String,
    activity: String,
    closing: String,
}

impl<'a> TrialBalanceCanonical<'a> {
    /// Builds the canonical view from report parts.
    #[must_use]
    pub fn new(
        company_id: &'a CompanyId,
        from: &DateTime<Utc>,
        to: &DateTime<Utc>,
        rows: &'a [TrialBalanceRow],
    ) -> Self {
        Self {
            schema_version: TRIAL_BALANCE_SCHEMA_VERSION,
            company_id: company_id.as_str(),
            from: iso_millis(from),
            to: iso_millis(to),
            rows: rows
                .iter()
                .map(|row| CanonicalRow {
                    account_id: row.account_id.as_str(),
                    opening: row.opening_cents.to_decimal_string(),
                    activity: row.activity_cents.to_decimal_string(),
                    closing: row.closing_cents.to_decimal_string(),
                })
                .collect(),
        }
    }
}

impl Attested for TrialBalance {
    type Canonical<'a> = TrialBalanceCanonical<'a>;

    fn canonical(&self) -> TrialBalanceCanonical<'_> {
        TrialBalanceCanonical::new(&self.company_id, &self.from, &self.to, &self.rows)
    }

    fn integrity_hash(&self) -> &str {
        &self.integrity_hash
    }
}
