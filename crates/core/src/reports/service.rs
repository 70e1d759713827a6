//! Report generation service.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use tally_shared::types::{AccountId, Cents, CompanyId};

use super::error::ReportError;
use super::types::{
    DEFAULT_CURRENCY, TrialBalance, TrialBalanceCanonical, TrialBalanceRow, TrialBalanceTotals,
};
use crate::canonical::digest_of;
use crate::ledger::{LedgerStore, net_deltas_by_account};

/// Service for generating financial reports.
pub struct ReportService;

impl ReportService {
    /// Builds the trial balance of `company_id` over `[from, to)`.
    ///
    /// Opening balances cover everything strictly before `from`; activity covers
    /// `[from, to)`. Rows are the union of accounts touched in either window,
    /// ordered by account id; accounts netting to zero in both windows are
    /// omitted. Store failures abort the build.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidDateRange` if `from > to`, and propagates
    /// store, money parsing and canonicalization failures.
    #[tracing::instrument(skip(store), fields(company_id = %company_id))]
    pub async fn build_trial_balance(
        store: &dyn LedgerStore,
        company_id: &CompanyId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<TrialBalance, ReportError> {
        if from > to {
            return Err(ReportError::InvalidDateRange { from, to });
        }

        let (opening_txs, activity_txs) = tokio::try_join!(
            store.list_posted_transactions(company_id, None, from),
            store.list_posted_transactions(company_id, Some(from), to),
        )?;

        let opening = net_deltas_by_account(&opening_txs)?;
        let activity = net_deltas_by_account(&activity_txs)?;
        let rows = Self::build_rows(&opening, &activity)?;
        let totals = Self::totals(&rows)?;

        let integrity_hash =
            digest_of(&TrialBalanceCanonical::new(company_id, &from, &to, &rows))?;

        tracing::debug!(
            accounts = rows.len(),
            opening_transactions = opening_txs.len(),
            activity_transactions = activity_txs.len(),
            is_balanced = totals.is_balanced,
            "trial balance computed"
        );

        Ok(TrialBalance {
            company_id: company_id.clone(),
            from,
            to,
            currency: DEFAULT_CURRENCY.to_string(),
            rows,
            totals,
            integrity_hash,
        })
    }

    fn build_rows(
        opening: &BTreeMap<AccountId, Cents>,
        activity: &BTreeMap<AccountId, Cents>,
    ) -> Result<Vec<TrialBalanceRow>, ReportError> {
        let accounts: BTreeSet<&AccountId> = opening.keys().chain(activity.keys()).collect();

        accounts
            .into_iter()
            .map(|account_id| {
                (
                    account_id,
                    opening.get(account_id).copied().unwrap_or_default(),
                    activity.get(account_id).copied().unwrap_or_default(),
                )
            })
            .filter(|(_, opening_cents, activity_cents)| {
                !(opening_cents.is_zero() && activity_cents.is_zero())
            })
            .map(|(account_id, opening_cents, activity_cents)| {
                Ok(TrialBalanceRow {
                    account_id: account_id.clone(),
                    currency: DEFAULT_CURRENCY.to_string(),
                    opening_cents,
                    activity_cents,
                    closing_cents: opening_cents.checked_add(activity_cents)?,
                })
            })
            .collect()
    }

    fn totals(rows: &[TrialBalanceRow]) -> Result<TrialBalanceTotals, ReportError> {
        let opening_cents = Cents::checked_sum(rows.iter().map(|r| r.opening_cents))?;
        let activity_cents = Cents::checked_sum(rows.iter().map(|r| r.activity_cents))?;
        let closing_cents = Cents::checked_sum(rows.iter().map(|r| r.closing_cents))?;

        Ok(TrialBalanceTotals {
            opening_cents,
            activity_cents,
            closing_cents,
            is_balanced: closing_cents.is_zero(),
        })
    }
}
