//! Property-based tests for posting validation rules.

use chrono::DateTime;
use proptest::prelude::*;
use tally_shared::types::{Cents, CompanyId};

use super::entry::LedgerLine;
use super::transaction::NewTransaction;
use super::validation::{LedgerValidationError, validate_posting};

/// Strategy to generate a valid positive amount in cents (0.01 to 1,000,000.00).
fn positive_cents() -> impl Strategy<Value = i64> {
    1i64..100_000_000i64
}

fn amount(cents: i64) -> String {
    Cents::new(cents).to_decimal_string()
}

fn posting(lines: Vec<LedgerLine>) -> NewTransaction {
    NewTransaction {
        company_id: CompanyId::from("co-1"),
        transaction_number: "JE-1".to_string(),
        posted_at: DateTime::UNIX_EPOCH,
        lines,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any split of a debit across several credit lines balances.
    #[test]
    fn prop_split_credits_balance(parts in prop::collection::vec(positive_cents(), 1..8)) {
        let total: i64 = parts.iter().sum();
        let mut lines = vec![LedgerLine::debit("1000", amount(total))];
        lines.extend(parts.iter().map(|&p| LedgerLine::credit("4000", amount(p))));

        prop_assert!(validate_posting(&posting(lines)).is_ok());
    }

    /// Any non-zero difference between sides is rejected as unbalanced.
    #[test]
    fn prop_off_by_any_amount_rejected(
        debit in positive_cents(),
        offset in 1i64..1_000,
    ) {
        let lines = vec![
            LedgerLine::debit("1000", amount(debit)),
            LedgerLine::credit("4000", amount(debit + offset)),
        ];
        let result = validate_posting(&posting(lines));
        prop_assert!(
            matches!(result, Err(LedgerValidationError::Unbalanced { .. })),
            "expected unbalanced, got: {:?}",
            result
        );
    }

    /// Negative amounts are rejected on either side.
    #[test]
    fn prop_negative_rejected(cents in positive_cents(), on_debit in any::<bool>()) {
        let lines = if on_debit {
            vec![
                LedgerLine::debit("1000", amount(-cents)),
                LedgerLine::credit("4000", amount(cents)),
            ]
        } else {
            vec![
                LedgerLine::debit("1000", amount(cents)),
                LedgerLine::credit("4000", amount(-cents)),
            ]
        };
        let result = validate_posting(&posting(lines));
        prop_assert!(
            matches!(result, Err(LedgerValidationError::NegativeAmount { .. })),
            "expected negative amount rejection, got: {:?}",
            result
        );
    }
}
