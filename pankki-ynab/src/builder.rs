//! Canonical rows -> YNAB bulk-upload entries.

use chrono::NaiveDate;
use pankki_core::{
    BudgetEntry, MilliunitTransaction, Milliunits, PayeeCategoryMap, DEFAULT_ACCOUNT_ID,
    DEFAULT_CATEGORY_ID,
};
use tracing::info;

const IMPORT_ID_PREFIX: &str = "YNAB";

/// Occurrence suffix of every import id. Always 1: two transactions with the
/// same sign, amount and date get the same id and the service keeps only the
/// first one it sees.
pub const IMPORT_OCCURRENCE: u32 = 1;

/// Deterministic de-duplication key: `YNAB:[-]<milliunits>:<YYYY-MM-DD>:1`.
pub fn import_id(amount: Milliunits, date: NaiveDate) -> String {
    let sign = if amount.is_negative() { "-" } else { "" };
    format!(
        "{IMPORT_ID_PREFIX}:{sign}{}:{}:{IMPORT_OCCURRENCE}",
        amount.magnitude(),
        date.format("%Y-%m-%d")
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionBuilder {
    account_id: String,
    default_category_id: String,
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ACCOUNT_ID, DEFAULT_CATEGORY_ID)
    }
}

impl TransactionBuilder {
    pub fn new(account_id: impl Into<String>, default_category_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            default_category_id: default_category_id.into(),
        }
    }

    pub fn build_entry(&self, row: &MilliunitTransaction, payee_to_category: &PayeeCategoryMap) -> BudgetEntry {
        let amount = row.net();
        let category_id = payee_to_category
            .get(&row.payee)
            .cloned()
            .unwrap_or_else(|| self.default_category_id.clone());

        BudgetEntry {
            account_id: self.account_id.clone(),
            date: row.date,
            amount,
            payee_name: row.payee.clone(),
            category_id,
            memo: row.memo.clone(),
            import_id: import_id(amount, row.date),
        }
    }

    pub fn build(&self, rows: &[MilliunitTransaction], payee_to_category: &PayeeCategoryMap) -> Vec<BudgetEntry> {
        let entries: Vec<BudgetEntry> = rows
            .iter()
            .map(|row| self.build_entry(row, payee_to_category))
            .collect();
        info!(
            count = entries.len(),
            categorized = entries
                .iter()
                .filter(|e| e.category_id != self.default_category_id)
                .count(),
            "prepared transactions for upload"
        );
        entries
    }
}
