//! Payee -> category suggestions derived from the budget's own history.
//!
//! The map is only a fallback for new transactions; nothing here edits a
//! remote transaction. The remote does not promise chronological order, so
//! "last write wins" is best effort.

use pankki_core::{PayeeCategoryMap, PayeeDirectory, RemoteTransaction};
use tracing::debug;

/// Why a remote transaction contributed nothing to the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Deleted,
    NoPayee,
    UnknownPayee,
    NoCategory,
}

/// The `(payee name, category id)` pair a transaction contributes, if any.
pub fn category_link<'a>(
    txn: &'a RemoteTransaction,
    payees: &'a PayeeDirectory,
) -> Result<(&'a str, &'a str), SkipReason> {
    if txn.deleted {
        return Err(SkipReason::Deleted);
    }
    let payee_id = txn
        .payee_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or(SkipReason::NoPayee)?;
    let category_id = txn
        .category_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or(SkipReason::NoCategory)?;
    let name = payees.get(payee_id).ok_or(SkipReason::UnknownPayee)?;
    Ok((name.as_str(), category_id))
}

pub fn build_payee_category_map(
    transactions: &[RemoteTransaction],
    payees: &PayeeDirectory,
) -> PayeeCategoryMap {
    let mut map = PayeeCategoryMap::new();
    let (mut deleted, mut no_payee, mut unknown_payee, mut no_category) = (0usize, 0usize, 0usize, 0usize);

    for txn in transactions {
        match category_link(txn, payees) {
            Ok((name, category_id)) => {
                map.insert(name.to_string(), category_id.to_string());
            }
            Err(SkipReason::Deleted) => deleted += 1,
            Err(SkipReason::NoPayee) => no_payee += 1,
            Err(SkipReason::UnknownPayee) => unknown_payee += 1,
            Err(SkipReason::NoCategory) => no_category += 1,
        }
    }

    debug!(
        mappings = map.len(),
        deleted, no_payee, unknown_payee, no_category, "built payee to category map"
    );
    map
}
