//! pankki-core: ledger record types, milliunit conversion and the YNAB payload model

pub mod amount;
pub mod budget;
pub mod ledger;

pub use amount::{AmountError, Milliunits, MILLIUNITS_PER_UNIT, to_milliunits};
pub use budget::{
    BudgetEntry, Payee, PayeeCategoryMap, PayeeDirectory, RemoteTransaction,
    DEFAULT_ACCOUNT_ID, DEFAULT_CATEGORY_ID,
};
pub use ledger::{CanonicalTransaction, MilliunitTransaction};
