//! YNAB-side types: upload payloads and the subset of remote objects we read.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::amount::Milliunits;

/// Destination account for every uploaded transaction.
pub const DEFAULT_ACCOUNT_ID: &str = "f51e3268-bcf8-4f2a-9572-90f1302d6739";

/// Category used when no history exists for a payee.
pub const DEFAULT_CATEGORY_ID: &str = "54d95049-2a45-42ec-aff5-3eed77855044";

/// Remote payee id -> display name.
pub type PayeeDirectory = HashMap<String, String>;

/// Payee display name -> category id.
pub type PayeeCategoryMap = HashMap<String, String>;

/// One transaction in a bulk upload request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetEntry {
    pub account_id: String,
    pub date: NaiveDate,
    pub amount: Milliunits,
    pub payee_name: String,
    pub category_id: String,
    pub memo: String,
    /// De-duplication key; the service discards entries whose id it has seen.
    pub import_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payee {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub deleted: bool,
}

/// A transaction as returned by the transactions endpoint.
///
/// Only the fields used for category inference are modelled; everything else
/// in the response is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteTransaction {
    #[serde(default)]
    pub payee_id: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}
