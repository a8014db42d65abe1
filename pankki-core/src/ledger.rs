//! Canonical ledger rows produced by statement normalization.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amount::{AmountError, Milliunits, to_milliunits};

/// One normalized transaction: `Date, Payee, Memo, Outflow, Inflow`.
///
/// Exactly one of `outflow`/`inflow` is non-zero for rows coming out of the
/// normalizer; both are non-negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalTransaction {
    pub date: NaiveDate,
    pub payee: String,
    pub memo: String,
    pub outflow: Decimal,
    pub inflow: Decimal,
}

impl CanonicalTransaction {
    /// Convert outflow and inflow independently to milliunits.
    pub fn to_milliunits(&self) -> Result<MilliunitTransaction, AmountError> {
        Ok(MilliunitTransaction {
            date: self.date,
            payee: self.payee.clone(),
            memo: self.memo.clone(),
            outflow: to_milliunits(self.outflow)?,
            inflow: to_milliunits(self.inflow)?,
        })
    }

    /// ISO `YYYY-MM-DD` rendering of the date.
    pub fn iso_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// A canonical row whose amounts have been scaled to milliunits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilliunitTransaction {
    pub date: NaiveDate,
    pub payee: String,
    pub memo: String,
    pub outflow: Milliunits,
    pub inflow: Milliunits,
}

impl MilliunitTransaction {
    /// Signed amount: positive for inflow, negative for outflow.
    pub fn net(&self) -> Milliunits {
        self.inflow - self.outflow
    }
}
