//! Statement normalization: raw S-Bank rows -> canonical ledger rows.
//!
//! Each step is a pure function from one record shape to the next:
//!
//! ```text
//! RawRecord --fold--> RawRecord --project--> ProjectedRecord
//!     --split_sign--> SignedRecord --payee/memo/date--> CanonicalTransaction
//! ```

use chrono::NaiveDate;
use pankki_core::CanonicalTransaction;
use regex::Regex;
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::error::NormalizeError;
use crate::parsers::sbank::read_sbank_csv;
use crate::types::RawRecord;

/// Payer names containing this (any case) are a mobile-payment intermediary;
/// the real counterparty is in the message.
pub const MOBILEPAY_MARKER: &str = "VIPPS MOBILEPAY";

pub const MEMO_DELIMITER: &str = " | ";

fn value_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<day>\d{1,2})\.(?P<month>\d{1,2})\.(?P<year>\d{4})$").expect("invalid value date regex")
    })
}

/// Row after projection: value date renamed, identifier columns gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedRecord {
    pub line: u64,
    pub date: String,
    pub payer: String,
    pub payee_name: String,
    pub message: String,
    pub kind: String,
    pub amount: Decimal,
}

/// Row after the signed amount has been split into outflow and inflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRecord {
    pub line: u64,
    pub date: String,
    pub payer: String,
    pub payee_name: String,
    pub message: String,
    pub kind: String,
    pub outflow: Decimal,
    pub inflow: Decimal,
}

/// Replace `ä ö Ä Ö` with their unaccented ASCII letters.
pub fn fold_text(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'ä' => 'a',
            'ö' => 'o',
            'Ä' => 'A',
            'Ö' => 'O',
            other => other,
        })
        .collect()
}

/// Fold the four free-text columns.
pub fn fold_record(raw: RawRecord) -> RawRecord {
    RawRecord {
        payer: fold_text(&raw.payer),
        payee_name: fold_text(&raw.payee_name),
        message: fold_text(&raw.message),
        kind: fold_text(&raw.kind),
        ..raw
    }
}

pub fn project(raw: RawRecord) -> ProjectedRecord {
    ProjectedRecord {
        line: raw.line,
        date: raw.value_date,
        payer: raw.payer,
        payee_name: raw.payee_name,
        message: raw.message,
        kind: raw.kind,
        amount: raw.amount,
    }
}

/// Split the signed amount. Returns `None` for zero-amount rows.
pub fn split_sign(rec: ProjectedRecord) -> Option<SignedRecord> {
    let outflow = if rec.amount < Decimal::ZERO { rec.amount.abs() } else { Decimal::ZERO };
    let inflow = if rec.amount > Decimal::ZERO { rec.amount } else { Decimal::ZERO };
    if outflow.is_zero() && inflow.is_zero() {
        return None;
    }

    Some(SignedRecord {
        line: rec.line,
        date: rec.date,
        payer: rec.payer,
        payee_name: rec.payee_name,
        message: rec.message,
        kind: rec.kind,
        outflow,
        inflow,
    })
}

/// Counterparty for a row, based on its direction.
pub fn infer_payee(rec: &SignedRecord) -> String {
    let out = !rec.outflow.is_zero();
    let inc = !rec.inflow.is_zero();

    if out && !inc {
        return rec.payee_name.clone();
    }
    if inc && !out {
        if rec.payer.to_uppercase().contains(MOBILEPAY_MARKER) {
            return rec.message.clone();
        }
        return rec.payer.clone();
    }
    String::new()
}

pub fn synthesize_memo(kind: &str, message: &str) -> String {
    format!("{kind}{MEMO_DELIMITER}{message}")
}

fn reparse_date(line: u64, value: &str) -> Result<NaiveDate, NormalizeError> {
    let bad = || NormalizeError::DateParse {
        line,
        value: value.to_string(),
    };
    let caps = value_date_re().captures(value.trim()).ok_or_else(bad)?;
    let day: u32 = caps["day"].parse().map_err(|_| bad())?;
    let month: u32 = caps["month"].parse().map_err(|_| bad())?;
    let year: i32 = caps["year"].parse().map_err(|_| bad())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(bad)
}

/// Normalize raw export rows into canonical transactions, preserving the
/// order of the surviving rows.
pub fn normalize(raw: Vec<RawRecord>) -> Result<Vec<CanonicalTransaction>, NormalizeError> {
    let total = raw.len();

    let signed: Vec<SignedRecord> = raw
        .into_iter()
        .map(fold_record)
        .map(project)
        .filter_map(split_sign)
        .collect();
    debug!(
        rows = signed.len(),
        dropped = total - signed.len(),
        inflows = signed.iter().filter(|r| !r.inflow.is_zero()).count(),
        outflows = signed.iter().filter(|r| !r.outflow.is_zero()).count(),
        "split amounts into outflow/inflow"
    );

    let mut out = Vec::with_capacity(signed.len());
    for rec in signed {
        let payee = infer_payee(&rec);
        let memo = synthesize_memo(&rec.kind, &rec.message);
        let date = reparse_date(rec.line, &rec.date)?;
        out.push(CanonicalTransaction {
            date,
            payee,
            memo,
            outflow: rec.outflow,
            inflow: rec.inflow,
        });
    }

    debug!(
        rows = out.len(),
        missing_payee = out.iter().filter(|t| t.payee.is_empty()).count(),
        "statement normalized"
    );
    Ok(out)
}

/// Read and normalize an S-Bank export file.
pub fn normalize_file(path: impl AsRef<Path>) -> Result<Vec<CanonicalTransaction>, NormalizeError> {
    let path = path.as_ref();
    info!(path = %path.display(), "reading and normalizing statement");
    let raw = read_sbank_csv(path)?;
    normalize(raw)
}
