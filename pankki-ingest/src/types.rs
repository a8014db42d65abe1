use rust_decimal::Decimal;

/// One row of an S-Bank export, in the bank's own schema.
///
/// Identifier columns are kept only so the projection step has something to
/// drop; nothing downstream reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// Line number in the source file, for diagnostics.
    pub line: u64,
    pub payer: String,
    pub payee_name: String,
    pub message: String,
    /// Transaction type label, e.g. `KORTTIOSTO`.
    pub kind: String,
    /// Value date as exported (`d.m.Y`).
    pub value_date: String,
    /// Signed amount; negative is money leaving the account.
    pub amount: Decimal,
    pub booking_date: Option<String>,
    pub payee_account: Option<String>,
    pub payee_bic: Option<String>,
    pub reference: Option<String>,
    pub archive_id: Option<String>,
}
