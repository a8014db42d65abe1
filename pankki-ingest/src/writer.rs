//! Normalized CSV output: `Date;Payee;Memo;Outflow;Inflow` with comma decimals.

use pankki_core::CanonicalTransaction;
use rust_decimal::{Decimal, RoundingStrategy};
use std::io::Write;
use std::path::Path;

use crate::error::NormalizeError;

pub const OUTPUT_HEADER: [&str; 5] = ["Date", "Payee", "Memo", "Outflow", "Inflow"];

/// Two decimals, comma separator: `15.5 -> "15,50"`.
pub fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}").replace('.', ",")
}

pub fn write_normalized<W: Write>(writer: W, rows: &[CanonicalTransaction]) -> Result<(), NormalizeError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);

    wtr.write_record(OUTPUT_HEADER)?;
    for t in rows {
        wtr.write_record([
            t.iso_date(),
            t.payee.clone(),
            t.memo.clone(),
            format_amount(t.outflow),
            format_amount(t.inflow),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write rows to `path`, creating parent directories as needed.
pub fn write_normalized_csv(path: impl AsRef<Path>, rows: &[CanonicalTransaction]) -> Result<(), NormalizeError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_normalized(file, rows)
}
