//! S-Bank (S-Pankki) account export parser
//!
//! Exports are `;`-delimited with a comma decimal separator and Finnish headers:
//!   Kirjauspäivä;Maksupäivä;Summa;Tapahtumalaji;Maksaja;Saajan nimi;
//!   Saajan tilinumero;Saajan BIC-tunnus;Viitenumero;Viesti;Arkistointitunnus
//!
//! Column order is not relied upon; columns are looked up by header name.

use csv::StringRecord;
use rust_decimal::Decimal;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::error::NormalizeError;
use crate::types::RawRecord;

pub const PAYER: &str = "Maksaja";
pub const PAYEE_NAME: &str = "Saajan nimi";
pub const MESSAGE: &str = "Viesti";
pub const KIND: &str = "Tapahtumalaji";
pub const VALUE_DATE: &str = "Maksupäivä";
pub const AMOUNT: &str = "Summa";
pub const BOOKING_DATE: &str = "Kirjauspäivä";
pub const PAYEE_ACCOUNT: &str = "Saajan tilinumero";
pub const PAYEE_BIC: &str = "Saajan BIC-tunnus";
pub const REFERENCE: &str = "Viitenumero";
pub const ARCHIVE_ID: &str = "Arkistointitunnus";

/// Header positions resolved once per file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Columns {
    payer: usize,
    payee_name: usize,
    message: usize,
    kind: usize,
    value_date: usize,
    amount: usize,
    booking_date: Option<usize>,
    payee_account: Option<usize>,
    payee_bic: Option<usize>,
    reference: Option<usize>,
    archive_id: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, NormalizeError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
        };
        let require = |name: &str| find(name).ok_or_else(|| NormalizeError::Schema(name.to_string()));

        Ok(Self {
            payer: require(PAYER)?,
            payee_name: require(PAYEE_NAME)?,
            message: require(MESSAGE)?,
            kind: require(KIND)?,
            value_date: require(VALUE_DATE)?,
            amount: require(AMOUNT)?,
            booking_date: find(BOOKING_DATE),
            payee_account: find(PAYEE_ACCOUNT),
            payee_bic: find(PAYEE_BIC),
            reference: find(REFERENCE),
            archive_id: find(ARCHIVE_ID),
        })
    }
}

/// Parse an export amount such as `-1 234,56` or `+12,00`.
///
/// An empty cell is `Some(0)`, which later drops the row like any other
/// zero-amount line.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    if cleaned.is_empty() {
        return Some(Decimal::ZERO);
    }
    cleaned.parse().ok()
}

/// Read an S-Bank export file into raw records.
pub fn read_sbank_csv(path: impl AsRef<Path>) -> Result<Vec<RawRecord>, NormalizeError> {
    let file = std::fs::File::open(path.as_ref())?;
    read_sbank_from_reader(file)
}

/// Read S-Bank export rows from any reader. Fails with
/// [`NormalizeError::Schema`] before reading any row if a required column is
/// absent from the header.
pub fn read_sbank_from_reader<R: Read>(reader: R) -> Result<Vec<RawRecord>, NormalizeError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let cols = Columns::resolve(&headers)?;
    debug!(columns = ?headers.iter().collect::<Vec<_>>(), "resolved statement header");

    let mut out = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let cell = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();
        let optional = |idx: Option<usize>| idx.map(|i| record.get(i).unwrap_or("").trim().to_string());

        // Trailing blank lines in some exports
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        let amount_raw = cell(cols.amount);
        let amount = parse_amount(&amount_raw).ok_or(NormalizeError::Amount {
            line,
            value: amount_raw.clone(),
        })?;

        out.push(RawRecord {
            line,
            payer: cell(cols.payer),
            payee_name: cell(cols.payee_name),
            message: cell(cols.message),
            kind: cell(cols.kind),
            value_date: cell(cols.value_date),
            amount,
            booking_date: optional(cols.booking_date),
            payee_account: optional(cols.payee_account),
            payee_bic: optional(cols.payee_bic),
            reference: optional(cols.reference),
            archive_id: optional(cols.archive_id),
        });
    }

    debug!(rows = out.len(), "statement rows read");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Kirjauspäivä;Maksupäivä;Summa;Tapahtumalaji;Maksaja;Saajan nimi;Saajan tilinumero;Saajan BIC-tunnus;Viitenumero;Viesti;Arkistointitunnus";

    #[test]
    fn test_parse_amount_variants() {
        assert_eq!(parse_amount("-15,50"), Some("-15.50".parse().unwrap()));
        assert_eq!(parse_amount("+12,00"), Some("12.00".parse().unwrap()));
        assert_eq!(parse_amount("-1 234,56"), Some("-1234.56".parse().unwrap()));
        assert_eq!(parse_amount("1\u{a0}000,00"), Some("1000.00".parse().unwrap()));
        assert_eq!(parse_amount(""), Some(Decimal::ZERO));
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn test_reads_rows_by_header_name() {
        let text = format!(
            "{HEADER}\n02.01.2024;02.01.2024;-15,50;OSTO;MATTI;Kauppa Oy;;;;Lounas;A1\n"
        );
        let rows = read_sbank_from_reader(text.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.line, 2);
        assert_eq!(r.payee_name, "Kauppa Oy");
        assert_eq!(r.kind, "OSTO");
        assert_eq!(r.message, "Lounas");
        assert_eq!(r.value_date, "02.01.2024");
        assert_eq!(r.amount, "-15.50".parse::<Decimal>().unwrap());
        assert_eq!(r.archive_id.as_deref(), Some("A1"));
        assert_eq!(r.reference.as_deref(), Some(""));
    }

    #[test]
    fn test_identifier_columns_are_optional() {
        let text = "Maksupäivä;Summa;Tapahtumalaji;Maksaja;Saajan nimi;Viesti\n1.2.2024;5,00;PANO;Liisa;Matti;Kiitos\n";
        let rows = read_sbank_from_reader(text.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].booking_date.is_none());
        assert!(rows[0].archive_id.is_none());
    }

    #[test]
    fn test_missing_value_date_is_schema_error() {
        let text = "Kirjauspäivä;Summa;Tapahtumalaji;Maksaja;Saajan nimi;Viesti\n";
        let err = read_sbank_from_reader(text.as_bytes()).unwrap_err();
        match err {
            NormalizeError::Schema(col) => assert_eq!(col, VALUE_DATE),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_amount_reports_line() {
        let text = format!("{HEADER}\n02.01.2024;02.01.2024;kymppi;OSTO;MATTI;Kauppa;;;;x;A1\n");
        let err = read_sbank_from_reader(text.as_bytes()).unwrap_err();
        assert!(matches!(err, NormalizeError::Amount { line: 2, .. }), "{err:?}");
    }

    #[test]
    fn test_bom_prefixed_header() {
        let text = "\u{feff}Maksupäivä;Summa;Tapahtumalaji;Maksaja;Saajan nimi;Viesti\n1.2.2024;-5,00;OSTO;Liisa;Kauppa Oy;x\n";
        let rows = read_sbank_from_reader(text.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value_date, "1.2.2024");

        let headers = StringRecord::from(vec!["\u{feff}Maksupäivä", "Summa", "Tapahtumalaji", "Maksaja", "Saajan nimi", "Viesti"]);
        assert_eq!(Columns::resolve(&headers).unwrap().value_date, 0);
    }

    #[test]
    fn test_headers_only_yields_no_rows() {
        let text = format!("{HEADER}\n");
        assert!(read_sbank_from_reader(text.as_bytes()).unwrap().is_empty());
    }
}
