//! pankki-ingest: S-Bank statement export parsing and normalization into canonical ledger rows.

pub mod error;
pub mod normalize;
pub mod parsers;
pub mod types;
pub mod writer;

pub use error::NormalizeError;
pub use normalize::{normalize, normalize_file};
pub use parsers::sbank::{read_sbank_csv, read_sbank_from_reader};
pub use types::RawRecord;
pub use writer::{write_normalized, write_normalized_csv};
