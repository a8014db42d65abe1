//! Bank-specific export parsers. Each one yields [`RawRecord`](crate::types::RawRecord)s.

pub mod sbank;
