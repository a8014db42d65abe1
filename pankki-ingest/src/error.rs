use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("statement header is missing column `{0}`")]
    Schema(String),

    #[error("line {line}: date `{value}` is not in day.month.year form")]
    DateParse { line: u64, value: String },

    #[error("line {line}: amount `{value}` is not a decimal number")]
    Amount { line: u64, value: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
