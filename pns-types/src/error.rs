use thiserror::Error;

/// Validation errors for names and resolver data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PnsError {
    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("invalid protocol parameters: {0}")]
    InvalidParams(String),

    #[error("invalid price table: {0}")]
    InvalidPriceTable(String),
}
