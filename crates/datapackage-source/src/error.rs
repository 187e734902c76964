use thiserror::Error;

/// Errors emitted while reading delimited text sources.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid delimiter: {0:?}")]
    InvalidDelimiter(String),
    #[error("invalid quote character: {0:?}")]
    InvalidQuote(String),
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),
    #[error("no file set for source {0}")]
    MissingFile(String),
}

/// Result type for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;
