use thiserror::Error;

/// Core error type shared across datapackage crates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The package schema violates internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    /// A table schema with the same name is already part of the package.
    #[error("duplicate table schema: {0}")]
    DuplicateTableSchema(String),
    /// The requirement tree nests deeper than the validator allows.
    #[error("requirement tree exceeds maximum depth of {limit}")]
    MaxDepthExceeded { limit: usize },
}

/// Convenience alias for results returned by datapackage crates.
pub type Result<T> = std::result::Result<T, Error>;
