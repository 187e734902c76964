//! Delimited text file sources for data packages.
//!
//! A [`TextFileSource`] describes a CSV or tab file on disk and knows how to
//! stream its rows, report its header and count rows, columns and empty
//! lines.

pub mod error;
pub mod escape;
pub mod reader;
pub mod source;

pub use error::{Result, SourceError};
pub use reader::{ReaderOptions, RowIterator};
pub use source::{FileSource, SourceType, TextFileSource};
