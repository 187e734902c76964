use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::{Result, SourceError};
use crate::escape::{escape, unescape};
use crate::reader::{self, ReaderOptions, RowIterator};

const SUFFIX: &str = ".txt";
const UTF_8: &str = "UTF-8";

/// Kind of source backing a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    TextFile,
}

/// Trait implemented by file-backed table sources.
pub trait FileSource {
    fn source_type(&self) -> SourceType;

    fn file(&self) -> Option<&Path>;

    fn preferred_file_suffix(&self) -> &'static str;

    /// Stream the data rows, skipping configured header lines.
    fn row_iterator(&self) -> Result<RowIterator>;

    /// Column names, or generated `Column #n` labels without a header.
    fn columns(&self) -> Result<Vec<String>>;

    /// Read the whole file, record its statistics and return the numbers of
    /// its empty lines.
    fn analyze(&mut self) -> Result<BTreeSet<usize>>;
}

/// A delimited text file based source such as CSV or tab files.
#[derive(Debug, Clone)]
pub struct TextFileSource {
    pub name: String,
    file: Option<PathBuf>,
    fields_terminated_by: String,
    fields_enclosed_by: Option<String>,
    ignore_header_lines: usize,
    encoding: String,
    file_size: u64,
    rows: usize,
    columns: usize,
    readable: bool,
    last_modified: Option<DateTime<Utc>>,
}

impl TextFileSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: None,
            fields_terminated_by: "\t".to_string(),
            fields_enclosed_by: None,
            ignore_header_lines: 0,
            encoding: UTF_8.to_string(),
            file_size: 0,
            rows: 0,
            columns: 0,
            readable: false,
            last_modified: None,
        }
    }

    /// Create a source for `path`, named after the file stem.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut source = Self::new(name);
        source.file = Some(path);
        source
    }

    pub fn set_file(&mut self, file: impl Into<PathBuf>) {
        self.file = Some(file.into());
    }

    pub fn fields_terminated_by(&self) -> &str {
        &self.fields_terminated_by
    }

    pub fn set_fields_terminated_by(&mut self, delimiter: impl Into<String>) {
        self.fields_terminated_by = delimiter.into();
    }

    pub fn fields_terminated_by_escaped(&self) -> String {
        escape(&self.fields_terminated_by)
    }

    pub fn set_fields_terminated_by_escaped(&mut self, delimiter: &str) {
        self.fields_terminated_by = unescape(delimiter);
    }

    pub fn fields_enclosed_by(&self) -> Option<&str> {
        self.fields_enclosed_by.as_deref()
    }

    pub fn set_fields_enclosed_by(&mut self, quote: Option<String>) {
        self.fields_enclosed_by = quote;
    }

    pub fn fields_enclosed_by_escaped(&self) -> Option<String> {
        self.fields_enclosed_by.as_deref().map(escape)
    }

    pub fn set_fields_enclosed_by_escaped(&mut self, quote: Option<&str>) {
        self.fields_enclosed_by = quote.map(unescape);
    }

    /// First character of the enclosing string, if one is set.
    pub fn field_quote_char(&self) -> Option<char> {
        self.fields_enclosed_by
            .as_deref()
            .and_then(|quote| quote.chars().next())
    }

    pub fn ignore_header_lines(&self) -> usize {
        self.ignore_header_lines
    }

    /// `None` resets to zero header lines.
    pub fn set_ignore_header_lines(&mut self, lines: Option<usize>) {
        self.ignore_header_lines = lines.unwrap_or(0);
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn set_encoding(&mut self, encoding: impl Into<String>) {
        self.encoding = encoding.into();
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    /// The first record of the file, regardless of header settings.
    pub fn header(&self) -> Result<Option<Vec<String>>> {
        reader::first_record(self.path()?, self.reader_options()?)
    }

    fn path(&self) -> Result<&Path> {
        self.file
            .as_deref()
            .ok_or_else(|| SourceError::MissingFile(self.name.clone()))
    }

    fn reader_options(&self) -> Result<ReaderOptions> {
        if !self.encoding.eq_ignore_ascii_case(UTF_8) && !self.encoding.eq_ignore_ascii_case("UTF8")
        {
            return Err(SourceError::UnsupportedEncoding(self.encoding.clone()));
        }

        let delimiter = match self.fields_terminated_by.as_bytes() {
            [byte] => *byte,
            _ => {
                return Err(SourceError::InvalidDelimiter(
                    self.fields_terminated_by.clone(),
                ));
            }
        };

        let quote = match self.field_quote_char() {
            None => None,
            Some(ch) if ch.is_ascii() => Some(ch as u8),
            Some(ch) => return Err(SourceError::InvalidQuote(ch.to_string())),
        };

        Ok(ReaderOptions {
            delimiter,
            quote,
            header_lines: self.ignore_header_lines,
        })
    }
}

impl FileSource for TextFileSource {
    fn source_type(&self) -> SourceType {
        SourceType::TextFile
    }

    fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    fn preferred_file_suffix(&self) -> &'static str {
        SUFFIX
    }

    fn row_iterator(&self) -> Result<RowIterator> {
        RowIterator::open(self.path()?, self.reader_options()?)
    }

    fn columns(&self) -> Result<Vec<String>> {
        let header = self.header()?.unwrap_or_default();
        if self.ignore_header_lines > 0 {
            return Ok(header);
        }
        Ok((1..=header.len())
            .map(|idx| format!("Column #{idx}"))
            .collect())
    }

    fn analyze(&mut self) -> Result<BTreeSet<usize>> {
        let path = self.path()?.to_path_buf();
        let options = self.reader_options()?;

        let metadata = std::fs::metadata(&path)?;
        self.file_size = metadata.len();
        self.last_modified = metadata.modified().ok().map(DateTime::<Utc>::from);

        let mut rows = RowIterator::open(&path, options)?;
        for row in rows.by_ref() {
            row?;
        }

        // Same record that `columns()` labels, header lines or not.
        self.columns = reader::first_record(&path, options)?.map_or(0, |record| record.len());
        self.rows = rows.read_rows();
        self.readable = true;

        let empty_lines = reader::scan_empty_lines_in_file(&path, options)?;
        tracing::debug!(
            event = "source_analyzed",
            source = %self.name,
            rows = self.rows,
            columns = self.columns,
            empty_lines = empty_lines.len()
        );
        Ok(empty_lines)
    }
}
