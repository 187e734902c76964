use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::error::{Result, SourceError};

/// Dialect used to split a delimited text file into fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    pub delimiter: u8,
    pub quote: Option<u8>,
    /// Leading records to skip; the first one is kept as the header.
    pub header_lines: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            delimiter: b'\t',
            quote: None,
            header_lines: 0,
        }
    }
}

/// Lazy iterator over the data rows of a delimited text file.
///
/// Header records are consumed on open. Records whose fields are all blank
/// are skipped everywhere: they never count as header lines or as rows.
pub struct RowIterator {
    records: csv::StringRecordsIntoIter<File>,
    header: Option<Vec<String>>,
    read_rows: usize,
}

impl RowIterator {
    pub fn open(path: &Path, options: ReaderOptions) -> Result<Self> {
        let mut records = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quoting(options.quote.is_some())
            .quote(options.quote.unwrap_or(b'"'))
            .has_headers(false)
            .flexible(true)
            .from_path(path)?
            .into_records();

        let mut header = None;
        let mut skipped = 0;
        while skipped < options.header_lines {
            let Some(record) = records.next() else {
                break;
            };
            let record = record?;
            if is_blank(&record) {
                continue;
            }
            if skipped == 0 {
                header = Some(to_fields(&record));
            }
            skipped += 1;
        }

        Ok(Self {
            records,
            header,
            read_rows: 0,
        })
    }

    /// First skipped header record, if any header lines were configured.
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Number of data rows yielded so far.
    pub fn read_rows(&self) -> usize {
        self.read_rows
    }
}

impl Iterator for RowIterator {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(err) => return Some(Err(SourceError::from(err))),
            };
            if is_blank(&record) {
                continue;
            }
            self.read_rows += 1;
            return Some(Ok(to_fields(&record)));
        }
    }
}

/// Read only the first record of the file.
pub fn first_record(path: &Path, options: ReaderOptions) -> Result<Option<Vec<String>>> {
    let header_options = ReaderOptions {
        header_lines: 0,
        ..options
    };
    RowIterator::open(path, header_options)?.next().transpose()
}

/// Line numbers (1-based) that hold no data outside quoted fields.
///
/// A line is empty when it contains only whitespace, delimiters and quote
/// characters, and neither starts nor ends inside a quoted field.
pub fn scan_empty_lines<R: BufRead>(
    reader: R,
    options: ReaderOptions,
) -> io::Result<BTreeSet<usize>> {
    let mut empty = BTreeSet::new();
    let mut in_quotes = false;

    for (idx, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        let bytes = line.strip_suffix(b"\r").unwrap_or(line.as_slice());
        let started_in_quotes = in_quotes;
        let mut blank = true;

        for &byte in bytes {
            if Some(byte) == options.quote {
                in_quotes = !in_quotes;
            } else if byte != options.delimiter && !byte.is_ascii_whitespace() {
                blank = false;
            }
        }

        if blank && !started_in_quotes && !in_quotes {
            empty.insert(idx + 1);
        }
    }

    Ok(empty)
}

pub(crate) fn scan_empty_lines_in_file(
    path: &Path,
    options: ReaderOptions,
) -> Result<BTreeSet<usize>> {
    let file = File::open(path)?;
    Ok(scan_empty_lines(BufReader::new(file), options)?)
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

fn to_fields(record: &csv::StringRecord) -> Vec<String> {
    record.iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tabs() -> ReaderOptions {
        ReaderOptions::default()
    }

    #[test]
    fn blank_and_delimiter_only_lines_are_empty() {
        let data = "id\tname\n1\ta\n\n\t\n  \n2\tb\n";
        let empty = scan_empty_lines(data.as_bytes(), tabs()).expect("scan");
        assert_eq!(empty.into_iter().collect::<Vec<_>>(), vec![3, 4, 5]);
    }

    fn write_temp(contents: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("datapackage_reader_{}.txt", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).expect("write temp file");
        path
    }

    #[test]
    fn blank_leading_record_is_not_the_header() {
        let path = write_temp("\t\t\nid\tname\n1\tx\n");
        let options = ReaderOptions {
            header_lines: 1,
            ..tabs()
        };

        let mut rows = RowIterator::open(&path, options).expect("open rows");
        assert_eq!(
            rows.header(),
            Some(&["id".to_string(), "name".to_string()][..])
        );
        let collected: Vec<Vec<String>> = rows.by_ref().map(|row| row.expect("row")).collect();
        assert_eq!(collected, vec![vec!["1".to_string(), "x".to_string()]]);
        assert_eq!(rows.read_rows(), 1);

        let first = first_record(&path, options).expect("first record");
        assert_eq!(first.as_deref(), rows.header());
    }

    #[test]
    fn quoted_line_breaks_are_not_empty() {
        let options = ReaderOptions {
            delimiter: b',',
            quote: Some(b'"'),
            header_lines: 0,
        };
        let data = "id,notes\r\n1,\"first\r\n\r\nthird\"\r\n\r\n2,\"\"\r\n";
        let empty = scan_empty_lines(data.as_bytes(), options).expect("scan");
        assert_eq!(empty.into_iter().collect::<Vec<_>>(), vec![5]);
    }
}
