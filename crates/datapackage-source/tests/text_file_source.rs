use std::fs;
use std::path::PathBuf;

use datapackage_source::{FileSource, SourceError, SourceType, TextFileSource};

fn write_temp(label: &str, contents: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("datapackage_source_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join(format!("{label}.txt"));
    fs::write(&path, contents).expect("write temp file");
    path
}

#[test]
fn analyze_counts_rows_columns_and_empty_lines() {
    let path = write_temp(
        "occurrence",
        "occurrenceID\tbasisOfRecord\tscientificName\n\
         occ-1\tHumanObservation\tPuma concolor\n\
         \n\
         occ-2\tPreservedSpecimen\tLynx lynx\n\
         \t\t\n",
    );
    let mut source = TextFileSource::from_path(&path);
    source.set_ignore_header_lines(Some(1));

    let empty_lines = source.analyze().expect("analyze");

    assert_eq!(source.name, "occurrence");
    assert_eq!(source.rows(), 2);
    assert_eq!(source.column_count(), 3);
    assert!(source.is_readable());
    assert!(source.file_size() > 0);
    assert!(source.last_modified().is_some());
    assert_eq!(empty_lines.into_iter().collect::<Vec<_>>(), vec![3, 5]);
}

#[test]
fn rows_skip_header_and_respect_quotes() {
    let path = write_temp(
        "event",
        "eventID,locality\n\"ev-1\",\"Rio, Brazil\"\n\"ev-2\",\"multi\nline\"\n",
    );
    let mut source = TextFileSource::from_path(&path);
    source.set_fields_terminated_by(",");
    source.set_fields_enclosed_by(Some("\"".to_string()));
    source.set_ignore_header_lines(Some(1));

    let mut rows = source.row_iterator().expect("open rows");
    assert_eq!(
        rows.header(),
        Some(&["eventID".to_string(), "locality".to_string()][..])
    );
    let collected: Vec<Vec<String>> = rows.by_ref().map(|row| row.expect("row")).collect();
    assert_eq!(
        collected,
        vec![
            vec!["ev-1".to_string(), "Rio, Brazil".to_string()],
            vec!["ev-2".to_string(), "multi\nline".to_string()],
        ]
    );
    assert_eq!(rows.read_rows(), 2);
}

#[test]
fn columns_use_header_or_generated_labels() {
    let path = write_temp("multimedia", "type\tidentifier\nStillImage\thttp://img\n");
    let mut source = TextFileSource::from_path(&path);

    assert_eq!(
        source.columns().expect("columns"),
        vec!["Column #1".to_string(), "Column #2".to_string()]
    );

    source.set_ignore_header_lines(Some(1));
    assert_eq!(
        source.columns().expect("columns"),
        vec!["type".to_string(), "identifier".to_string()]
    );
    assert_eq!(source.source_type(), SourceType::TextFile);
    assert_eq!(source.preferred_file_suffix(), ".txt");
}

#[test]
fn escaped_settings_round_trip() {
    let mut source = TextFileSource::new("taxon");
    assert_eq!(source.fields_terminated_by_escaped(), "\\t");

    source.set_fields_terminated_by_escaped("\\t");
    assert_eq!(source.fields_terminated_by(), "\t");

    source.set_fields_enclosed_by_escaped(Some("'"));
    assert_eq!(source.field_quote_char(), Some('\''));

    source.set_fields_enclosed_by_escaped(None);
    assert_eq!(source.field_quote_char(), None);
}

#[test]
fn rejects_multi_byte_delimiter_and_missing_file() {
    let mut source = TextFileSource::new("broken");
    assert!(matches!(
        source.row_iterator(),
        Err(SourceError::MissingFile(name)) if name == "broken"
    ));

    let path = write_temp("broken", "a||b\n");
    source.set_file(&path);
    source.set_fields_terminated_by("||");
    assert!(matches!(
        source.analyze(),
        Err(SourceError::InvalidDelimiter(_))
    ));
}

#[test]
fn column_count_matches_first_record_when_later_rows_are_wider() {
    let path = write_temp("measurement", "a\tb\n1\t2\t3\n");
    let mut source = TextFileSource::from_path(&path);

    source.analyze().expect("analyze");

    let columns = source.columns().expect("columns");
    assert_eq!(columns, vec!["Column #1".to_string(), "Column #2".to_string()]);
    assert_eq!(source.column_count(), columns.len());
    assert_eq!(source.rows(), 2);
}

#[test]
fn delimiter_only_first_line_does_not_shift_the_header() {
    let path = write_temp("identification", "\t\t\nid\tname\n1\tx\n");
    let mut source = TextFileSource::from_path(&path);
    source.set_ignore_header_lines(Some(1));

    let empty_lines = source.analyze().expect("analyze");

    assert_eq!(source.rows(), 1);
    assert_eq!(source.column_count(), 2);
    assert_eq!(
        source.columns().expect("columns"),
        vec!["id".to_string(), "name".to_string()]
    );
    assert_eq!(empty_lines.into_iter().collect::<Vec<_>>(), vec![1]);
}
