use std::path::Path;

use datapackage_core::{DataPackageSchema, PresenceSet};
use datapackage_source::{FileSource, TextFileSource};

use crate::CliError;

const TABLE_EXTENSIONS: &[&str] = &["txt", "csv", "tsv"];

/// Collect text sources in `dir` whose file stem names a declared table.
///
/// Entries are returned sorted by path; files for unknown tables are skipped.
pub fn discover_sources(
    dir: &Path,
    schema: &DataPackageSchema,
) -> Result<Vec<TextFileSource>, CliError> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_table_file = path.is_file()
            && path.extension().is_some_and(|ext| {
                TABLE_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            });
        if is_table_file {
            paths.push(path);
        }
    }
    paths.sort();

    let mut sources = Vec::new();
    for path in paths {
        let mut source = TextFileSource::from_path(&path);
        if schema.table_schema_by_name(&source.name).is_none() {
            tracing::warn!(event = "unknown_table_file", path = %path.display());
            continue;
        }
        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        {
            source.set_fields_terminated_by(",");
            source.set_fields_enclosed_by(Some("\"".to_string()));
        }
        tracing::debug!(
            event = "table_discovered",
            table = %source.name,
            suffix = source.preferred_file_suffix()
        );
        sources.push(source);
    }

    Ok(sources)
}

/// Presence set from discovered sources plus explicitly named tables.
pub fn presence_from(sources: &[TextFileSource], explicit: &[String]) -> PresenceSet {
    sources
        .iter()
        .map(|source| source.name.clone())
        .chain(explicit.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use datapackage_core::TableSchema;

    use super::*;

    #[test]
    fn discovers_declared_tables_only() {
        let mut dir = std::env::temp_dir();
        dir.push(format!("datapackage_discover_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).expect("create temp dir");
        fs::write(dir.join("occurrence.txt"), "id\n1\n").expect("write occurrence");
        fs::write(dir.join("event.csv"), "id\n1\n").expect("write event");
        fs::write(dir.join("notes.txt"), "hello\n").expect("write notes");
        fs::write(dir.join("README.md"), "# readme\n").expect("write readme");

        let schema = DataPackageSchema {
            identifier: "dwc-dp".to_string(),
            table_schemas: vec![TableSchema::new("event"), TableSchema::new("occurrence")],
            ..DataPackageSchema::default()
        };

        let sources = discover_sources(&dir, &schema).expect("discover");
        let names: Vec<&str> = sources.iter().map(|source| source.name.as_str()).collect();
        assert_eq!(names, vec!["event", "occurrence"]);
        assert_eq!(sources[0].fields_terminated_by(), ",");

        let presence = presence_from(&sources, &["multimedia".to_string()]);
        assert_eq!(presence.len(), 3);
        assert!(presence.contains("multimedia"));
    }
}
