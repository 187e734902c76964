use std::collections::{BTreeMap, BTreeSet};

use crate::engine::DEFAULT_MAX_DEPTH;
use crate::error::{Error, Result};
use crate::schema::DataPackageSchema;

/// Validate internal consistency of a data package schema.
///
/// This checks:
/// - duplicate table schema names and duplicate field names
/// - primary key fields exist
/// - requirement rules only reference declared table schemas
/// - the requirement tree stays within the default depth limit
pub fn validate_package_schema(schema: &DataPackageSchema) -> Result<()> {
    let mut catalog: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for table in &schema.table_schemas {
        if catalog.contains_key(table.name.as_str()) {
            return Err(Error::InvalidSchema(format!(
                "duplicate table schema name: {}",
                table.name
            )));
        }

        let mut fields = BTreeSet::new();
        for field in &table.fields {
            if !fields.insert(field.name.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "duplicate field name: {}.{}",
                    table.name, field.name
                )));
            }
        }

        for key in &table.primary_key {
            if !fields.contains(key.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "primary key field not found: {}.{}",
                    table.name, key
                )));
            }
        }

        catalog.insert(table.name.as_str(), fields);
    }

    let requirements = &schema.table_schemas_requirements;
    let depth = requirements.depth();
    if depth > DEFAULT_MAX_DEPTH {
        return Err(Error::MaxDepthExceeded {
            limit: DEFAULT_MAX_DEPTH,
        });
    }

    for name in requirements.referenced_names() {
        if !catalog.contains_key(name) {
            return Err(Error::InvalidSchema(format!(
                "requirement references unknown table schema: {name}"
            )));
        }
    }

    Ok(())
}
