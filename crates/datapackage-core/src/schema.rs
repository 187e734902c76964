use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::engine::{RequirementValidator, ValidationResult};
use crate::error::{Error, Result};
use crate::requirement::{PresenceSet, TableSchemaRequirement};
use crate::table::TableSchema;

/// Definition of a data package type: its table schemas and the rules on
/// which of them may appear together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataPackageSchema {
    /// Schema unique identifier.
    pub identifier: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_title: Option<String>,
    /// Schema name for internal usage.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Metadata profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default)]
    pub table_schemas: Vec<TableSchema>,
    #[serde(default)]
    pub table_schemas_requirements: TableSchemaRequirement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_latest: bool,
    #[serde(default)]
    pub is_updatable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued: Option<DateTime<Utc>>,
}

impl DataPackageSchema {
    pub fn table_schema_by_name(&self, name: &str) -> Option<&TableSchema> {
        self.table_schemas.iter().find(|table| table.name == name)
    }

    /// Append a table schema, keeping names unique within the package.
    pub fn add_table_schema(&mut self, table: TableSchema) -> Result<()> {
        if self.table_schema_by_name(&table.name).is_some() {
            return Err(Error::DuplicateTableSchema(table.name));
        }
        self.table_schemas.push(table);
        Ok(())
    }

    /// Names of every table schema the package type declares.
    pub fn table_schema_names(&self) -> PresenceSet {
        self.table_schemas
            .iter()
            .map(|table| table.name.clone())
            .collect()
    }

    /// Check a set of present tables against the package requirements.
    pub fn validate_tables(&self, presence: &PresenceSet) -> Result<ValidationResult> {
        RequirementValidator::new().validate(presence, &self.table_schemas_requirements)
    }
}

/// A concrete data package: the table schemas actually instantiated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataPackage {
    pub name: String,
    /// Identifier of the [`DataPackageSchema`] the package conforms to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default)]
    pub table_schemas: Vec<TableSchema>,
}

impl DataPackage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Names of the table schemas present in this package.
    pub fn presence(&self) -> PresenceSet {
        self.table_schemas
            .iter()
            .map(|table| table.name.clone())
            .collect()
    }

    /// Validate this package's table composition against its schema.
    pub fn validate_against(&self, schema: &DataPackageSchema) -> Result<ValidationResult> {
        let presence = self.presence();
        let result = schema.validate_tables(&presence)?;
        tracing::debug!(
            event = "package_validated",
            package = %self.name,
            schema = %schema.identifier,
            tables = presence.len(),
            valid = result.is_valid()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camtrap_schema() -> DataPackageSchema {
        DataPackageSchema {
            identifier: "camtrap-dp".to_string(),
            name: "camtrap".to_string(),
            table_schemas: vec![
                TableSchema::new("deployments"),
                TableSchema::new("media"),
                TableSchema::new("observations"),
            ],
            table_schemas_requirements: TableSchemaRequirement {
                required: vec!["deployments".to_string(), "media".to_string()],
                ..TableSchemaRequirement::default()
            },
            ..DataPackageSchema::default()
        }
    }

    #[test]
    fn add_table_schema_rejects_duplicates() {
        let mut schema = camtrap_schema();
        schema
            .add_table_schema(TableSchema::new("events"))
            .expect("add new table");
        let err = schema
            .add_table_schema(TableSchema::new("media"))
            .unwrap_err();
        assert_eq!(err, Error::DuplicateTableSchema("media".to_string()));
        assert_eq!(schema.table_schemas.len(), 4);
    }

    #[test]
    fn package_presence_drives_validation() {
        let schema = camtrap_schema();
        let mut package = DataPackage::new("survey-2024");
        package.table_schemas.push(TableSchema::new("deployments"));

        let result = package.validate_against(&schema).expect("validate");
        assert!(!result.is_valid());

        package.table_schemas.push(TableSchema::new("media"));
        let result = package.validate_against(&schema).expect("validate");
        assert!(result.is_valid());
        assert!(schema.table_schema_by_name("observations").is_some());
        assert_eq!(schema.table_schema_names().len(), 3);
    }
}
