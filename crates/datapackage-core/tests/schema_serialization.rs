use datapackage_core::{DataPackageSchema, TableSchema, TableSchemaRequirement};
use schemars::schema_for;

#[test]
fn serializes_requirements_deterministically() {
    let schema = DataPackageSchema {
        identifier: "dwc-dp".to_string(),
        name: "dwc-dp".to_string(),
        version: "0.1".to_string(),
        table_schemas: vec![TableSchema::new("event")],
        table_schemas_requirements: TableSchemaRequirement {
            applicable_if_present_any: vec!["event".to_string()],
            required: vec!["event".to_string()],
            ..TableSchemaRequirement::default()
        },
        ..DataPackageSchema::default()
    };

    let json = serde_json::to_string_pretty(&schema).expect("serialize schema");
    let expected = r#"{
  "identifier": "dwc-dp",
  "title": "",
  "name": "dwc-dp",
  "version": "0.1",
  "tableSchemas": [
    {
      "name": "event",
      "fields": []
    }
  ],
  "tableSchemasRequirements": {
    "applicableIfPresentAny": [
      "event"
    ],
    "required": [
      "event"
    ]
  },
  "isLatest": false,
  "isUpdatable": false
}"#;
    assert_eq!(json, expected);

    let parsed: DataPackageSchema = serde_json::from_str(&json).expect("parse schema");
    assert_eq!(parsed, schema);
}

#[test]
fn json_schema_describes_requirement_tree() {
    let generated = schema_for!(DataPackageSchema);
    let json = serde_json::to_value(&generated).expect("serialize generated schema");

    let requirement = &json["definitions"]["TableSchemaRequirement"]["properties"];
    for key in [
        "applicableIfPresentAny",
        "allOf",
        "anyOf",
        "oneOf",
        "required",
        "requiredAny",
        "prohibited",
    ] {
        assert!(requirement.get(key).is_some(), "missing property {key}");
    }
}
