//! Core contracts for data packages.
//!
//! This crate defines the package and table schema types, the requirement
//! tree that declares which table combinations a package accepts, and the
//! engine that evaluates that tree against the tables actually present.

pub mod engine;
pub mod error;
pub mod requirement;
pub mod schema;
pub mod table;
pub mod validation;

pub use engine::{
    DEFAULT_MAX_DEPTH, ReasonMode, RequirementObserver, RequirementValidator, TracingObserver,
    ValidationResult, validate_requirements,
};
pub use error::{Error, Result};
pub use requirement::{PresenceSet, TableSchemaRequirement};
pub use schema::{DataPackage, DataPackageSchema};
pub use table::{FieldConstraints, FieldType, TableSchema, TableSchemaField};
pub use validation::validate_package_schema;
