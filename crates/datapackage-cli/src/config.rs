use std::path::Path;

use clap::ValueEnum;
use datapackage_core::{DataPackageSchema, ReasonMode};
use serde::{Deserialize, Serialize};

use crate::CliError;

/// Output format for log records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// How failing `allOf` children are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonSetting {
    #[default]
    LastFailure,
    CollectAll,
}

impl From<ReasonSetting> for ReasonMode {
    fn from(value: ReasonSetting) -> Self {
        match value {
            ReasonSetting::LastFailure => ReasonMode::LastFailure,
            ReasonSetting::CollectAll => ReasonMode::CollectAll,
        }
    }
}

/// Settings read from an optional TOML file; flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliSettings {
    pub max_depth: Option<usize>,
    pub reasons: ReasonSetting,
    pub log_format: LogFormat,
    /// Default directory scanned for table files.
    pub data_dir: Option<std::path::PathBuf>,
}

pub fn load_settings(path: Option<&Path>) -> Result<CliSettings, CliError> {
    let Some(path) = path else {
        return Ok(CliSettings::default());
    };
    let content = std::fs::read_to_string(path)?;
    let settings = toml::from_str(&content)?;
    Ok(settings)
}

/// Load a package schema document, choosing TOML or JSON by extension.
pub fn load_schema(path: &Path) -> Result<DataPackageSchema, CliError> {
    let content = std::fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let schema = if is_toml {
        toml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };
    Ok(schema)
}
