use hivebq_api::{HiveType, StructField};
use hivebq_temporal::{ZoneConfig, ZoneSettings};
use serde::Deserialize;

use crate::error::CliError;

/// Top-level configuration file.
///
/// ```toml
/// [zones]
/// local_timezone = "Asia/Kolkata"
/// timestamp_timezone = "UTC"
///
/// [[columns]]
/// name = "number"
/// type = "bigint"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConvertConfig {
    #[serde(default)]
    pub zones: ZoneConfig,
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
}

/// One Hive column: its name and Hive type string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub hive_type: String,
}

impl ConvertConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, CliError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CliError::Config(format!("{path}: {e}")))?;
        Self::parse(&content).map_err(|e| e.with_context(path))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, CliError> {
        toml::from_str(toml_str).map_err(|e| CliError::Config(e.to_string()))
    }

    pub fn zone_settings(&self) -> Result<ZoneSettings, CliError> {
        Ok(ZoneSettings::from_config(&self.zones)?)
    }

    /// Parses every column's type string. Field names are lowercased, as
    /// Hive stores them.
    pub fn hive_columns(&self) -> Result<Vec<StructField>, CliError> {
        if self.columns.is_empty() {
            return Err(CliError::NoColumns);
        }
        self.columns
            .iter()
            .map(|column| {
                let field_type: HiveType = column
                    .hive_type
                    .parse()
                    .map_err(|e| CliError::Config(format!("column '{}': {e}", column.name)))?;
                Ok(StructField::new(column.name.to_ascii_lowercase(), field_type))
            })
            .collect()
    }
}
