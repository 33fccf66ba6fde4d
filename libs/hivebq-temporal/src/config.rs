use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::civil::CivilTimestamp;
use crate::error::TemporalError;
use crate::zone::{civil_to_instant_micros, instant_micros_to_civil, parse_zone};

/// Zone configuration as it appears in a config file.
///
/// ```toml
/// local_timezone = "Asia/Kolkata"
/// timestamp_timezone = "UTC"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Zone Hive `TIMESTAMP` values are rendered in.
    #[serde(default = "default_local_timezone")]
    pub local_timezone: String,

    /// Zone used to reinterpret zone-less Hive timestamps as absolute
    /// instants. No default: an unset value fails those conversions.
    #[serde(default)]
    pub timestamp_timezone: Option<String>,
}

fn default_local_timezone() -> String {
    "UTC".to_string()
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            local_timezone: default_local_timezone(),
            timestamp_timezone: None,
        }
    }
}

/// Validated zone configuration, threaded through every conversion that
/// needs a zone. Immutable and `Copy`, so it can be shared freely across
/// worker threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneSettings {
    local: Tz,
    source: Option<Tz>,
}

impl Default for ZoneSettings {
    fn default() -> Self {
        Self::utc()
    }
}

impl ZoneSettings {
    pub fn new(local: Tz, source: Option<Tz>) -> Self {
        Self { local, source }
    }

    /// UTC rendering, no source zone.
    pub fn utc() -> Self {
        Self::new(Tz::UTC, None)
    }

    pub fn from_config(config: &ZoneConfig) -> Result<Self, TemporalError> {
        let local = parse_zone(&config.local_timezone)?;
        let source = config.timestamp_timezone.as_deref().map(parse_zone).transpose()?;
        Ok(Self { local, source })
    }

    pub fn with_source(self, source: Tz) -> Self {
        Self { source: Some(source), ..self }
    }

    pub fn local(&self) -> Tz {
        self.local
    }

    pub fn source(&self) -> Option<Tz> {
        self.source
    }

    pub fn require_source(&self) -> Result<Tz, TemporalError> {
        self.source.ok_or(TemporalError::MissingZoneConfiguration)
    }
}

/// Hive `TIMESTAMP` -> BigQuery `TIMESTAMP`: reads `civil` as wall-clock time
/// in the configured source zone and returns the UTC instant.
pub fn civil_to_utc_instant_micros_via_source_zone(
    civil: &CivilTimestamp,
    zones: &ZoneSettings,
) -> Result<i64, TemporalError> {
    civil_to_instant_micros(civil, zones.require_source()?)
}

/// BigQuery `TIMESTAMP` -> Hive `TIMESTAMP`: renders the UTC instant as
/// wall-clock time in the configured source zone.
pub fn instant_micros_to_civil_via_source_zone(
    micros: i64,
    zones: &ZoneSettings,
) -> Result<CivilTimestamp, TemporalError> {
    instant_micros_to_civil(micros, zones.require_source()?)
}
