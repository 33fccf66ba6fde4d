//! Civil-time arithmetic shared by the Hive <-> BigQuery value converters.
//!
//! Everything here is a pure function over its inputs. Time zones are
//! always passed explicitly; there is no ambient "current zone".

pub mod civil;
pub mod config;
pub mod epoch;
pub mod error;
pub mod packed;
pub mod zone;

pub use chrono_tz::Tz;

pub use civil::{parse_civil_timestamp, CivilTimestamp, ZonedTimestamp};
pub use config::{
    civil_to_utc_instant_micros_via_source_zone, instant_micros_to_civil_via_source_zone, ZoneConfig,
    ZoneSettings,
};
pub use epoch::{civil_date_to_day_count, day_count_to_civil_date};
pub use error::TemporalError;
pub use packed::{pack_civil_datetime_micros, unpack_civil_datetime_micros};
pub use zone::{
    civil_as_utc_to_instant_micros, civil_to_instant_micros, instant_micros_to_civil,
    instant_micros_to_zoned_utc, parse_zone, retarget_zone, zoned_to_instant_micros,
};
