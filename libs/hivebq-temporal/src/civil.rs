use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use chrono_tz::Tz;

use crate::error::TemporalError;

const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// ISO-8601 local date-time layouts accepted on the wire. The fraction is
/// optional and may carry up to nanosecond precision; seconds are optional.
const CIVIL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Calendar date and time of day with no associated zone (Hive `TIMESTAMP`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CivilTimestamp(NaiveDateTime);

impl CivilTimestamp {
    pub fn new(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        nanosecond: u32,
    ) -> Result<Self, TemporalError> {
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            TemporalError::OutOfRange(format!("date {year:04}-{month:02}-{day:02}"))
        })?;
        // chrono encodes leap seconds as nanos >= 1e9; Hive has no such thing.
        let time = (nanosecond < NANOS_PER_SECOND)
            .then(|| NaiveTime::from_hms_nano_opt(hour, minute, second, nanosecond))
            .flatten()
            .ok_or_else(|| {
                TemporalError::OutOfRange(format!(
                    "time {hour:02}:{minute:02}:{second:02}.{nanosecond:09}"
                ))
            })?;
        Ok(Self(date.and_time(time)))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn second(&self) -> u32 {
        self.0.second()
    }

    pub fn nanosecond(&self) -> u32 {
        self.0.nanosecond()
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    pub fn as_naive(&self) -> &NaiveDateTime {
        &self.0
    }

    /// Drops the sub-microsecond part of the nanosecond field.
    pub fn truncate_to_micros(self) -> Self {
        let nanos = self.nanosecond() / 1_000 * 1_000;
        // Same second, smaller nanos: always representable.
        Self(self.0.with_nanosecond(nanos).unwrap_or(self.0))
    }
}

impl From<NaiveDateTime> for CivilTimestamp {
    fn from(value: NaiveDateTime) -> Self {
        Self(value)
    }
}

impl From<CivilTimestamp> for NaiveDateTime {
    fn from(value: CivilTimestamp) -> Self {
        value.0
    }
}

/// Hive rendering: `2022-12-27 15:30:00.123456`, fraction without trailing
/// zeros and omitted entirely when zero.
impl fmt::Display for CivilTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S"))?;
        let nanos = self.nanosecond();
        if nanos != 0 {
            let fraction = format!("{nanos:09}");
            write!(f, ".{}", fraction.trim_end_matches('0'))?;
        }
        Ok(())
    }
}

/// Parses an ISO-8601 local date-time such as `2022-12-27T10:00:00.123456`.
///
/// At most nine fraction digits are accepted and leap seconds (`:60`) are
/// rejected.
pub fn parse_civil_timestamp(text: &str) -> Result<CivilTimestamp, TemporalError> {
    let malformed = || TemporalError::MalformedTemporalText { text: text.to_string() };
    if let Some((_, fraction)) = text.split_once('.') {
        if fraction.len() > 9 {
            return Err(malformed());
        }
    }
    CIVIL_FORMATS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(text, layout).ok())
        .filter(|parsed| parsed.nanosecond() < NANOS_PER_SECOND)
        .map(CivilTimestamp)
        .ok_or_else(malformed)
}

/// Civil timestamp qualified with a zone (Hive `TIMESTAMP WITH LOCAL TIME ZONE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZonedTimestamp {
    civil: CivilTimestamp,
    zone: Tz,
}

impl ZonedTimestamp {
    pub fn new(civil: CivilTimestamp, zone: Tz) -> Self {
        Self { civil, zone }
    }

    pub fn civil(&self) -> &CivilTimestamp {
        &self.civil
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }
}

impl fmt::Display for ZonedTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.civil, self.zone.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fraction_up_to_nanos() {
        let ts = parse_civil_timestamp("2022-12-27T10:00:00.123456789").unwrap();
        assert_eq!(ts, CivilTimestamp::new(2022, 12, 27, 10, 0, 0, 123_456_789).unwrap());

        let ts = parse_civil_timestamp("2019-03-18T11:23:45.678901").unwrap();
        assert_eq!(ts.nanosecond(), 678_901_000);
    }

    #[test]
    fn fraction_and_seconds_are_optional() {
        let whole = parse_civil_timestamp("2000-01-01T00:23:45").unwrap();
        assert_eq!(whole, CivilTimestamp::new(2000, 1, 1, 0, 23, 45, 0).unwrap());

        let minutes = parse_civil_timestamp("2000-01-01T00:23").unwrap();
        assert_eq!(minutes, CivilTimestamp::new(2000, 1, 1, 0, 23, 0, 0).unwrap());
    }

    #[test]
    fn rejects_malformed_text() {
        for text in [
            "",
            "2022-12-27",
            "2022-12-27 10:00:00",
            "2022-13-01T00:00:00",
            "noon",
            "2016-12-31T23:59:60",
            "2016-12-31T23:59:60.5",
            "2016-12-31T23:59:59.1234567891",
        ] {
            assert_eq!(
                parse_civil_timestamp(text),
                Err(TemporalError::MalformedTemporalText { text: text.to_string() }),
                "{text}"
            );
        }
    }

    #[test]
    fn displays_like_hive() {
        let ts = CivilTimestamp::new(2022, 12, 27, 15, 30, 0, 123_456_000).unwrap();
        assert_eq!(ts.to_string(), "2022-12-27 15:30:00.123456");

        let ts = CivilTimestamp::new(2019, 3, 18, 0, 0, 0, 0).unwrap();
        assert_eq!(ts.to_string(), "2019-03-18 00:00:00");

        let zoned = ZonedTimestamp::new(ts, Tz::UTC);
        assert_eq!(zoned.to_string(), "2019-03-18 00:00:00 UTC");
    }

    #[test]
    fn rejects_invalid_components() {
        assert!(CivilTimestamp::new(2023, 2, 29, 0, 0, 0, 0).is_err());
        assert!(CivilTimestamp::new(2023, 1, 1, 24, 0, 0, 0).is_err());
        assert!(CivilTimestamp::new(2023, 1, 1, 0, 0, 59, 1_000_000_000).is_err());
    }

    #[test]
    fn truncates_to_micros() {
        let ts = CivilTimestamp::new(2023, 1, 1, 0, 0, 0, 123_456_789).unwrap();
        assert_eq!(ts.truncate_to_micros().nanosecond(), 123_456_000);
    }
}
