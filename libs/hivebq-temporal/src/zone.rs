use chrono::{DateTime, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

use crate::civil::{CivilTimestamp, ZonedTimestamp};
use crate::error::TemporalError;

const MICROS_PER_SECOND: i64 = 1_000_000;
const NANOS_PER_MICRO: u32 = 1_000;

/// Resolves an IANA zone identifier such as `UTC` or `Asia/Kolkata`.
pub fn parse_zone(name: &str) -> Result<Tz, TemporalError> {
    name.parse::<Tz>()
        .map_err(|_| TemporalError::UnknownZone(name.to_string()))
}

/// Places a wall-clock time in `zone`.
///
/// Overlaps (clocks turned back) resolve to the earlier instant. Gaps
/// (clocks turned forward) are read with the offset in effect before the
/// transition, which moves the wall clock forward by the gap length.
fn localize(civil: &NaiveDateTime, zone: Tz) -> Result<DateTime<Tz>, TemporalError> {
    match zone.from_local_datetime(civil) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => {
            let offset_at = |shift: i32| {
                shifted(civil, shift).map(|utc| zone.offset_from_utc_datetime(&utc).fix().local_minus_utc())
            };
            // Either side of the transition lies at `civil` minus one of its
            // two offsets; the earlier offset is the smaller one in a gap.
            let guess = offset_at(0).ok_or_else(|| out_of_range(civil))?;
            let one_side = offset_at(guess).ok_or_else(|| out_of_range(civil))?;
            let other_side = offset_at(one_side).ok_or_else(|| out_of_range(civil))?;
            shifted(civil, one_side.min(other_side))
                .map(|utc| zone.from_utc_datetime(&utc))
                .ok_or_else(|| out_of_range(civil))
        }
    }
}

/// `civil` read as a wall clock `offset_seconds` ahead of UTC.
fn shifted(civil: &NaiveDateTime, offset_seconds: i32) -> Option<NaiveDateTime> {
    civil.checked_sub_signed(TimeDelta::seconds(i64::from(offset_seconds)))
}

fn out_of_range(civil: &NaiveDateTime) -> TemporalError {
    TemporalError::OutOfRange(format!("timestamp {civil}"))
}

fn to_micros<Z: TimeZone>(dt: &DateTime<Z>) -> i64 {
    dt.timestamp() * MICROS_PER_SECOND + i64::from(dt.timestamp_subsec_nanos() / NANOS_PER_MICRO)
}

/// Absolute instant of the wall-clock time `civil` in `zone`, in epoch
/// microseconds. Nanoseconds are truncated, never rounded.
pub fn civil_to_instant_micros(civil: &CivilTimestamp, zone: Tz) -> Result<i64, TemporalError> {
    localize(civil.as_naive(), zone).map(|dt| to_micros(&dt))
}

/// Wall-clock rendering of an epoch-microsecond instant in `zone`.
///
/// The instant is split with floor division, so `-1` is the last
/// microsecond of 1969 rather than a negative remainder.
pub fn instant_micros_to_civil(micros: i64, zone: Tz) -> Result<CivilTimestamp, TemporalError> {
    instant_from_micros(micros).map(|utc| CivilTimestamp::from(utc.with_timezone(&zone).naive_local()))
}

fn instant_from_micros(micros: i64) -> Result<DateTime<Utc>, TemporalError> {
    let seconds = micros.div_euclid(MICROS_PER_SECOND);
    let nanos = micros.rem_euclid(MICROS_PER_SECOND) as u32 * NANOS_PER_MICRO;
    DateTime::from_timestamp(seconds, nanos)
        .ok_or_else(|| TemporalError::OutOfRange(format!("instant {micros}us")))
}

/// Re-expresses the wall-clock time `civil` in `from` as wall-clock time in
/// `to`. Works at nanosecond resolution.
pub fn retarget_zone(
    civil: &CivilTimestamp,
    from: Tz,
    to: Tz,
) -> Result<CivilTimestamp, TemporalError> {
    let instant = localize(civil.as_naive(), from)?;
    Ok(CivilTimestamp::from(instant.with_timezone(&to).naive_local()))
}

/// Reads a zone-less Hive timestamp as if it were UTC.
pub fn civil_as_utc_to_instant_micros(civil: &CivilTimestamp) -> i64 {
    to_micros(&civil.as_naive().and_utc())
}

pub fn zoned_to_instant_micros(zoned: &ZonedTimestamp) -> Result<i64, TemporalError> {
    civil_to_instant_micros(zoned.civil(), zoned.zone())
}

pub fn instant_micros_to_zoned_utc(micros: i64) -> Result<ZonedTimestamp, TemporalError> {
    instant_micros_to_civil(micros, Tz::UTC).map(|civil| ZonedTimestamp::new(civil, Tz::UTC))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, nanos: u32) -> CivilTimestamp {
        CivilTimestamp::new(y, mo, d, h, mi, s, nanos).unwrap()
    }

    #[test]
    fn unknown_zone_is_an_error() {
        assert_eq!(parse_zone("Asia/Kolkata").unwrap(), Tz::Asia__Kolkata);
        assert_eq!(
            parse_zone("Mars/Olympus"),
            Err(TemporalError::UnknownZone("Mars/Olympus".to_string()))
        );
    }

    #[test]
    fn negative_instants_floor() {
        let civil = instant_micros_to_civil(-1, Tz::UTC).unwrap();
        assert_eq!(civil, ts(1969, 12, 31, 23, 59, 59, 999_999_000));

        let civil = instant_micros_to_civil(-1_500_000, Tz::UTC).unwrap();
        assert_eq!(civil, ts(1969, 12, 31, 23, 59, 58, 500_000_000));
    }

    #[test]
    fn nanos_truncate_to_micros() {
        let civil = ts(1970, 1, 1, 0, 0, 1, 999_999);
        assert_eq!(civil_to_instant_micros(&civil, Tz::UTC).unwrap(), 1_000_999);

        let before_epoch = ts(1969, 12, 31, 23, 59, 59, 999_999_999);
        assert_eq!(civil_to_instant_micros(&before_epoch, Tz::UTC).unwrap(), -1);
    }

    #[test]
    fn instant_round_trip_in_every_zone() {
        let civil = ts(2022, 12, 27, 10, 0, 0, 123_456_789).truncate_to_micros();
        for zone in [Tz::UTC, Tz::Asia__Kolkata, Tz::America__New_York, Tz::Pacific__Chatham] {
            let micros = civil_to_instant_micros(&civil, zone).unwrap();
            assert_eq!(instant_micros_to_civil(micros, zone).unwrap(), civil, "{zone:?}");
        }

        let early = ts(1901, 6, 30, 12, 0, 0, 1_000);
        let micros = civil_to_instant_micros(&early, Tz::Europe__Paris).unwrap();
        assert_eq!(instant_micros_to_civil(micros, Tz::Europe__Paris).unwrap(), early);
    }

    #[test]
    fn retargets_utc_to_kolkata_and_back() {
        let utc = ts(2022, 12, 27, 10, 0, 0, 123_456_000);
        let local = retarget_zone(&utc, Tz::UTC, Tz::Asia__Kolkata).unwrap();
        assert_eq!(local.to_string(), "2022-12-27 15:30:00.123456");
        assert_eq!(retarget_zone(&local, Tz::Asia__Kolkata, Tz::UTC).unwrap(), utc);
    }

    #[test]
    fn retarget_keeps_nanos() {
        let civil = ts(2021, 7, 4, 23, 59, 59, 987_654_321);
        let there = retarget_zone(&civil, Tz::America__Los_Angeles, Tz::Australia__Sydney).unwrap();
        let back = retarget_zone(&there, Tz::Australia__Sydney, Tz::America__Los_Angeles).unwrap();
        assert_eq!(back, civil);
    }

    #[test]
    fn dst_gap_moves_wall_clock_forward() {
        // 2023-03-12 02:30 does not exist in New York.
        let missing = ts(2023, 3, 12, 2, 30, 0, 0);
        let utc = retarget_zone(&missing, Tz::America__New_York, Tz::UTC).unwrap();
        assert_eq!(utc, ts(2023, 3, 12, 7, 30, 0, 0));
        let local = retarget_zone(&utc, Tz::UTC, Tz::America__New_York).unwrap();
        assert_eq!(local, ts(2023, 3, 12, 3, 30, 0, 0));
    }

    #[test]
    fn whole_day_gap_moves_wall_clock_forward() {
        // Samoa skipped 2011-12-30 entirely (UTC-10 to UTC+14).
        let missing = ts(2011, 12, 30, 12, 0, 0, 0);
        let utc = retarget_zone(&missing, Tz::Pacific__Apia, Tz::UTC).unwrap();
        assert_eq!(utc, ts(2011, 12, 30, 22, 0, 0, 0));
        let local = retarget_zone(&utc, Tz::UTC, Tz::Pacific__Apia).unwrap();
        assert_eq!(local, ts(2011, 12, 31, 12, 0, 0, 0));
    }

    #[test]
    fn dst_overlap_takes_earlier_instant() {
        // 2023-11-05 01:30 happens twice in New York.
        let repeated = ts(2023, 11, 5, 1, 30, 0, 0);
        let utc = retarget_zone(&repeated, Tz::America__New_York, Tz::UTC).unwrap();
        assert_eq!(utc, ts(2023, 11, 5, 5, 30, 0, 0));
    }

    #[test]
    fn zoned_helpers() {
        let zoned = instant_micros_to_zoned_utc(1_672_136_400_123_456).unwrap();
        assert_eq!(zoned.zone(), Tz::UTC);
        assert_eq!(zoned.civil().to_string(), "2022-12-27 10:20:00.123456");
        assert_eq!(zoned_to_instant_micros(&zoned).unwrap(), 1_672_136_400_123_456);

        let kolkata = ZonedTimestamp::new(ts(2022, 12, 27, 15, 50, 0, 123_456_000), Tz::Asia__Kolkata);
        assert_eq!(zoned_to_instant_micros(&kolkata).unwrap(), 1_672_136_400_123_456);
    }

    #[test]
    fn civil_read_as_utc() {
        assert_eq!(civil_as_utc_to_instant_micros(&ts(1970, 1, 1, 0, 0, 0, 0)), 0);
        assert_eq!(
            civil_as_utc_to_instant_micros(&ts(2022, 12, 27, 10, 20, 0, 123_456_999)),
            1_672_136_400_123_456
        );
    }

    #[test]
    fn instant_outside_calendar_is_an_error() {
        assert!(matches!(
            instant_micros_to_civil(i64::MAX, Tz::UTC),
            Err(TemporalError::OutOfRange(_))
        ));
    }
}
