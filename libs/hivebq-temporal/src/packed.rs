//! BigQuery `CivilTimeEncoder` packed DATETIME layout.
//!
//! ```text
//!  bits  59..46  45..42  41..37  36..32  31..26  25..20  19..0
//!        year    month   day     hour    minute  second  micros
//! ```
//!
//! The layout is an external wire contract and must not change.

use crate::civil::CivilTimestamp;
use crate::error::TemporalError;

const MICRO_LENGTH: u32 = 20;

const SECOND_SHIFT: u32 = 0;
const MINUTE_SHIFT: u32 = 6;
const HOUR_SHIFT: u32 = 12;
const DAY_SHIFT: u32 = 17;
const MONTH_SHIFT: u32 = 22;
const YEAR_SHIFT: u32 = 26;

const MICRO_MASK: i64 = (1 << MICRO_LENGTH) - 1;
const SECOND_MASK: i64 = 0x3F << SECOND_SHIFT;
const MINUTE_MASK: i64 = 0x3F << MINUTE_SHIFT;
const HOUR_MASK: i64 = 0x1F << HOUR_SHIFT;
const DAY_MASK: i64 = 0x1F << DAY_SHIFT;
const MONTH_MASK: i64 = 0xF << MONTH_SHIFT;
const YEAR_MASK: i64 = 0x3FFF << YEAR_SHIFT;

const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

/// Packs a civil timestamp (microsecond precision; nanos are truncated).
pub fn pack_civil_datetime_micros(civil: &CivilTimestamp) -> Result<i64, TemporalError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&civil.year()) {
        return Err(TemporalError::OutOfRange(format!("DATETIME {civil}")));
    }
    let seconds = (i64::from(civil.year()) << YEAR_SHIFT)
        | (i64::from(civil.month()) << MONTH_SHIFT)
        | (i64::from(civil.day()) << DAY_SHIFT)
        | (i64::from(civil.hour()) << HOUR_SHIFT)
        | (i64::from(civil.minute()) << MINUTE_SHIFT)
        | (i64::from(civil.second()) << SECOND_SHIFT);
    Ok((seconds << MICRO_LENGTH) | i64::from(civil.nanosecond() / 1_000))
}

pub fn unpack_civil_datetime_micros(packed: i64) -> Result<CivilTimestamp, TemporalError> {
    let seconds = packed >> MICRO_LENGTH;
    let micros = packed & MICRO_MASK;
    if packed < 0 || seconds & !(YEAR_MASK | MONTH_MASK | DAY_MASK | HOUR_MASK | MINUTE_MASK | SECOND_MASK) != 0 {
        return Err(TemporalError::OutOfRange(format!("packed DATETIME {packed:#x}")));
    }
    let field = |mask: i64, shift: u32| ((seconds & mask) >> shift) as u32;
    let year = field(YEAR_MASK, YEAR_SHIFT) as i32;
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) || micros >= 1_000_000 {
        return Err(TemporalError::OutOfRange(format!("packed DATETIME {packed:#x}")));
    }
    CivilTimestamp::new(
        year,
        field(MONTH_MASK, MONTH_SHIFT),
        field(DAY_MASK, DAY_SHIFT),
        field(HOUR_MASK, HOUR_SHIFT),
        field(MINUTE_MASK, MINUTE_SHIFT),
        field(SECOND_MASK, SECOND_SHIFT),
        micros as u32 * 1_000,
    )
}
