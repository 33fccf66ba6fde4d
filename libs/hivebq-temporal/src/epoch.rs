use chrono::{Datelike, NaiveDate};

use crate::error::TemporalError;

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// Proleptic-Gregorian date of a day count relative to 1970-01-01.
pub fn day_count_to_civil_date(days: i64) -> Result<NaiveDate, TemporalError> {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(|ce| i32::try_from(ce).ok())
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| TemporalError::OutOfRange(format!("epoch day {days}")))
}

pub fn civil_date_to_day_count(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE
}
