use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::{HiveError, Result};

/// Returns the current instant in UTC.
///
/// Used for `createdAt`/`updatedAt` stamps and swipe timestamps. The
/// proposal policy never calls it directly; "now" is injected there.
pub fn current_time() -> DateTime<Utc> {
    Utc::now()
}

/// Builds the fixed "local" zone of the service from a UTC offset in minutes.
pub fn local_offset(utc_offset_minutes: i32) -> Result<FixedOffset> {
    utc_offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            HiveError::Config(format!(
                "utc offset of {} minutes is out of range",
                utc_offset_minutes
            ))
        })
}

/// The instant at `hour:00` local time on `date`.
///
/// Fixed offsets have no gaps or folds, so the mapping is always unique.
pub fn at_local_hour(date: NaiveDate, hour: u32, offset: &FixedOffset) -> Option<DateTime<Utc>> {
    let time = NaiveTime::from_hms_opt(hour, 0, 0)?;
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|local| local.with_timezone(&Utc))
}

/// Local calendar date of `instant`.
pub fn local_date(instant: DateTime<Utc>, offset: &FixedOffset) -> NaiveDate {
    instant.with_timezone(offset).date_naive()
}
