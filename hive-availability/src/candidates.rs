//! Candidate-time policy.
//!
//! Only a coarse grid of social hours is ever proposed: weekend afternoons
//! and weekday evenings, local time. When the group shares no free time on
//! that grid the hive's activity frequency decides instead.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Utc, Weekday};
use hive_common::{
    utils::time::{at_local_hour, local_date},
    ActivityFrequency, FreeSlot, TimeWindow,
};

use crate::slots::common_free_slots;

pub const MAX_CANDIDATES: usize = 3;

const WEEKEND_HOURS: [u32; 3] = [14, 16, 18];
const WEEKDAY_HOURS: [u32; 4] = [18, 19, 20, 21];
const DEFAULT_HOUR: u32 = 18;

/// Grid instants between the local dates of `window.start` and `window.end`,
/// inclusive, in chronological order.
pub fn grid_points(window: &TimeWindow, offset: &FixedOffset) -> Vec<DateTime<Utc>> {
    let last = local_date(window.end, offset);
    let mut day = local_date(window.start, offset);
    let mut points = Vec::new();

    while day <= last {
        let hours: &[u32] = match day.weekday() {
            Weekday::Sat | Weekday::Sun => &WEEKEND_HOURS,
            _ => &WEEKDAY_HOURS,
        };
        points.extend(hours.iter().filter_map(|h| at_local_hour(day, *h, offset)));

        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    points
}

/// Three default proposals at 18:00 local, spaced by the hive's frequency
/// and counted from the local date of `now`.
pub fn default_schedule(
    frequency: ActivityFrequency,
    now: DateTime<Utc>,
    offset: &FixedOffset,
) -> Vec<DateTime<Utc>> {
    let base = local_date(now, offset);
    let step = frequency.interval_days();

    (1..=MAX_CANDIDATES as i64)
        .filter_map(|i| base.checked_add_signed(Duration::days(step * i)))
        .filter_map(|day| at_local_hour(day, DEFAULT_HOUR, offset))
        .collect()
}

/// Picks 1..=3 candidate times for a group.
///
/// `per_member` holds the free slots of every member whose calendar could be
/// read; members without calendar access are simply absent. With no calendar
/// data, or no grid point free for everyone, the default schedule is used.
pub fn propose_candidate_times(
    per_member: &[Vec<FreeSlot>],
    window: &TimeWindow,
    frequency: ActivityFrequency,
    now: DateTime<Utc>,
    offset: &FixedOffset,
) -> Vec<DateTime<Utc>> {
    if per_member.is_empty() {
        return default_schedule(frequency, now, offset);
    }

    let common = common_free_slots(per_member);
    let picked: Vec<DateTime<Utc>> = grid_points(window, offset)
        .into_iter()
        .filter(|t| *t > now && window.contains(*t))
        .filter(|t| common.iter().any(|slot| slot.contains(*t)))
        .take(MAX_CANDIDATES)
        .collect();

    if picked.is_empty() {
        default_schedule(frequency, now, offset)
    } else {
        picked
    }
}
