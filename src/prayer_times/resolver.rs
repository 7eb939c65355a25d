use chrono::NaiveDateTime;

use crate::data::{DaySchedule, Timetable};
use crate::models::AdjustedPrayer;
use crate::prayer_times::adjust::{adjust_day, TimeError};

/// Find the next prayer after `now`.
///
/// Today's prayers are considered first: the earliest one strictly after
/// `now` wins, ties going to the first in schedule order. When nothing is left
/// today, tomorrow's earliest prayer is returned without any time filter.
/// `None` means there is no upcoming event at all, i.e. nothing remains today
/// and tomorrow has no schedule.
pub fn resolve_next(
    today: Option<&DaySchedule>,
    tomorrow: Option<&DaySchedule>,
    offset_minutes: i32,
    now: NaiveDateTime,
) -> Result<Option<AdjustedPrayer>, TimeError> {
    let date = now.date();

    if let Some(schedule) = today {
        let upcoming = adjust_day(date, schedule, offset_minutes)?
            .into_iter()
            .filter(|p| p.at > now)
            .min_by_key(|p| p.at);
        if upcoming.is_some() {
            return Ok(upcoming);
        }
    }

    let Some(schedule) = tomorrow else {
        return Ok(None);
    };
    let tomorrow_date = date.succ_opt().unwrap_or(date);
    Ok(adjust_day(tomorrow_date, schedule, offset_minutes)?
        .into_iter()
        .min_by_key(|p| p.at))
}

/// [`resolve_next`] against a full timetable, picking today's and tomorrow's
/// rows by day-key.
pub fn next_prayer(
    timetable: &Timetable,
    offset_minutes: i32,
    now: NaiveDateTime,
) -> Result<Option<AdjustedPrayer>, TimeError> {
    let today = timetable.day(now.date());
    let tomorrow = now.date().succ_opt().and_then(|d| timetable.day(d));
    resolve_next(today, tomorrow, offset_minutes, now)
}
