use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::data::DaySchedule;
use crate::models::AdjustedPrayer;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("Malformed time '{0}', expected HH:MM")]
    Malformed(String),
}

/// Parse a strict two-digit "HH:MM" base time.
pub fn parse_base_time(s: &str) -> Result<NaiveTime, TimeError> {
    let malformed = || TimeError::Malformed(s.to_string());
    let (h, m) = s.split_once(':').ok_or_else(malformed)?;
    if h.len() != 2 || m.len() != 2 {
        return Err(malformed());
    }
    if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let hours: u32 = h.parse().map_err(|_| malformed())?;
    let minutes: u32 = m.parse().map_err(|_| malformed())?;
    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(malformed)
}

/// Shift a base "HH:MM" by `offset_minutes`. Carries across the day boundary
/// wrap silently: "23:58" + 5 is "00:03".
pub fn adjust_time(base: &str, offset_minutes: i32) -> Result<String, TimeError> {
    let time = parse_base_time(base)? + Duration::minutes(offset_minutes.into());
    Ok(time.format("%H:%M").to_string())
}

/// The absolute instant of a base time on `date` after applying the offset.
/// Unlike [`adjust_time`] this keeps the day carry.
pub fn adjust_instant(
    date: NaiveDate,
    base: &str,
    offset_minutes: i32,
) -> Result<NaiveDateTime, TimeError> {
    let time = parse_base_time(base)?;
    Ok(date.and_time(time) + Duration::minutes(offset_minutes.into()))
}

/// Adjust every prayer of one day, keeping the schedule's order.
pub fn adjust_day(
    date: NaiveDate,
    schedule: &DaySchedule,
    offset_minutes: i32,
) -> Result<Vec<AdjustedPrayer>, TimeError> {
    schedule
        .iter()
        .map(|(name, base)| {
            Ok(AdjustedPrayer {
                name: name.clone(),
                time: adjust_time(base, offset_minutes)?,
                at: adjust_instant(date, base, offset_minutes)?,
            })
        })
        .collect()
}
