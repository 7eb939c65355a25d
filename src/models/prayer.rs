use chrono::NaiveDateTime;
use serde::Serialize;

/// A prayer with its base time shifted by the selected city's offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdjustedPrayer {
    pub name: String,
    /// Adjusted wall-clock time as "HH:MM"
    pub time: String,
    /// Absolute instant; may fall on the neighbouring day when the offset
    /// carries across midnight
    pub at: NaiveDateTime,
}

impl AdjustedPrayer {
    pub fn seconds_until(&self, now: NaiveDateTime) -> i64 {
        (self.at - now).num_seconds()
    }
}

impl std::fmt::Display for AdjustedPrayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.time)
    }
}
