use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDateTime};
use log::{debug, error, info};
use std::sync::mpsc::Receiver;

use crate::config::settings::NotificationConfig;
use crate::data::{DataSource, DaySchedule, Documents};
use crate::db::repository::EnabledPrayers;
use crate::models::AdjustedPrayer;
use crate::notify::notifier::{Notification, Notifier};
use crate::notify::scheduler::WorkerMessage;
use crate::prayer_times::{adjust_day, TimeError};

/// Enabled prayers whose adjusted instant falls in `[now, now + window)`.
///
/// This is a polling check: it only sees prayers that come due within
/// `window` of a schedule tick. A tick that lands just after a prayer, or
/// ticks drifting apart, can skip a prayer or show it twice. The notifier
/// tags by prayer name, so a repeat replaces the earlier one.
pub fn due_prayers(
    schedule: &DaySchedule,
    offset_minutes: i32,
    enabled: &EnabledPrayers,
    now: NaiveDateTime,
    window: Duration,
) -> Result<Vec<AdjustedPrayer>, TimeError> {
    let until = now + window;
    Ok(adjust_day(now.date(), schedule, offset_minutes)?
        .into_iter()
        .filter(|p| enabled.get(&p.name).copied().unwrap_or(false))
        .filter(|p| p.at >= now && p.at < until)
        .collect())
}

/// What a worker got through before its channel closed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    pub handled: usize,
    pub failed: usize,
    pub shown: usize,
}

/// Background half of the notification handshake. Owns its own copy of the
/// data source and re-reads both documents on every message, so it never
/// depends on foreground state beyond what the message carries.
pub struct Worker {
    source: DataSource,
    notifier: Box<dyn Notifier + Send>,
    body: String,
    window: Duration,
}

impl Worker {
    pub fn new(
        source: DataSource,
        notifier: Box<dyn Notifier + Send>,
        config: &NotificationConfig,
    ) -> Self {
        Self {
            source,
            notifier,
            body: config.body.clone(),
            window: config.window(),
        }
    }

    /// Process messages until every sender is dropped. A failed message is
    /// logged and skipped.
    pub fn run(mut self, rx: Receiver<WorkerMessage>) -> WorkerStats {
        info!("Notification worker started");
        let mut stats = WorkerStats::default();
        for message in rx {
            stats.handled += 1;
            let now = Local::now().naive_local();
            match self.handle(&message, now) {
                Ok(shown) => stats.shown += shown,
                Err(err) => {
                    stats.failed += 1;
                    error!("Error handling schedule: {err:?}");
                }
            }
        }
        debug!(
            "Notification worker stopped after {} messages ({} failed, {} shown)",
            stats.handled, stats.failed, stats.shown
        );
        stats
    }

    /// Returns how many notifications were shown.
    pub fn handle(&mut self, message: &WorkerMessage, now: NaiveDateTime) -> Result<usize> {
        match message {
            WorkerMessage::Schedule {
                city,
                enabled_prayers,
            } => {
                let docs = self.source.load()?;
                self.fire_due(&docs, city, enabled_prayers, now)
            }
        }
    }

    pub fn fire_due(
        &mut self,
        docs: &Documents,
        city: &str,
        enabled: &EnabledPrayers,
        now: NaiveDateTime,
    ) -> Result<usize> {
        let (city, offset) = docs.cities.resolve(Some(city));
        let Some(schedule) = docs.timetable.day(now.date()) else {
            debug!("No timetable row for {}", now.date());
            return Ok(0);
        };

        let due = due_prayers(schedule, offset, enabled, now, self.window)
            .with_context(|| format!("Adjusting today's times for {city}"))?;
        for prayer in &due {
            let notification = Notification::for_prayer(&prayer.name, &self.body);
            self.notifier
                .show(&notification)
                .with_context(|| format!("Showing notification for {}", prayer.name))?;
        }
        Ok(due.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::notifier::testing::RecordingNotifier;
    use chrono::NaiveDate;
    use std::fs;

    const TABLE: &str = r#"{ "days": {
        "14-06": { "Fajr": "03:50", "Dhuhr": "12:30", "Asr": "12:30", "Isha": "21:40" }
    } }"#;
    const CITIES: &str = r#"{ "base_city": "Srinagar", "cities": {
        "Srinagar": { "offset": 0 },
        "Uri": { "offset": 4 }
    } }"#;

    fn docs() -> Documents {
        Documents {
            timetable: serde_json::from_str(TABLE).unwrap(),
            cities: serde_json::from_str(CITIES).unwrap(),
        }
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 14)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn enabled(entries: &[(&str, bool)]) -> EnabledPrayers {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn worker(notifier: &RecordingNotifier) -> Worker {
        Worker::new(
            DataSource::new("unused", "unused"),
            Box::new(notifier.clone()),
            &NotificationConfig::default(),
        )
    }

    #[test]
    fn test_fires_enabled_prayer_due_now() {
        let notifier = RecordingNotifier::default();
        let mut worker = worker(&notifier);
        let toggles = enabled(&[("Dhuhr", true), ("Asr", false)]);

        let fired = worker
            .fire_due(&docs(), "Srinagar", &toggles, at(12, 30, 0))
            .unwrap();

        assert_eq!(fired, 1);
        assert_eq!(notifier.tags(), ["Dhuhr"]);
        let shown = notifier.shown.lock().unwrap();
        assert_eq!(shown[0].title, "Dhuhr");
        assert_eq!(shown[0].body, "Namazi Hund Waqt Wot");
    }

    #[test]
    fn test_window_bounds() {
        let schedule = &docs().timetable.days["14-06"];
        let toggles = enabled(&[("Dhuhr", true)]);
        let window = Duration::seconds(3);

        let names = |now| -> Vec<String> {
            due_prayers(schedule, 0, &toggles, now, window)
                .unwrap()
                .into_iter()
                .map(|p| p.name)
                .collect()
        };
        assert_eq!(names(at(12, 29, 58)), ["Dhuhr"]);
        // 3s ahead is outside the half-open window
        assert!(names(at(12, 29, 57)).is_empty());
        // Already passed
        assert!(names(at(12, 30, 1)).is_empty());
    }

    #[test]
    fn test_uses_city_offset() {
        let notifier = RecordingNotifier::default();
        let mut worker = worker(&notifier);
        let toggles = enabled(&[("Isha", true)]);

        assert_eq!(
            worker.fire_due(&docs(), "Uri", &toggles, at(21, 40, 0)).unwrap(),
            0
        );
        assert_eq!(
            worker.fire_due(&docs(), "Uri", &toggles, at(21, 43, 59)).unwrap(),
            1
        );
        // Unknown city falls back to the base city
        assert_eq!(
            worker.fire_due(&docs(), "Nowhere", &toggles, at(21, 40, 0)).unwrap(),
            1
        );
    }

    #[test]
    fn test_no_row_for_today() {
        let notifier = RecordingNotifier::default();
        let mut worker = worker(&notifier);
        let tomorrow = NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        let toggles = enabled(&[("Dhuhr", true)]);
        assert_eq!(worker.fire_due(&docs(), "Srinagar", &toggles, tomorrow).unwrap(), 0);
        assert!(notifier.tags().is_empty());
    }

    #[test]
    fn test_handle_refetches_documents() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("table.json");
        let cities = dir.path().join("offset.json");
        fs::write(&table, TABLE).unwrap();
        fs::write(&cities, CITIES).unwrap();

        let notifier = RecordingNotifier::default();
        let mut worker = Worker::new(
            DataSource::new(
                table.to_string_lossy().into_owned(),
                cities.to_string_lossy().into_owned(),
            ),
            Box::new(notifier.clone()),
            &NotificationConfig::default(),
        );
        let message = WorkerMessage::Schedule {
            city: "Srinagar".to_string(),
            enabled_prayers: enabled(&[("Fajr", true)]),
        };

        assert_eq!(worker.handle(&message, at(3, 49, 59)).unwrap(), 1);

        // The worker picks up edits to the documents on the next message
        fs::write(&table, TABLE.replace("03:50", "03:55")).unwrap();
        assert_eq!(worker.handle(&message, at(3, 49, 59)).unwrap(), 0);
        assert_eq!(worker.handle(&message, at(3, 55, 0)).unwrap(), 1);
        assert_eq!(notifier.tags(), ["Fajr", "Fajr"]);
    }

    #[test]
    fn test_handle_fetch_failure() {
        let notifier = RecordingNotifier::default();
        let mut worker = worker(&notifier);
        let message = WorkerMessage::Schedule {
            city: "Srinagar".to_string(),
            enabled_prayers: enabled(&[("Fajr", true)]),
        };
        assert!(worker.handle(&message, at(3, 50, 0)).is_err());
        assert!(notifier.tags().is_empty());
    }
}
