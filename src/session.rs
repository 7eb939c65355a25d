use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::data::{DataSource, Documents};
use crate::db::repository::{EnabledPrayers, PrefsRepo};
use crate::models::{AdjustedPrayer, Permission};
use crate::notify::Scheduler;
use crate::prayer_times::{adjust_day, next_prayer};

/// Foreground state: the loaded documents plus the selected city. Pure
/// computations take what they need from here; persistence goes through
/// [`PrefsRepo`].
#[derive(Debug, Clone)]
pub struct Session {
    pub docs: Documents,
    pub city: String,
    pub offset: i32,
}

impl Session {
    /// Fetch both documents and pick up the stored city.
    pub fn load(conn: &Connection, config: &AppConfig) -> Result<Self> {
        let docs = DataSource::from_config(&config.data)
            .load()
            .context("Loading prayer data")?;
        Self::from_documents(conn, docs)
    }

    pub fn from_documents(conn: &Connection, docs: Documents) -> Result<Self> {
        let (city, offset) = PrefsRepo::resolve_city(conn, &docs.cities)?;
        Ok(Self { docs, city, offset })
    }

    /// Today's prayers with the city offset applied. Empty when the timetable
    /// has no row for today.
    pub fn today(&self, now: NaiveDateTime) -> Result<Vec<AdjustedPrayer>> {
        match self.docs.timetable.day(now.date()) {
            Some(schedule) => Ok(adjust_day(now.date(), schedule, self.offset)?),
            None => Ok(Vec::new()),
        }
    }

    /// Names in today's row, in timetable order
    pub fn today_names(&self, now: NaiveDateTime) -> Vec<String> {
        self.docs
            .timetable
            .day(now.date())
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn next(&self, now: NaiveDateTime) -> Result<Option<AdjustedPrayer>> {
        Ok(next_prayer(&self.docs.timetable, self.offset, now)?)
    }

    pub fn select_city(&mut self, conn: &Connection, name: &str) -> Result<()> {
        let offset = self.docs.cities.offset(name).ok_or_else(|| {
            anyhow!("Unknown city '{}'. Run `namazkar cities` to list them", name)
        })?;
        PrefsRepo::set_city(conn, name)?;
        self.city = name.to_string();
        self.offset = offset;
        Ok(())
    }

    /// Pick up a city change made elsewhere (another process, the CLI).
    pub fn refresh_city(&mut self, conn: &Connection) -> Result<()> {
        let (city, offset) = PrefsRepo::resolve_city(conn, &self.docs.cities)?;
        self.city = city;
        self.offset = offset;
        Ok(())
    }

    /// "Srinagar (Offset: +3 min)"
    pub fn city_label(&self) -> String {
        format!("{} (Offset: {:+} min)", self.city, self.offset)
    }

    /// One scheduler tick using the stored permission and toggles.
    pub fn schedule(&self, conn: &Connection, scheduler: &Scheduler) -> Result<bool> {
        let permission: Permission = PrefsRepo::permission(conn)?;
        let enabled: EnabledPrayers = PrefsRepo::enabled_prayers(conn)?;
        Ok(scheduler.tick(permission, &self.city, &enabled))
    }
}
