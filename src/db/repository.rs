use anyhow::Result;
use indexmap::IndexMap;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;

use crate::data::CityRegistry;
use crate::models::{Permission, Theme};

// ─── Meta repo ───────────────────────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        let value = conn
            .query_row(
                "SELECT value FROM app_meta WHERE key = ?1",
                params![key],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?
            .flatten();
        Ok(value)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO app_meta (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn delete(conn: &Connection, key: &str) -> Result<()> {
        conn.execute("DELETE FROM app_meta WHERE key = ?1", params![key])?;
        Ok(())
    }
}

// ─── Preferences ─────────────────────────────────────────────────────────────

const CITY_KEY: &str = "city";
const ENABLED_KEY: &str = "enabled_prayers";
const THEME_KEY: &str = "theme";
const PERMISSION_KEY: &str = "notify_permission";

/// Prayer name → notifications on/off
pub type EnabledPrayers = IndexMap<String, bool>;

/// User preferences, stored as key/value rows in `app_meta`.
pub struct PrefsRepo;

impl PrefsRepo {
    pub fn city(conn: &Connection) -> Result<Option<String>> {
        MetaRepo::get(conn, CITY_KEY)
    }

    pub fn set_city(conn: &Connection, city: &str) -> Result<()> {
        MetaRepo::set(conn, CITY_KEY, city)
    }

    /// The selected city and its offset, falling back to the registry's base
    /// city when nothing (or an unknown name) is stored.
    pub fn resolve_city(conn: &Connection, cities: &CityRegistry) -> Result<(String, i32)> {
        let stored = Self::city(conn)?;
        let (name, offset) = cities.resolve(stored.as_deref());
        Ok((name.to_string(), offset))
    }

    /// Stored toggles. Anything unreadable counts as no toggles at all.
    pub fn enabled_prayers(conn: &Connection) -> Result<EnabledPrayers> {
        let Some(raw) = MetaRepo::get(conn, ENABLED_KEY)? else {
            return Ok(EnabledPrayers::new());
        };
        match serde_json::from_str(&raw) {
            Ok(map) => Ok(map),
            Err(err) => {
                debug!("Discarding unreadable {ENABLED_KEY}: {err}");
                Ok(EnabledPrayers::new())
            }
        }
    }

    fn store_enabled(conn: &Connection, enabled: &EnabledPrayers) -> Result<()> {
        MetaRepo::set(conn, ENABLED_KEY, &serde_json::to_string(enabled)?)
    }

    pub fn is_enabled(conn: &Connection, prayer: &str) -> Result<bool> {
        Ok(Self::enabled_prayers(conn)?
            .get(prayer)
            .copied()
            .unwrap_or(false))
    }

    pub fn set_enabled(conn: &Connection, prayer: &str, enabled: bool) -> Result<()> {
        let mut map = Self::enabled_prayers(conn)?;
        map.insert(prayer.to_string(), enabled);
        Self::store_enabled(conn, &map)
    }

    /// Flip one prayer's flag, returning the new value.
    pub fn toggle(conn: &Connection, prayer: &str) -> Result<bool> {
        let now_enabled = !Self::is_enabled(conn, prayer)?;
        Self::set_enabled(conn, prayer, now_enabled)?;
        Ok(now_enabled)
    }

    /// Turn notifications on for every given prayer. Other entries are kept.
    pub fn enable_all<S: AsRef<str>>(conn: &Connection, prayers: &[S]) -> Result<()> {
        let mut map = Self::enabled_prayers(conn)?;
        for prayer in prayers {
            map.insert(prayer.as_ref().to_string(), true);
        }
        Self::store_enabled(conn, &map)
    }

    pub fn theme(conn: &Connection) -> Result<Theme> {
        Ok(MetaRepo::get(conn, THEME_KEY)?
            .and_then(|s| Theme::from_str(&s).ok())
            .unwrap_or_default())
    }

    pub fn set_theme(conn: &Connection, theme: Theme) -> Result<()> {
        MetaRepo::set(conn, THEME_KEY, theme.as_str())
    }

    pub fn permission(conn: &Connection) -> Result<Permission> {
        Ok(MetaRepo::get(conn, PERMISSION_KEY)?
            .and_then(|s| Permission::from_str(&s).ok())
            .unwrap_or_default())
    }

    pub fn set_permission(conn: &Connection, permission: Permission) -> Result<()> {
        match permission {
            Permission::Default => MetaRepo::delete(conn, PERMISSION_KEY),
            _ => MetaRepo::set(conn, PERMISSION_KEY, permission.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn open_memory() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn test_defaults() {
        let conn = open_memory();
        assert_eq!(PrefsRepo::city(&conn).unwrap(), None);
        assert!(!PrefsRepo::is_enabled(&conn, "Fajr").unwrap());
        assert!(PrefsRepo::enabled_prayers(&conn).unwrap().is_empty());
        assert_eq!(PrefsRepo::theme(&conn).unwrap(), Theme::Dark);
        assert_eq!(PrefsRepo::permission(&conn).unwrap(), Permission::Default);
    }

    #[test]
    fn test_resolve_city_falls_back_to_base() {
        let conn = open_memory();
        let cities: CityRegistry = serde_json::from_str(
            r#"{ "base_city": "Srinagar", "cities": { "Srinagar": { "offset": 0 }, "Kupwara": { "offset": 2 } } }"#,
        )
        .unwrap();
        assert_eq!(
            PrefsRepo::resolve_city(&conn, &cities).unwrap(),
            ("Srinagar".to_string(), 0)
        );
        PrefsRepo::set_city(&conn, "Kupwara").unwrap();
        assert_eq!(
            PrefsRepo::resolve_city(&conn, &cities).unwrap(),
            ("Kupwara".to_string(), 2)
        );
        PrefsRepo::set_city(&conn, "Gone").unwrap();
        assert_eq!(
            PrefsRepo::resolve_city(&conn, &cities).unwrap(),
            ("Srinagar".to_string(), 0)
        );
    }

    #[test]
    fn test_toggle() {
        let conn = open_memory();
        assert!(PrefsRepo::toggle(&conn, "Asr").unwrap());
        assert!(PrefsRepo::is_enabled(&conn, "Asr").unwrap());
        assert!(!PrefsRepo::toggle(&conn, "Asr").unwrap());
        assert!(!PrefsRepo::is_enabled(&conn, "Asr").unwrap());
    }

    #[test]
    fn test_enable_all_is_idempotent() {
        let conn = open_memory();
        PrefsRepo::set_enabled(&conn, "Tahajjud", false).unwrap();
        let today = ["Fajr", "Dhuhr", "Asr", "Maghrib", "Isha"];

        PrefsRepo::enable_all(&conn, &today).unwrap();
        let first = PrefsRepo::enabled_prayers(&conn).unwrap();
        PrefsRepo::enable_all(&conn, &today).unwrap();
        let second = PrefsRepo::enabled_prayers(&conn).unwrap();

        assert_eq!(first, second);
        for prayer in today {
            assert_eq!(second.get(prayer), Some(&true));
        }
        assert_eq!(second.get("Tahajjud"), Some(&false));
    }

    #[test]
    fn test_corrupt_toggles_reset_to_empty() {
        let conn = open_memory();
        MetaRepo::set(&conn, ENABLED_KEY, "{not json").unwrap();
        assert!(PrefsRepo::enabled_prayers(&conn).unwrap().is_empty());
        assert!(!PrefsRepo::is_enabled(&conn, "Fajr").unwrap());

        // Writing again replaces the corrupt value
        PrefsRepo::set_enabled(&conn, "Fajr", true).unwrap();
        assert!(PrefsRepo::is_enabled(&conn, "Fajr").unwrap());
    }

    #[test]
    fn test_unknown_theme_reads_as_default() {
        let conn = open_memory();
        MetaRepo::set(&conn, THEME_KEY, "neon").unwrap();
        assert_eq!(PrefsRepo::theme(&conn).unwrap(), Theme::Dark);
        PrefsRepo::set_theme(&conn, Theme::Light).unwrap();
        assert_eq!(PrefsRepo::theme(&conn).unwrap(), Theme::Light);
    }

    #[test]
    fn test_permission_reset() {
        let conn = open_memory();
        PrefsRepo::set_permission(&conn, Permission::Denied).unwrap();
        assert_eq!(PrefsRepo::permission(&conn).unwrap(), Permission::Denied);
        PrefsRepo::set_permission(&conn, Permission::Default).unwrap();
        assert_eq!(PrefsRepo::permission(&conn).unwrap(), Permission::Default);
    }

    #[test]
    fn test_toggle_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("namazkar.db");

        {
            let conn = Connection::open(&path).unwrap();
            run_migrations(&conn).unwrap();
            PrefsRepo::set_enabled(&conn, "Maghrib", true).unwrap();
            PrefsRepo::set_city(&conn, "Sopore").unwrap();
        }

        let conn = Connection::open(&path).unwrap();
        run_migrations(&conn).unwrap();
        assert!(PrefsRepo::is_enabled(&conn, "Maghrib").unwrap());
        assert!(!PrefsRepo::is_enabled(&conn, "Isha").unwrap());
        assert_eq!(PrefsRepo::city(&conn).unwrap().as_deref(), Some("Sopore"));
    }
}
