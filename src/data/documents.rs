use chrono::{Datelike, NaiveDate};
use indexmap::IndexMap;
use serde::Deserialize;

/// Prayer name → base "HH:MM", in document order.
pub type DaySchedule = IndexMap<String, String>;

/// Reference prayer times for every day of the year, keyed by "DD-MM".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Timetable {
    pub days: IndexMap<String, DaySchedule>,
}

impl Timetable {
    pub fn day(&self, date: NaiveDate) -> Option<&DaySchedule> {
        self.days.get(&day_key(date))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct City {
    /// Minutes relative to the reference timetable
    pub offset: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CityRegistry {
    pub base_city: String,
    pub cities: IndexMap<String, City>,
}

impl CityRegistry {
    pub fn offset(&self, name: &str) -> Option<i32> {
        self.cities.get(name).map(|c| c.offset)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cities.keys().map(String::as_str)
    }

    /// Pick the stored city if the registry knows it, otherwise the base city.
    /// Returns the city name and its offset. The base city is the reference
    /// for the timetable, so it gets offset 0 when it has no entry of its own.
    pub fn resolve<'a>(&'a self, stored: Option<&'a str>) -> (&'a str, i32) {
        if let Some(name) = stored {
            if let Some(offset) = self.offset(name) {
                return (name, offset);
            }
        }
        (self.base_city.as_str(), self.offset(&self.base_city).unwrap_or(0))
    }
}

/// Both documents, fetched together.
#[derive(Debug, Clone)]
pub struct Documents {
    pub timetable: Timetable,
    pub cities: CityRegistry,
}

/// Timetable key for a calendar day: "DD-MM"
pub fn day_key(date: NaiveDate) -> String {
    format!("{:02}-{:02}", date.day(), date.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> CityRegistry {
        serde_json::from_str(
            r#"{
                "base_city": "Srinagar",
                "cities": {
                    "Srinagar": { "offset": 0 },
                    "Baramulla": { "offset": 3 },
                    "Anantnag": { "offset": -2 }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_day_key_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(day_key(date), "07-03");
        let date = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        assert_eq!(day_key(date), "25-12");
    }

    #[test]
    fn test_timetable_keeps_document_order() {
        let table: Timetable = serde_json::from_str(
            r#"{ "days": { "01-01": { "Fajr": "06:40", "Sunrise": "07:55", "Dhuhr": "12:40", "Asr": "14:55" } } }"#,
        )
        .unwrap();
        let day = table
            .day(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
            .unwrap();
        let names: Vec<&str> = day.keys().map(String::as_str).collect();
        assert_eq!(names, ["Fajr", "Sunrise", "Dhuhr", "Asr"]);
        assert!(table.day(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()).is_none());
    }

    #[test]
    fn test_resolve_city() {
        let cities = registry();
        assert_eq!(cities.resolve(Some("Baramulla")), ("Baramulla", 3));
        assert_eq!(cities.resolve(Some("Atlantis")), ("Srinagar", 0));
        assert_eq!(cities.resolve(None), ("Srinagar", 0));
        assert_eq!(
            cities.names().collect::<Vec<_>>(),
            ["Srinagar", "Baramulla", "Anantnag"]
        );
    }

    #[test]
    fn test_base_city_without_entry_has_zero_offset() {
        let cities: CityRegistry = serde_json::from_str(
            r#"{ "base_city": "Reference", "cities": { "Leh": { "offset": -12 } } }"#,
        )
        .unwrap();
        assert_eq!(cities.resolve(None), ("Reference", 0));
    }
}
