use log::{debug, info};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use thiserror::Error;

use crate::config::settings::DataConfig;
use crate::data::documents::{CityRegistry, Documents, Timetable};

#[derive(Debug, Error)]
pub enum DataError {
    #[error("Error fetching {url}")]
    Http {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },
    #[error("Error reading {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Error parsing {location} as JSON")]
    Parse {
        location: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Where the timetable and city registry live. Each location is either an
/// http(s) URL or a filesystem path.
#[derive(Debug, Clone)]
pub struct DataSource {
    timetable: String,
    cities: String,
}

impl DataSource {
    pub fn new(timetable: impl Into<String>, cities: impl Into<String>) -> Self {
        Self {
            timetable: timetable.into(),
            cities: cities.into(),
        }
    }

    pub fn from_config(config: &DataConfig) -> Self {
        Self::new(&config.timetable, &config.cities)
    }

    pub fn load_timetable(&self) -> Result<Timetable, DataError> {
        fetch_json(&self.timetable)
    }

    pub fn load_cities(&self) -> Result<CityRegistry, DataError> {
        fetch_json(&self.cities)
    }

    /// Fetch both documents. Either one failing fails the whole load.
    pub fn load(&self) -> Result<Documents, DataError> {
        let timetable = self.load_timetable()?;
        let cities = self.load_cities()?;
        info!(
            "Loaded {} timetable days and {} cities",
            timetable.days.len(),
            cities.cities.len()
        );
        Ok(Documents { timetable, cities })
    }
}

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

fn fetch_json<T: DeserializeOwned>(location: &str) -> Result<T, DataError> {
    debug!("Fetching {}", location);
    let parsed = if is_url(location) {
        // Non-2xx statuses come back as ureq::Error::Status
        let response = ureq::get(location).call().map_err(|e| DataError::Http {
            url: location.to_string(),
            source: Box::new(e),
        })?;
        serde_json::from_reader(response.into_reader())
    } else {
        let file = File::open(location).map_err(|e| DataError::Io {
            path: location.to_string(),
            source: e,
        })?;
        serde_json::from_reader(BufReader::new(file))
    };
    parsed.map_err(|e| DataError::Parse {
        location: location.to_string(),
        source: e,
    })
}
