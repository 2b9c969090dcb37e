//! Game configuration
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::ReferenceZone;

pub const DEFAULT_STORAGE_KEY: &str = "wotdle-store";
pub const DEFAULT_TIME_ZONE: &str = "America/New_York";
pub const DEFAULT_MIN_TIER: i32 = 8;
pub const DEFAULT_WIN_REPORT_PATH: &str = "/api/winnormal";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown reference time zone: {0}")]
    UnknownTimeZone(String),
}

/// Tunables shared by the core and its hosts. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Key under which the persisted blob is stored.
    pub storage_key: String,
    /// IANA name of the zone that defines the game day.
    pub reference_time_zone: String,
    /// Lowest vehicle tier that enters the guess list.
    pub min_tier: i32,
    /// Endpoint the win report is posted to.
    pub win_report_path: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            reference_time_zone: DEFAULT_TIME_ZONE.to_string(),
            min_tier: DEFAULT_MIN_TIER,
            win_report_path: DEFAULT_WIN_REPORT_PATH.to_string(),
        }
    }
}

impl GameConfig {
    /// Parse a config document; absent fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or names an unknown zone.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.reference_zone()?;
        Ok(config)
    }

    /// Resolve the configured reference zone.
    ///
    /// # Errors
    ///
    /// Returns an error if the zone name is not in the tz database.
    pub fn reference_zone(&self) -> Result<ReferenceZone, ConfigError> {
        self.reference_time_zone
            .parse::<chrono_tz::Tz>()
            .map(ReferenceZone::new)
            .map_err(|_| ConfigError::UnknownTimeZone(self.reference_time_zone.clone()))
    }
}
