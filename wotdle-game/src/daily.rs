//! Today's answer and the data it is resolved from
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::DataSource;
use crate::vehicle::Vehicle;

/// What hydration consumes: the guessable vehicles and today's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodaysWotdle {
    pub vehicle_list: Vec<Vehicle>,
    pub tank_of_day: Vehicle,
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("no daily answer recorded for {date_key}")]
    MissingDailyEntry { date_key: String },
    #[error("tank of day {tank_id} is not in the vehicle list")]
    TankOfDayMissing { tank_id: i64 },
    #[error("vehicle list is empty")]
    EmptyVehicleList,
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reference to the answer vehicle inside a daily row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRef {
    pub tank_id: i64,
}

/// One row of the daily answer table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyEntry {
    /// Reference-zone date, `dd_mm_yy`.
    pub dd_mm_yy: String,
    pub normal: AnswerRef,
}

/// Vehicle table plus daily answers, as served by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyDataset {
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub daily: Vec<DailyEntry>,
    #[serde(skip, default = "default_min_tier")]
    min_tier: i32,
}

const fn default_min_tier() -> i32 {
    crate::config::DEFAULT_MIN_TIER
}

impl Default for DailyDataset {
    fn default() -> Self {
        Self {
            vehicles: Vec::new(),
            daily: Vec::new(),
            min_tier: default_min_tier(),
        }
    }
}

impl DailyDataset {
    /// Parse a dataset document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the dataset shape.
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn with_min_tier(mut self, min_tier: i32) -> Self {
        self.min_tier = min_tier;
        self
    }

    /// Vehicles eligible for guessing.
    #[must_use]
    pub fn eligible_vehicles(&self) -> Vec<Vehicle> {
        self.vehicles
            .iter()
            .filter(|v| v.tier >= self.min_tier)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn entry_for(&self, date_key: &str) -> Option<&DailyEntry> {
        self.daily.iter().find(|entry| entry.dd_mm_yy == date_key)
    }

    /// Resolve today's answer without a daily row by picking from the
    /// eligible list deterministically for `day_number`.
    ///
    /// # Errors
    ///
    /// Returns an error if no vehicle is eligible.
    pub fn seeded_todays(&self, day_number: u32) -> Result<TodaysWotdle, DataError> {
        let vehicle_list = self.eligible_vehicles();
        let tank_of_day = crate::seed::pick_tank_of_day(&vehicle_list, day_number)
            .cloned()
            .ok_or(DataError::EmptyVehicleList)?;
        Ok(TodaysWotdle {
            vehicle_list,
            tank_of_day,
        })
    }
}

impl DataSource for DailyDataset {
    type Error = DataError;

    fn fetch_todays(&self, date_key: &str) -> Result<TodaysWotdle, Self::Error> {
        let entry = self
            .entry_for(date_key)
            .ok_or_else(|| DataError::MissingDailyEntry {
                date_key: date_key.to_string(),
            })?;
        resolve_todays(self.eligible_vehicles(), entry.normal.tank_id)
    }
}

/// Pair a vehicle list with the answer id, failing if the answer is not listed.
///
/// # Errors
///
/// Returns [`DataError::TankOfDayMissing`] if no listed vehicle has `tank_id`.
pub fn resolve_todays(vehicle_list: Vec<Vehicle>, tank_id: i64) -> Result<TodaysWotdle, DataError> {
    let tank_of_day = vehicle_list
        .iter()
        .find(|v| v.tank_id == tank_id)
        .cloned()
        .ok_or(DataError::TankOfDayMissing { tank_id })?;
    Ok(TodaysWotdle {
        vehicle_list,
        tank_of_day,
    })
}
