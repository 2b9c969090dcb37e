//! Process-lifetime view of today's game
use serde::Serialize;

use crate::vehicle::Vehicle;

/// Today's game once it has been derived from the fetched answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySession {
    pub todays_vehicle: Vehicle,
    /// Reference wall-clock ms at hydration.
    pub date_ms_since_epoch: i64,
    pub victory: bool,
    pub tank_list_not_guessed: Vec<Vehicle>,
}

impl DailySession {
    /// Drop `vehicle` from the remaining list by id.
    pub fn mark_guessed(&mut self, vehicle: &Vehicle) {
        self.tank_list_not_guessed
            .retain(|candidate| candidate.tank_id != vehicle.tank_id);
    }

    #[must_use]
    pub fn is_answer(&self, vehicle: &Vehicle) -> bool {
        self.todays_vehicle.tank_id == vehicle.tank_id
    }
}

/// Session state; empty until hydrated, hydrated at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    daily: Option<DailySession>,
}

impl SessionState {
    #[must_use]
    pub const fn new() -> Self {
        Self { daily: None }
    }

    #[must_use]
    pub const fn is_hydrated(&self) -> bool {
        self.daily.is_some()
    }

    /// Install the derived session. Ignored once hydrated; returns whether it took.
    pub fn hydrate_with(&mut self, daily: DailySession) -> bool {
        if self.daily.is_some() {
            return false;
        }
        self.daily = Some(daily);
        true
    }

    #[must_use]
    pub const fn daily(&self) -> Option<&DailySession> {
        self.daily.as_ref()
    }

    pub const fn daily_mut(&mut self) -> Option<&mut DailySession> {
        self.daily.as_mut()
    }

    #[must_use]
    pub fn todays_vehicle(&self) -> Option<&Vehicle> {
        self.daily.as_ref().map(|d| &d.todays_vehicle)
    }

    #[must_use]
    pub fn date_ms_since_epoch(&self) -> Option<i64> {
        self.daily.as_ref().map(|d| d.date_ms_since_epoch)
    }

    #[must_use]
    pub fn victory(&self) -> Option<bool> {
        self.daily.as_ref().map(|d| d.victory)
    }

    #[must_use]
    pub fn tank_list_not_guessed(&self) -> Option<&[Vehicle]> {
        self.daily.as_ref().map(|d| d.tank_list_not_guessed.as_slice())
    }
}
