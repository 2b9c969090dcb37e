//! Persisted data model and schema migration
//!
//! The blob kept in durable storage went through two layouts:
//!
//! * versions absent, `0` and `1` kept the classic-mode fields at the root;
//! * version `2` nests them under `classic`.
//!
//! A raw blob is decoded into [`StoredBlob`] and brought to the current layout
//! by [`StoredBlob::migrate`]. Decoding is lenient: a field that is missing or
//! malformed falls back to its empty value instead of failing the load.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::vehicle::Vehicle;

pub const LATEST_VERSION: u32 = 2;

/// Game variants known to the store. Only classic is wired up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Classic,
}

/// Result of one won day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub guess_count: u32,
    /// Wall-clock ms truncated to midnight.
    pub date: i64,
    pub tank_id: i64,
}

/// Per-mode persisted progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedGameElement {
    /// Today's guesses, most recent first.
    pub daily_vehicle_guesses: Vec<Vehicle>,
    pub previous_games: Vec<GameRecord>,
    pub last_guess_epoch_ms: i64,
    /// Server-reported rank of today's win.
    pub nth_guess_normal: Option<i64>,
}

impl PersistedGameElement {
    fn from_value_lenient(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };
        Self {
            daily_vehicle_guesses: field(object, "dailyVehicleGuesses").unwrap_or_default(),
            previous_games: field(object, "previousGames").unwrap_or_default(),
            last_guess_epoch_ms: field(object, "lastGuessEpochMs").unwrap_or_default(),
            nth_guess_normal: field(object, "nthGuessNormal").flatten(),
        }
    }
}

/// Root of the current (version 2) layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedDataStore {
    pub version: Option<u32>,
    #[serde(default)]
    pub classic: PersistedGameElement,
}

impl Default for PersistedDataStore {
    fn default() -> Self {
        Self {
            version: Some(LATEST_VERSION),
            classic: PersistedGameElement::default(),
        }
    }
}

/// Addresses either the root version or one mode's sub-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKey {
    Version,
    Mode(GameMode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeField {
    DailyVehicleGuesses,
    PreviousGames,
    LastGuessEpochMs,
    NthGuessNormal,
}

/// A value read from or written to the store through [`StateKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeValue {
    Version(Option<u32>),
    DailyVehicleGuesses(Vec<Vehicle>),
    PreviousGames(Vec<GameRecord>),
    LastGuessEpochMs(i64),
    NthGuessNormal(Option<i64>),
}

impl ModeValue {
    /// Field this value belongs to, `None` for the root version.
    #[must_use]
    pub const fn field(&self) -> Option<ModeField> {
        match self {
            Self::Version(_) => None,
            Self::DailyVehicleGuesses(_) => Some(ModeField::DailyVehicleGuesses),
            Self::PreviousGames(_) => Some(ModeField::PreviousGames),
            Self::LastGuessEpochMs(_) => Some(ModeField::LastGuessEpochMs),
            Self::NthGuessNormal(_) => Some(ModeField::NthGuessNormal),
        }
    }
}

impl PersistedDataStore {
    #[must_use]
    pub fn is_latest(&self) -> bool {
        self.version == Some(LATEST_VERSION)
    }

    /// Sub-state of `mode`.
    #[must_use]
    pub const fn mode(&self, mode: GameMode) -> &PersistedGameElement {
        match mode {
            GameMode::Classic => &self.classic,
        }
    }

    pub const fn mode_mut(&mut self, mode: GameMode) -> &mut PersistedGameElement {
        match mode {
            GameMode::Classic => &mut self.classic,
        }
    }

    /// Read one field. Yields nothing until the store is at the latest version.
    #[must_use]
    pub fn get_mode_state(&self, key: StateKey, field: ModeField) -> Option<ModeValue> {
        if !self.is_latest() {
            return None;
        }
        let mode = match key {
            StateKey::Version => return Some(ModeValue::Version(self.version)),
            StateKey::Mode(mode) => self.mode(mode),
        };
        Some(match field {
            ModeField::DailyVehicleGuesses => {
                ModeValue::DailyVehicleGuesses(mode.daily_vehicle_guesses.clone())
            }
            ModeField::PreviousGames => ModeValue::PreviousGames(mode.previous_games.clone()),
            ModeField::LastGuessEpochMs => ModeValue::LastGuessEpochMs(mode.last_guess_epoch_ms),
            ModeField::NthGuessNormal => ModeValue::NthGuessNormal(mode.nth_guess_normal),
        })
    }

    /// Write one field. Returns `false` when the value does not fit the key.
    pub fn set_mode_state(&mut self, key: StateKey, value: ModeValue) -> bool {
        let element = match (key, &value) {
            (StateKey::Version, ModeValue::Version(version)) => {
                self.version = *version;
                return true;
            }
            (StateKey::Version, _) | (StateKey::Mode(_), ModeValue::Version(_)) => return false,
            (StateKey::Mode(mode), _) => self.mode_mut(mode),
        };
        match value {
            ModeValue::DailyVehicleGuesses(guesses) => element.daily_vehicle_guesses = guesses,
            ModeValue::PreviousGames(games) => element.previous_games = games,
            ModeValue::LastGuessEpochMs(ms) => element.last_guess_epoch_ms = ms,
            ModeValue::NthGuessNormal(nth) => element.nth_guess_normal = nth,
            ModeValue::Version(_) => return false,
        }
        true
    }

    /// Bring an in-memory store whose version drifted back to the latest one.
    ///
    /// Stores from before daily resets worked (absent or `0`) lose today's
    /// guesses. A no-op on a latest store.
    #[must_use]
    pub fn migrate(mut self) -> Self {
        if self.is_latest() {
            return self;
        }
        if predates_daily_reset(self.version) {
            self.classic.daily_vehicle_guesses.clear();
        }
        self.version = Some(LATEST_VERSION);
        self
    }
}

/// Flat layout used before version 2.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyStore {
    pub version: Option<u32>,
    pub daily_vehicle_guesses: Option<Vec<Vehicle>>,
    pub previous_games: Option<Vec<GameRecord>>,
    pub last_guess_epoch_ms: Option<i64>,
    pub nth_guess_normal: Option<i64>,
    /// A nested element found next to (or instead of) the flat fields.
    pub classic: Option<PersistedGameElement>,
}

impl LegacyStore {
    fn from_object(version: Option<u32>, object: &Map<String, Value>) -> Self {
        Self {
            version,
            daily_vehicle_guesses: field(object, "dailyVehicleGuesses"),
            previous_games: field(object, "previousGames"),
            last_guess_epoch_ms: field(object, "lastGuessEpochMs"),
            nth_guess_normal: field(object, "nthGuessNormal").flatten(),
            classic: object
                .get("classic")
                .map(PersistedGameElement::from_value_lenient),
        }
    }

    fn has_flat_fields(&self) -> bool {
        self.daily_vehicle_guesses.is_some()
            || self.previous_games.is_some()
            || self.last_guess_epoch_ms.is_some()
            || self.nth_guess_normal.is_some()
    }

    fn into_current(self) -> PersistedDataStore {
        let reset_daily = predates_daily_reset(self.version);
        let mut classic = if self.has_flat_fields() {
            PersistedGameElement {
                daily_vehicle_guesses: self.daily_vehicle_guesses.unwrap_or_default(),
                previous_games: self.previous_games.unwrap_or_default(),
                last_guess_epoch_ms: self.last_guess_epoch_ms.unwrap_or_default(),
                nth_guess_normal: self.nth_guess_normal,
            }
        } else {
            self.classic.unwrap_or_default()
        };
        if reset_daily {
            classic.daily_vehicle_guesses.clear();
        }
        PersistedDataStore {
            version: Some(LATEST_VERSION),
            classic,
        }
    }
}

/// A decoded blob, tagged by the layout it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredBlob {
    Legacy(LegacyStore),
    Current(PersistedDataStore),
}

impl StoredBlob {
    /// Decode a serialized blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or not a JSON object.
    pub fn decode(json: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Classify a JSON value by its `version` field.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let Value::Object(object) = value else {
            return Err(serde::de::Error::custom("persisted blob must be a JSON object"));
        };
        let version = object
            .get("version")
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok());

        if version == Some(LATEST_VERSION)
            && let Some(classic) = object.get("classic")
            && let Ok(classic) = serde_json::from_value::<PersistedGameElement>(classic.clone())
        {
            return Ok(Self::Current(PersistedDataStore { version, classic }));
        }
        Ok(Self::Legacy(LegacyStore::from_object(version, &object)))
    }

    /// Version recorded in the blob.
    #[must_use]
    pub const fn version(&self) -> Option<u32> {
        match self {
            Self::Legacy(legacy) => legacy.version,
            Self::Current(current) => current.version,
        }
    }

    #[must_use]
    pub const fn is_current(&self) -> bool {
        matches!(self, Self::Current(_))
    }

    /// Bring the blob to the latest layout.
    #[must_use]
    pub fn migrate(self) -> PersistedDataStore {
        match self {
            Self::Current(current) => current.migrate(),
            Self::Legacy(legacy) => legacy.into_current(),
        }
    }
}

const fn predates_daily_reset(version: Option<u32>) -> bool {
    matches!(version, None | Some(0))
}

fn field<T: DeserializeOwned>(object: &Map<String, Value>, name: &str) -> Option<T> {
    let value = object.get(name)?;
    if value.is_null() {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(tank_id: i64, guess_count: u32, date: i64) -> GameRecord {
        GameRecord {
            guess_count,
            date,
            tank_id,
        }
    }

    fn legacy_blob(version: Value) -> Value {
        json!({
            "version": version,
            "dailyVehicleGuesses": [{"tank_id": 3, "tier": 8}],
            "previousGames": [{"guessCount": 4, "date": 86_400_000, "tankId": 9}],
            "lastGuessEpochMs": 1234,
            "nthGuessNormal": 17,
        })
    }

    #[test]
    fn unversioned_and_zero_blobs_drop_daily_guesses() {
        for version in [Value::Null, json!(0)] {
            let mut raw = legacy_blob(version);
            if raw["version"].is_null() {
                raw.as_object_mut().unwrap().remove("version");
            }
            let store = StoredBlob::from_value(raw).unwrap().migrate();
            assert_eq!(store.version, Some(LATEST_VERSION));
            assert!(store.classic.daily_vehicle_guesses.is_empty());
            assert_eq!(store.classic.previous_games, vec![record(9, 4, 86_400_000)]);
            assert_eq!(store.classic.last_guess_epoch_ms, 1234);
            assert_eq!(store.classic.nth_guess_normal, Some(17));
        }
    }

    #[test]
    fn version_one_keeps_daily_guesses() {
        let store = StoredBlob::from_value(legacy_blob(json!(1)))
            .unwrap()
            .migrate();
        assert_eq!(store.classic.daily_vehicle_guesses, vec![Vehicle::new(3, 8)]);
    }

    #[test]
    fn migration_is_idempotent() {
        for version in [json!(0), json!(1), json!(7)] {
            let once = StoredBlob::from_value(legacy_blob(version)).unwrap().migrate();
            let twice = once.clone().migrate();
            assert_eq!(once, twice);

            let encoded = serde_json::to_string(&once).unwrap();
            let decoded = StoredBlob::decode(&encoded).unwrap();
            assert!(decoded.is_current());
            assert_eq!(decoded.migrate(), once);
        }
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let store = StoredBlob::decode(r#"{"version": 1}"#).unwrap().migrate();
        assert_eq!(store, PersistedDataStore::default());

        let store = StoredBlob::decode(r#"{"version": 2, "classic": {}}"#)
            .unwrap()
            .migrate();
        assert_eq!(store, PersistedDataStore::default());
    }

    #[test]
    fn malformed_fields_are_salvaged_individually() {
        let raw = json!({
            "version": 1,
            "dailyVehicleGuesses": "not a list",
            "previousGames": [{"guessCount": 2, "date": 0, "tankId": 1}],
        });
        let store = StoredBlob::from_value(raw).unwrap().migrate();
        assert!(store.classic.daily_vehicle_guesses.is_empty());
        assert_eq!(store.classic.previous_games.len(), 1);
    }

    #[test]
    fn broken_current_blob_keeps_nested_classic() {
        let raw = json!({
            "version": 2,
            "classic": {
                "dailyVehicleGuesses": [{"tank_id": 1}],
                "previousGames": "oops",
                "lastGuessEpochMs": 55,
            },
        });
        let blob = StoredBlob::from_value(raw).unwrap();
        assert!(!blob.is_current());
        let store = blob.migrate();
        assert_eq!(store.classic.daily_vehicle_guesses, vec![Vehicle::new(1, 0)]);
        assert_eq!(store.classic.last_guess_epoch_ms, 55);
        assert!(store.classic.previous_games.is_empty());
    }

    #[test]
    fn non_object_blob_is_rejected() {
        assert!(StoredBlob::decode("[1, 2]").is_err());
        assert!(StoredBlob::decode("not json").is_err());
    }

    #[test]
    fn current_layout_serializes_every_field() {
        let value = serde_json::to_value(PersistedDataStore::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "version": 2,
                "classic": {
                    "dailyVehicleGuesses": [],
                    "previousGames": [],
                    "lastGuessEpochMs": 0,
                    "nthGuessNormal": null,
                },
            })
        );
    }

    #[test]
    fn mode_state_requires_latest_version() {
        let mut store = PersistedDataStore::default();
        assert!(store.set_mode_state(
            StateKey::Mode(GameMode::Classic),
            ModeValue::LastGuessEpochMs(99),
        ));
        assert_eq!(
            store.get_mode_state(StateKey::Mode(GameMode::Classic), ModeField::LastGuessEpochMs),
            Some(ModeValue::LastGuessEpochMs(99))
        );
        assert_eq!(
            store.get_mode_state(StateKey::Version, ModeField::LastGuessEpochMs),
            Some(ModeValue::Version(Some(LATEST_VERSION)))
        );

        assert!(store.set_mode_state(StateKey::Version, ModeValue::Version(Some(1))));
        assert_eq!(
            store.get_mode_state(StateKey::Mode(GameMode::Classic), ModeField::LastGuessEpochMs),
            None
        );
    }

    #[test]
    fn mismatched_key_and_value_are_refused() {
        let mut store = PersistedDataStore::default();
        assert!(!store.set_mode_state(StateKey::Version, ModeValue::LastGuessEpochMs(1)));
        assert!(!store.set_mode_state(
            StateKey::Mode(GameMode::Classic),
            ModeValue::Version(Some(0)),
        ));
        assert_eq!(store, PersistedDataStore::default());
    }

    #[test]
    fn drifted_in_memory_store_resets_guesses_on_migrate() {
        let mut store = PersistedDataStore::default();
        store.classic.daily_vehicle_guesses.push(Vehicle::new(1, 8));
        store.version = Some(0);
        let migrated = store.migrate();
        assert!(migrated.is_latest());
        assert!(migrated.classic.daily_vehicle_guesses.is_empty());
    }
}
