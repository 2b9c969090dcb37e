//! Wotdle Game Core
//!
//! Platform-agnostic core of the daily "guess the vehicle of the day" game:
//! the versioned persisted record, the in-memory session, the reconciliation
//! run on every load and the guess pipeline with its best-effort win report.
//! Storage, data fetching and the report endpoint are supplied by the host.

pub mod clock;
pub mod config;
pub mod daily;
pub mod game;
pub mod guess;
pub mod persisted;
pub mod reconcile;
pub mod report;
pub mod seed;
pub mod session;
pub mod store;
pub mod vehicle;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, ReferenceZone, SystemClock, same_day, truncate_to_midnight};
pub use config::{ConfigError, GameConfig};
pub use daily::{DailyDataset, DailyEntry, DataError, TodaysWotdle, resolve_todays};
pub use game::{GameError, WotdleGame};
pub use guess::{GuessOutcome, apply_guess, apply_win_report};
pub use persisted::{
    GameMode, GameRecord, LATEST_VERSION, LegacyStore, ModeField, ModeValue, PersistedDataStore,
    PersistedGameElement, StateKey, StoredBlob,
};
pub use reconcile::{Reconciliation, reconcile};
#[cfg(feature = "async")]
pub use report::spawn_report;
pub use report::{WinReportResponse, WinReportResult, WinReporter, WinTicket};
pub use seed::pick_tank_of_day;
pub use session::{DailySession, SessionState};
pub use store::{MemoryStorage, PersistedStore, StoreError};
pub use vehicle::Vehicle;

/// Source of today's answer and the guessable vehicle list.
/// Platform-specific implementations should provide this
pub trait DataSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the answer for the reference-zone day `date_key` (`dd_mm_yy`).
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be fetched or does not contain a
    /// consistent answer for the day.
    fn fetch_todays(&self, date_key: &str) -> Result<TodaysWotdle, Self::Error>;
}

/// Durable string slots keyed by name.
/// Platform-specific implementations should provide this
pub trait KeyValueStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Replace the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be written.
    fn save(&self, key: &str, blob: &str) -> Result<(), Self::Error>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for &T {
    type Error = T::Error;

    fn load(&self, key: &str) -> Result<Option<String>, Self::Error> {
        (**self).load(key)
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), Self::Error> {
        (**self).save(key, blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borrowed_storage_writes_through() {
        let storage = MemoryStorage::new();
        {
            let borrowed = &storage;
            borrowed.save("slot", "{}").unwrap();
        }
        assert_eq!(storage.raw("slot").as_deref(), Some("{}"));
        assert_eq!(KeyValueStorage::load(&&storage, "missing").unwrap(), None);
    }
}
