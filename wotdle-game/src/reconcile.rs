//! Reconciliation of the persisted record against today's answer
//!
//! [`reconcile`] is pure: it inspects the record and the fetched answer and
//! describes both the session to install and the record changes required.
//! [`Reconciliation::apply`] performs those changes.

use crate::clock::same_day;
use crate::daily::TodaysWotdle;
use crate::persisted::{LATEST_VERSION, PersistedDataStore};
use crate::session::DailySession;
use crate::vehicle::without_guessed;

/// Everything hydration decided for today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub session: DailySession,
    pub won_today: bool,
    pub played_today: bool,
    /// A new day started: today's guesses must be cleared.
    pub reset_daily_guesses: bool,
    /// The record's version drifted and must be brought to the latest.
    pub bump_version: bool,
}

impl Reconciliation {
    /// Apply the record changes and hand back the session to install.
    pub fn apply(self, store: &mut PersistedDataStore) -> DailySession {
        if self.bump_version {
            *store = std::mem::take(store).migrate();
        }
        if self.reset_daily_guesses {
            store.classic.daily_vehicle_guesses.clear();
        }
        self.session
    }

    /// Whether applying this changes the record.
    #[must_use]
    pub const fn mutates_store(&self) -> bool {
        self.reset_daily_guesses || self.bump_version
    }
}

/// Derive today's session from the record and the fetched answer.
///
/// `now_ms` is the current reference wall-clock time.
#[must_use]
pub fn reconcile(store: &PersistedDataStore, todays: &TodaysWotdle, now_ms: i64) -> Reconciliation {
    let classic = &store.classic;
    let won_today = classic
        .previous_games
        .last()
        .is_some_and(|last| same_day(last.date, now_ms));
    let played_today = same_day(classic.last_guess_epoch_ms, now_ms);
    let bump_version = store.version != Some(LATEST_VERSION);

    // A drifted record loses today's guesses when it migrates.
    let guesses = if bump_version {
        store.clone().migrate().classic.daily_vehicle_guesses
    } else {
        classic.daily_vehicle_guesses.clone()
    };

    let (tank_list_not_guessed, reset_daily_guesses) = if won_today || played_today {
        (without_guessed(&todays.vehicle_list, &guesses), false)
    } else {
        (todays.vehicle_list.clone(), true)
    };

    Reconciliation {
        session: DailySession {
            todays_vehicle: todays.tank_of_day.clone(),
            date_ms_since_epoch: now_ms,
            victory: won_today,
            tank_list_not_guessed,
        },
        won_today,
        played_today,
        reset_daily_guesses,
        bump_version,
    }
}
