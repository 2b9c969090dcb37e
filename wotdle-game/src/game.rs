//! The game façade: one persisted store, one session, one clock.
use thiserror::Error;

use crate::clock::{Clock, ReferenceZone, SystemClock};
use crate::config::{ConfigError, GameConfig};
use crate::daily::TodaysWotdle;
use crate::guess::{self, GuessOutcome};
use crate::persisted::PersistedDataStore;
use crate::reconcile::reconcile;
use crate::report::{WinReportResult, WinReporter, WinTicket};
use crate::session::SessionState;
use crate::store::{PersistedStore, StoreError};
use crate::vehicle::Vehicle;
use crate::{DataSource, KeyValueStorage};

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Today's game for one player on one device.
#[derive(Debug)]
pub struct WotdleGame<S: KeyValueStorage, C: Clock = SystemClock> {
    store: PersistedStore<S>,
    session: SessionState,
    clock: C,
    zone: ReferenceZone,
    config: GameConfig,
}

impl<S: KeyValueStorage> WotdleGame<S, SystemClock> {
    /// Open the game against `storage` with the host clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the config names an unknown zone or storage cannot be read.
    pub fn open(storage: S, config: GameConfig) -> Result<Self, GameError> {
        Self::open_with_clock(storage, SystemClock, config)
    }
}

impl<S: KeyValueStorage, C: Clock> WotdleGame<S, C> {
    /// Open the game with an explicit clock. The persisted record is loaded
    /// and migrated; the session starts unhydrated.
    ///
    /// # Errors
    ///
    /// Returns an error if the config names an unknown zone or storage cannot be read.
    pub fn open_with_clock(storage: S, clock: C, config: GameConfig) -> Result<Self, GameError> {
        let zone = config.reference_zone()?;
        let store = PersistedStore::open(storage, config.storage_key.clone())?;
        Ok(Self {
            store,
            session: SessionState::new(),
            clock,
            zone,
            config,
        })
    }

    /// Current reference wall-clock ms.
    #[must_use]
    pub fn now_ms(&self) -> i64 {
        self.zone.wall_clock_ms(self.clock.now_utc())
    }

    /// Key of today's daily answer.
    #[must_use]
    pub fn date_key(&self) -> String {
        self.zone.date_key(self.clock.now_utc())
    }

    /// Today as `yyyymmdd` in the reference zone.
    #[must_use]
    pub fn day_number(&self) -> u32 {
        self.zone.day_number(self.clock.now_utc())
    }

    /// Ask `source` for today's answer.
    ///
    /// # Errors
    ///
    /// Propagates the data source's error; upstream inconsistencies are not
    /// recovered here.
    pub fn fetch_todays<D: DataSource>(&self, source: &D) -> Result<TodaysWotdle, D::Error> {
        source.fetch_todays(&self.date_key())
    }

    /// Derive today's session from the fetched answer.
    ///
    /// A no-op returning `false` when already hydrated or when `todays` is absent.
    pub fn hydrate(&mut self, todays: Option<&TodaysWotdle>) -> bool {
        if self.session.is_hydrated() {
            log::debug!("Session already hydrated; ignoring");
            return false;
        }
        let Some(todays) = todays else {
            return false;
        };
        let now = self.now_ms();
        let planned = self.store.data().map(|data| reconcile(data, todays, now));
        let daily = match planned {
            Some(clean) if !clean.mutates_store() => clean.session,
            _ => self
                .store
                .update_or_warn(|data| reconcile(data, todays, now).apply(data)),
        };
        log::debug!(
            "Hydrated session for {}: victory={} remaining={}",
            self.date_key(),
            daily.victory,
            daily.tank_list_not_guessed.len()
        );
        self.session.hydrate_with(daily)
    }

    /// Record a guess and persist it. On a win the returned ticket can be
    /// sent with [`Self::report_win`] or run detached.
    pub fn guess_vehicle(&mut self, vehicle: &Vehicle) -> GuessOutcome {
        if !self.session.is_hydrated() {
            log::debug!("Guess before hydration ignored");
            return GuessOutcome::Ignored;
        }
        if self.session.victory() == Some(true) {
            return GuessOutcome::AlreadyWon;
        }
        let now = self.now_ms();
        let session = &mut self.session;
        self.store
            .update_or_warn(|data| guess::apply_guess(session, data, vehicle, now))
    }

    /// Report a win and store the rank it yields; returns the stored rank.
    /// Local state is never rolled back.
    pub async fn report_win<R>(&mut self, ticket: WinTicket, reporter: &R) -> Option<i64>
    where
        R: WinReporter + ?Sized + Sync,
    {
        let result = ticket.send(reporter).await;
        let rank = result.rank;
        if self.apply_win_report(result) {
            rank
        } else {
            None
        }
    }

    /// Apply the outcome of a detached report. Returns whether the record changed.
    pub fn apply_win_report(&mut self, result: WinReportResult) -> bool {
        if result.rank.is_none() {
            return false;
        }
        let session = &self.session;
        self.store
            .update_or_warn(|data| guess::apply_win_report(session, data, result))
    }

    #[must_use]
    pub const fn session(&self) -> &SessionState {
        &self.session
    }

    /// The migrated persisted record.
    #[must_use]
    pub fn persisted(&self) -> Option<&PersistedDataStore> {
        self.store.data()
    }

    #[must_use]
    pub const fn store(&self) -> &PersistedStore<S> {
        &self.store
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub const fn zone(&self) -> ReferenceZone {
        self.zone
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }
}
