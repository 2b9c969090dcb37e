//! Per-guess state transitions
//!
//! Per day the game moves `NotPlayed -> InProgress -> Won`. Both functions
//! here mutate the session and the in-memory record only; persisting the
//! record is the caller's job.

use serde::Serialize;

use crate::clock::{same_day, truncate_to_midnight};
use crate::persisted::{GameMode, GameRecord, PersistedDataStore};
use crate::report::{WinReportResult, WinTicket};
use crate::session::SessionState;
use crate::vehicle::Vehicle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GuessOutcome {
    /// The session is not hydrated yet.
    Ignored,
    /// Today is already won.
    AlreadyWon,
    Incorrect,
    Victory(WinTicket),
}

impl GuessOutcome {
    /// Whether the guess was recorded.
    #[must_use]
    pub const fn counted(&self) -> bool {
        matches!(self, Self::Incorrect | Self::Victory(_))
    }

    #[must_use]
    pub const fn ticket(&self) -> Option<WinTicket> {
        match self {
            Self::Victory(ticket) => Some(*ticket),
            _ => None,
        }
    }
}

/// Record a guess made at `now_ms` (reference wall-clock).
pub fn apply_guess(
    session: &mut SessionState,
    store: &mut PersistedDataStore,
    vehicle: &Vehicle,
    now_ms: i64,
) -> GuessOutcome {
    let Some(daily) = session.daily_mut() else {
        return GuessOutcome::Ignored;
    };
    if daily.victory {
        return GuessOutcome::AlreadyWon;
    }

    let classic = store.mode_mut(GameMode::Classic);
    classic.last_guess_epoch_ms = now_ms;
    classic.daily_vehicle_guesses.insert(0, vehicle.clone());
    daily.mark_guessed(vehicle);

    if !daily.is_answer(vehicle) {
        return GuessOutcome::Incorrect;
    }

    daily.victory = true;
    let guess_count = u32::try_from(classic.daily_vehicle_guesses.len()).unwrap_or(u32::MAX);
    let tank_id = daily.todays_vehicle.tank_id;
    classic.previous_games.push(GameRecord {
        guess_count,
        date: truncate_to_midnight(daily.date_ms_since_epoch),
        tank_id,
    });
    GuessOutcome::Victory(WinTicket {
        day_ms: daily.date_ms_since_epoch,
        tank_id,
        guess_count,
    })
}

/// Store the reported rank. Returns whether the record changed.
///
/// Results without a rank, and results for a day other than the session's,
/// leave the record alone.
pub fn apply_win_report(
    session: &SessionState,
    store: &mut PersistedDataStore,
    result: WinReportResult,
) -> bool {
    let Some(rank) = result.rank else {
        return false;
    };
    let Some(day_ms) = session.date_ms_since_epoch() else {
        return false;
    };
    if !same_day(day_ms, result.ticket.day_ms) {
        log::debug!("Ignoring win report for a different day");
        return false;
    }
    store.mode_mut(GameMode::Classic).nth_guess_normal = Some(rank);
    true
}
