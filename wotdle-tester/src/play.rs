use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::io::Write;
use wotdle_game::{
    Clock, DailyDataset, GuessOutcome, KeyValueStorage, TodaysWotdle, WinReporter, WotdleGame,
};

/// One scripted guess and what the game made of it.
#[derive(Debug, Clone, Serialize)]
pub struct GuessLine {
    pub guessed: i64,
    pub label: String,
    #[serde(flatten)]
    pub outcome: GuessOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayReport {
    pub date_key: String,
    pub hydrated: bool,
    pub guesses: Vec<GuessLine>,
    pub victory: bool,
    pub remaining: usize,
    pub rank: Option<i64>,
}

/// Resolve today's answer from the dataset, or pick one when `seeded`.
pub fn todays_from<S: KeyValueStorage, C: Clock>(
    game: &WotdleGame<S, C>,
    dataset: &DailyDataset,
    seeded: bool,
) -> Result<TodaysWotdle> {
    if seeded {
        return Ok(dataset.seeded_todays(game.day_number())?);
    }
    game.fetch_todays(dataset)
        .context("Failed to find tank of day")
}

/// Play today's game with the given guesses, reporting a win through `reporter`.
pub async fn play_day<S, C, R>(
    game: &mut WotdleGame<S, C>,
    todays: &TodaysWotdle,
    guesses: &[i64],
    reporter: &R,
) -> Result<PlayReport>
where
    S: KeyValueStorage,
    C: Clock,
    R: WinReporter + Sync,
{
    let hydrated = game.hydrate(Some(todays));
    let mut lines = Vec::new();
    let mut rank = None;

    for &tank_id in guesses {
        let Some(vehicle) = todays.vehicle_list.iter().find(|v| v.tank_id == tank_id) else {
            bail!("vehicle {tank_id} is not guessable today");
        };
        let outcome = game.guess_vehicle(vehicle);
        if let Some(ticket) = outcome.ticket() {
            rank = game.report_win(ticket, reporter).await;
        }
        lines.push(GuessLine {
            guessed: tank_id,
            label: vehicle.label(),
            outcome,
        });
    }

    let session = game.session();
    Ok(PlayReport {
        date_key: game.date_key(),
        hydrated,
        guesses: lines,
        victory: session.victory().unwrap_or(false),
        remaining: session.tank_list_not_guessed().map_or(0, <[_]>::len),
        rank,
    })
}

pub fn write_play_report(out: &mut dyn Write, report: &PlayReport, json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(report)?)?;
        return Ok(());
    }
    writeln!(out, "Day: {}", report.date_key)?;
    for line in &report.guesses {
        let verdict = match line.outcome {
            GuessOutcome::Ignored => "ignored",
            GuessOutcome::AlreadyWon => "already won",
            GuessOutcome::Incorrect => "wrong",
            GuessOutcome::Victory(_) => "correct",
        };
        writeln!(out, "  {} ({}): {verdict}", line.label, line.guessed)?;
    }
    writeln!(out, "Victory: {}", if report.victory { "yes" } else { "no" })?;
    writeln!(out, "Vehicles left: {}", report.remaining)?;
    if let Some(rank) = report.rank {
        writeln!(out, "Rank: {rank}")?;
    }
    Ok(())
}
