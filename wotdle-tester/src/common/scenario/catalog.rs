use std::sync::Arc;

use anyhow::{Context, Result, ensure};
use chrono::TimeDelta;
use serde_json::json;
use wotdle_game::{
    DailyDataset, GuessOutcome, MemoryStorage, PersistedDataStore, StoredBlob, Vehicle,
    spawn_report, truncate_to_midnight,
};

use super::{ScenarioCtx, ids, open_game, two_vehicle_day};
use crate::common::reporter::{OfflineReporter, StaticReporter};

const KEY: &str = "wotdle-store";

pub fn smoke(ctx: &ScenarioCtx) -> Result<()> {
    let storage = MemoryStorage::new();
    let mut game = open_game(&storage, &ctx.clock())?;
    ensure!(
        !game.session().is_hydrated(),
        "Session should start unhydrated"
    );
    ensure!(game.hydrate(Some(&two_vehicle_day())), "Hydrate should take");
    ensure!(
        game.guess_vehicle(&Vehicle::new(1, 8)).counted(),
        "Guess should be recorded"
    );
    ensure!(storage.raw(KEY).is_some(), "Record should be written");
    Ok(())
}

pub fn fresh_store(ctx: &ScenarioCtx) -> Result<()> {
    let storage = MemoryStorage::new();
    let mut game = open_game(&storage, &ctx.clock())?;
    game.hydrate(Some(&two_vehicle_day()));

    let first = game.guess_vehicle(&Vehicle::new(1, 8));
    ensure!(
        first == GuessOutcome::Incorrect,
        "Wrong guess gave {first:?}"
    );
    let remaining = ids(game.session().tank_list_not_guessed().unwrap_or_default());
    ensure!(remaining == [2], "Expected [2] remaining, got {remaining:?}");

    let ticket = game
        .guess_vehicle(&Vehicle::new(2, 10))
        .ticket()
        .context("Correct guess should win")?;
    ensure!(ticket.guess_count == 2, "Win should count 2 guesses");
    let data = game.persisted().context("record readable")?;
    ensure!(
        data.classic.previous_games.len() == 1,
        "Exactly one record expected, got {}",
        data.classic.previous_games.len()
    );
    ensure!(data.classic.previous_games[0].guess_count == 2, "guessCount should be 2");
    if ctx.verbose {
        println!("  record: {:?}", data.classic.previous_games[0]);
    }
    Ok(())
}

pub fn won_today_restore(ctx: &ScenarioCtx) -> Result<()> {
    let now = ctx.start_ms();
    let blob = json!({
        "version": 2,
        "classic": {
            "dailyVehicleGuesses": [{"tank_id": 2, "tier": 10}],
            "previousGames": [{"guessCount": 1, "date": truncate_to_midnight(now), "tankId": 2}],
            "lastGuessEpochMs": now - 60_000
        }
    });
    let storage = MemoryStorage::with_blob(KEY, blob.to_string());
    let mut game = open_game(&storage, &ctx.clock())?;
    game.hydrate(Some(&two_vehicle_day()));

    ensure!(game.session().victory() == Some(true), "Win should be restored");
    let remaining = ids(game.session().tank_list_not_guessed().unwrap_or_default());
    ensure!(remaining == [1], "Expected [1] remaining, got {remaining:?}");
    ensure!(
        game.guess_vehicle(&Vehicle::new(1, 8)) == GuessOutcome::AlreadyWon,
        "Won day should refuse guesses"
    );
    Ok(())
}

pub fn win_survives_reload(ctx: &ScenarioCtx) -> Result<()> {
    let storage = MemoryStorage::new();
    let clock = ctx.clock();
    let mut game = open_game(&storage, &clock)?;
    game.hydrate(Some(&two_vehicle_day()));
    game.guess_vehicle(&Vehicle::new(2, 10))
        .ticket()
        .context("Correct guess should win")?;

    clock.advance(TimeDelta::hours(6));
    let mut reloaded = open_game(&storage, &clock)?;
    reloaded.hydrate(Some(&two_vehicle_day()));
    ensure!(
        reloaded.session().victory() == Some(true),
        "Reload on the same day should see the win"
    );
    Ok(())
}

pub fn new_day_reset(ctx: &ScenarioCtx) -> Result<()> {
    let storage = MemoryStorage::new();
    let clock = ctx.clock();
    let mut game = open_game(&storage, &clock)?;
    game.hydrate(Some(&two_vehicle_day()));
    game.guess_vehicle(&Vehicle::new(1, 8));

    clock.advance(TimeDelta::days(1));
    let mut tomorrow = open_game(&storage, &clock)?;
    tomorrow.hydrate(Some(&two_vehicle_day()));
    let remaining = ids(tomorrow.session().tank_list_not_guessed().unwrap_or_default());
    ensure!(remaining == [1, 2], "New day should offer every vehicle");
    let data = tomorrow.persisted().context("record readable")?;
    ensure!(
        data.classic.daily_vehicle_guesses.is_empty(),
        "New day should clear stored guesses"
    );
    Ok(())
}

pub fn legacy_migration(ctx: &ScenarioCtx) -> Result<()> {
    let guesses = json!([{"tank_id": 1, "tier": 8}]);
    let cases = [
        (json!({"dailyVehicleGuesses": guesses}), 0),
        (json!({"version": 0, "dailyVehicleGuesses": guesses}), 0),
        (json!({"version": 1, "dailyVehicleGuesses": guesses}), 1),
    ];
    for (blob, kept) in cases {
        let migrated = StoredBlob::decode(&blob.to_string())?.migrate();
        ensure!(migrated.is_latest(), "Migration should reach the latest version");
        ensure!(
            migrated.classic.daily_vehicle_guesses.len() == kept,
            "{blob} should keep {kept} guesses"
        );
        let again: PersistedDataStore = migrated.clone().migrate();
        ensure!(again == migrated, "Migration should be idempotent");
        if ctx.verbose {
            println!("  {blob} -> {}", serde_json::to_string(&migrated)?);
        }
    }

    let storage = MemoryStorage::with_blob(KEY, json!({"version": 1}).to_string());
    let game = open_game(&storage, &ctx.clock())?;
    ensure!(
        game.store().is_migrated(),
        "Opening should migrate the stored record"
    );
    let stored: serde_json::Value =
        serde_json::from_str(&storage.raw(KEY).context("record written")?)?;
    ensure!(stored["version"] == 2, "Stored version should be bumped");
    Ok(())
}

fn won_game(ctx: &ScenarioCtx) -> Result<(super::ScenarioGame, wotdle_game::WinTicket)> {
    let storage = MemoryStorage::new();
    let mut game = open_game(&storage, &ctx.clock())?;
    game.hydrate(Some(&two_vehicle_day()));
    let ticket = game
        .guess_vehicle(&Vehicle::new(2, 10))
        .ticket()
        .context("Correct guess should win")?;
    Ok((game, ticket))
}

pub async fn ranked_report(ctx: &ScenarioCtx) -> Result<()> {
    let (mut game, ticket) = won_game(ctx)?;
    let rank = 40 + i64::try_from(ctx.seed % 100).unwrap_or_default();
    let stored = game.report_win(ticket, &StaticReporter::ranked(rank)).await;
    ensure!(stored == Some(rank), "Rank {rank} should be stored, got {stored:?}");

    let (mut game, ticket) = won_game(ctx)?;
    let stored = game
        .report_win(ticket, &StaticReporter::new(json!("first")))
        .await;
    ensure!(stored.is_none(), "Non-integer rank should be ignored");
    Ok(())
}

pub async fn failed_report(ctx: &ScenarioCtx) -> Result<()> {
    let (mut game, ticket) = won_game(ctx)?;
    let reporter = OfflineReporter::new(game.config().win_report_path.clone());
    let stored = game.report_win(ticket, &reporter).await;
    ensure!(stored.is_none(), "Failed report should not set a rank");
    ensure!(game.session().victory() == Some(true), "Victory must stand");
    let data = game.persisted().context("record readable")?;
    ensure!(
        data.classic.previous_games.len() == 1,
        "Win record must survive a failed report"
    );
    Ok(())
}

pub async fn detached_report(ctx: &ScenarioCtx) -> Result<()> {
    let (mut game, ticket) = won_game(ctx)?;
    let handle = spawn_report(ticket, Arc::new(StaticReporter::ranked(3)));
    let result = handle.await.context("report task panicked")?;
    ensure!(game.apply_win_report(result), "Detached result should apply");
    let data = game.persisted().context("record readable")?;
    ensure!(data.classic.nth_guess_normal == Some(3), "Rank 3 should be stored");

    let stale = wotdle_game::WinReportResult {
        ticket: wotdle_game::WinTicket {
            day_ms: ticket.day_ms - 86_400_000,
            ..ticket
        },
        rank: Some(99),
    };
    ensure!(
        !game.apply_win_report(stale),
        "Report for another day should be ignored"
    );
    Ok(())
}

pub fn seeded_picker(ctx: &ScenarioCtx) -> Result<()> {
    let vehicles: Vec<Vehicle> = (1..=30)
        .map(|id| Vehicle::new(id, if id % 3 == 0 { 6 } else { 9 }))
        .collect();
    let dataset = DailyDataset::from_json(&json!({ "vehicles": vehicles }).to_string())?;
    let game = open_game(&MemoryStorage::new(), &ctx.clock())?;
    let day = game.day_number();
    let first = dataset.seeded_todays(day)?;
    let second = dataset.seeded_todays(day)?;
    ensure!(first.tank_of_day == second.tank_of_day, "Pick must be stable");
    ensure!(first.tank_of_day.tier >= 8, "Pick must be eligible");
    ensure!(
        first.vehicle_list.iter().all(|v| v.tier >= 8),
        "Low tiers must be filtered"
    );
    if ctx.verbose {
        println!("  day {day}: tank {}", first.tank_of_day.label());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_scenarios_pass_across_seeds() {
        for seed in [0, 1, 77, 200, 3649] {
            let ctx = ScenarioCtx::new(seed, false);
            smoke(&ctx).unwrap();
            fresh_store(&ctx).unwrap();
            won_today_restore(&ctx).unwrap();
            win_survives_reload(&ctx).unwrap();
            new_day_reset(&ctx).unwrap();
            legacy_migration(&ctx).unwrap();
            seeded_picker(&ctx).unwrap();
        }
    }

    #[test]
    fn report_scenarios_pass() {
        let ctx = ScenarioCtx::new(5, false);
        tokio_test::block_on(ranked_report(&ctx)).unwrap();
        tokio_test::block_on(failed_report(&ctx)).unwrap();
    }

    #[tokio::test]
    async fn detached_report_runs_on_the_runtime() {
        detached_report(&ScenarioCtx::new(9, false)).await.unwrap();
    }
}
