use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use wotdle_game::{PersistedDataStore, PersistedStore};

use crate::common::FileStorage;

/// What was found in a store directory.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub key: String,
    pub path: PathBuf,
    pub present: bool,
    pub stored_version: Option<u32>,
    pub migrated: bool,
    pub record: Option<PersistedDataStore>,
}

/// Load the record under `key`, migrating (and rewriting) it unless `dry_run`.
pub fn inspect_store(storage: FileStorage, key: &str, dry_run: bool) -> Result<InspectReport> {
    let path = storage.path_for(key);
    let present = path.exists();
    let mut store = PersistedStore::load(storage, key)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let stored_version = store.stored_version();
    let migrated = if dry_run {
        false
    } else {
        store
            .migrate()
            .with_context(|| format!("failed to write {}", path.display()))?
    };
    Ok(InspectReport {
        key: key.to_string(),
        path,
        present,
        stored_version,
        migrated,
        record: store.data().cloned(),
    })
}

pub fn write_inspect_report(out: &mut dyn Write, report: &InspectReport, json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(report)?)?;
        return Ok(());
    }
    writeln!(out, "Store: {}", report.path.display())?;
    if !report.present {
        writeln!(out, "No record stored under '{}'", report.key)?;
    }
    let version = report
        .stored_version
        .map_or_else(|| "unversioned".to_string(), |v| v.to_string());
    writeln!(out, "Stored version: {version}")?;
    writeln!(out, "Migrated: {}", if report.migrated { "yes" } else { "no" })?;
    match &report.record {
        Some(record) => {
            let classic = &record.classic;
            writeln!(out, "Games won: {}", classic.previous_games.len())?;
            writeln!(out, "Guesses today: {}", classic.daily_vehicle_guesses.len())?;
            writeln!(out, "Last guess (ms): {}", classic.last_guess_epoch_ms)?;
            if let Some(rank) = classic.nth_guess_normal {
                writeln!(out, "Last reported rank: {rank}")?;
            }
        }
        None => writeln!(out, "Record awaits migration (run without --dry-run)")?,
    }
    Ok(())
}
