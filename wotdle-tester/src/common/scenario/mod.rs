use anyhow::Result;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use wotdle_game::{
    FixedClock, GameConfig, MemoryStorage, ReferenceZone, TodaysWotdle, Vehicle, WotdleGame,
};

pub mod catalog;

/// Inputs shared by every logic scenario run.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioCtx {
    pub seed: u64,
    pub verbose: bool,
}

impl ScenarioCtx {
    pub const fn new(seed: u64, verbose: bool) -> Self {
        Self { seed, verbose }
    }

    /// Mid-morning in New York on a day chosen by the seed.
    pub fn start(&self) -> DateTime<Utc> {
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 15, 0, 0).single();
        let offset = i64::try_from(self.seed % 3650).unwrap_or_default();
        base.unwrap_or_default() + TimeDelta::days(offset)
    }

    pub fn clock(&self) -> FixedClock {
        FixedClock::new(self.start())
    }

    /// Reference wall-clock ms of [`Self::start`].
    pub fn start_ms(&self) -> i64 {
        ReferenceZone::default().wall_clock_ms(self.start())
    }
}

pub type ScenarioGame = WotdleGame<MemoryStorage, FixedClock>;

pub fn open_game(storage: &MemoryStorage, clock: &FixedClock) -> Result<ScenarioGame> {
    Ok(WotdleGame::open_with_clock(
        storage.clone(),
        clock.clone(),
        GameConfig::default(),
    )?)
}

/// Vehicles `[1, 2]` with 2 as the answer.
pub fn two_vehicle_day() -> TodaysWotdle {
    TodaysWotdle {
        vehicle_list: vec![
            Vehicle::new(1, 8).with_name("T-44"),
            Vehicle::new(2, 10).with_name("IS-7"),
        ],
        tank_of_day: Vehicle::new(2, 10).with_name("IS-7"),
    }
}

pub fn ids(list: &[Vehicle]) -> Vec<i64> {
    list.iter().map(|v| v.tank_id).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioKind {
    Smoke,
    FreshStore,
    WonTodayRestore,
    WinSurvivesReload,
    NewDayReset,
    LegacyMigration,
    RankedReport,
    FailedReport,
    DetachedReport,
    SeededPicker,
}

#[derive(Debug, Clone, Copy)]
pub struct LogicScenario {
    pub key: &'static str,
    pub name: &'static str,
    pub kind: ScenarioKind,
}

impl LogicScenario {
    const fn new(key: &'static str, name: &'static str, kind: ScenarioKind) -> Self {
        Self { key, name, kind }
    }

    pub async fn run(&self, ctx: &ScenarioCtx) -> Result<()> {
        match self.kind {
            ScenarioKind::Smoke => catalog::smoke(ctx),
            ScenarioKind::FreshStore => catalog::fresh_store(ctx),
            ScenarioKind::WonTodayRestore => catalog::won_today_restore(ctx),
            ScenarioKind::WinSurvivesReload => catalog::win_survives_reload(ctx),
            ScenarioKind::NewDayReset => catalog::new_day_reset(ctx),
            ScenarioKind::LegacyMigration => catalog::legacy_migration(ctx),
            ScenarioKind::RankedReport => catalog::ranked_report(ctx).await,
            ScenarioKind::FailedReport => catalog::failed_report(ctx).await,
            ScenarioKind::DetachedReport => catalog::detached_report(ctx).await,
            ScenarioKind::SeededPicker => catalog::seeded_picker(ctx),
        }
    }
}

const SCENARIOS: &[LogicScenario] = &[
    LogicScenario::new("smoke", "Smoke Test", ScenarioKind::Smoke),
    LogicScenario::new("fresh-store", "Fresh Store Guessing", ScenarioKind::FreshStore),
    LogicScenario::new(
        "won-today",
        "Restore Win Recorded Today",
        ScenarioKind::WonTodayRestore,
    ),
    LogicScenario::new(
        "win-reload",
        "Win Survives Same-Day Reload",
        ScenarioKind::WinSurvivesReload,
    ),
    LogicScenario::new("new-day", "New Day Reset", ScenarioKind::NewDayReset),
    LogicScenario::new(
        "legacy-migration",
        "Legacy Store Migration",
        ScenarioKind::LegacyMigration,
    ),
    LogicScenario::new("ranked-report", "Win Report With Rank", ScenarioKind::RankedReport),
    LogicScenario::new("failed-report", "Failed Win Report", ScenarioKind::FailedReport),
    LogicScenario::new(
        "detached-report",
        "Detached Win Report",
        ScenarioKind::DetachedReport,
    ),
    LogicScenario::new("seeded-picker", "Seeded Tank Of Day", ScenarioKind::SeededPicker),
];

pub fn get_scenario(name: &str) -> Option<LogicScenario> {
    let name = name.to_lowercase();
    match name.as_str() {
        "reload" => get_scenario("win-reload"),
        "migration" | "legacy" => get_scenario("legacy-migration"),
        "report" => get_scenario("ranked-report"),
        _ => SCENARIOS.iter().copied().find(|s| s.key == name),
    }
}

pub fn all_scenario_keys() -> Vec<&'static str> {
    SCENARIOS.iter().map(|s| s.key).collect()
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    SCENARIOS.iter().map(|s| (s.key, s.name)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_catalog_entries() {
        assert_eq!(get_scenario("legacy").unwrap().kind, ScenarioKind::LegacyMigration);
        assert_eq!(get_scenario("SMOKE").unwrap().kind, ScenarioKind::Smoke);
        assert!(get_scenario("unknown").is_none());
    }

    #[test]
    fn listing_covers_every_scenario() {
        assert_eq!(list_scenarios().len(), all_scenario_keys().len());
        for key in all_scenario_keys() {
            assert!(get_scenario(key).is_some(), "{key} not resolvable");
        }
    }

    #[test]
    fn start_is_morning_in_new_york() {
        let ctx = ScenarioCtx::new(200, false);
        let zone = ReferenceZone::default();
        let start = ctx.start();
        assert_eq!(zone.date_key(start), zone.date_key(start + TimeDelta::hours(8)));
        assert_ne!(zone.date_key(start), zone.date_key(start + TimeDelta::hours(14)));
    }
}
