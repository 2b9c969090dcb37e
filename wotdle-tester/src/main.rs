mod common;
mod inspect;
mod logic;
mod play;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use common::scenario::{all_scenario_keys, get_scenario, list_scenarios};
use common::{FileStorage, OfflineReporter, StaticReporter, parse_ids, parse_instant, split_csv};
use logic::{LogicTester, ScenarioResult};
use wotdle_game::{DailyDataset, FixedClock, GameConfig, WotdleGame};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TestMode {
    /// Scripted logic scenarios against in-memory storage
    Logic,
    /// Show (and migrate) the record in a store directory
    Inspect,
    /// Play one day against a store directory and a dataset
    Play,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "wotdle-tester", version)]
#[command(about = "Automated QA driver for the Wotdle game core")]
struct Args {
    /// Test mode: logic scenarios, store inspection, or a scripted day
    #[arg(long, value_enum, default_value_t = TestMode::Logic)]
    mode: TestMode,

    /// Scenarios to run (comma-separated, or `all`)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated); each picks the scenario start day
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Game config JSON (storage key, reference zone, minimum tier)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the persisted store (inspect and play modes)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Dataset JSON with vehicles and daily answers (play mode)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Pick the answer from the dataset's vehicles instead of the daily table
    #[arg(long)]
    seeded: bool,

    /// Vehicle ids to guess in order (play mode)
    #[arg(long, default_value = "")]
    guesses: String,

    /// Rank the simulated win-report endpoint answers with; unreachable when absent
    #[arg(long)]
    rank: Option<i64>,

    /// Play or inspect at this instant (RFC 3339 or YYYY-MM-DD) instead of now
    #[arg(long)]
    at: Option<String>,

    /// Inspect without migrating or rewriting the record
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    let config = load_config(args.config.as_deref())?;
    match args.mode {
        TestMode::Logic => {
            announce_banner();
            let start_time = Instant::now();
            let scenarios = expand_scenarios(&args.scenarios);
            let seeds = parse_seeds(&args.seeds)?;
            let results = run_logic_scenarios(&args, &scenarios, &seeds).await;
            write_reports(&args, &results, start_time)?;
            if results.iter().any(|r| !r.passed) {
                std::process::exit(1);
            }
        }
        TestMode::Inspect => run_inspect(&args, &config)?,
        TestMode::Play => run_play(&args, config).await?,
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:25} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🎯 Wotdle Automated Tester".bright_cyan().bold());
    println!("{}", "==========================".cyan());
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    GameConfig::from_json(&raw).with_context(|| format!("invalid config {}", path.display()))
}

fn load_dataset(path: &Path, config: &GameConfig) -> Result<DailyDataset> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    let dataset = DailyDataset::from_json(&raw)
        .with_context(|| format!("invalid dataset {}", path.display()))?;
    Ok(dataset.with_min_tier(config.min_tier))
}

fn parse_seeds(s: &str) -> Result<Vec<u64>> {
    split_csv(s)
        .iter()
        .map(|token| {
            token
                .parse::<u64>()
                .with_context(|| format!("invalid seed '{token}'"))
        })
        .collect()
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        for key in all_scenario_keys() {
            if !scenarios.iter().any(|s| s == key) {
                scenarios.push(key.to_string());
            }
        }
    }
    scenarios
}

fn clock_for(args: &Args) -> Result<FixedClock> {
    let now = match args.at.as_deref() {
        Some(at) => parse_instant(at)?,
        None => chrono::Utc::now(),
    };
    Ok(FixedClock::new(now))
}

fn require_store(args: &Args) -> Result<FileStorage> {
    let Some(dir) = args.store.as_ref() else {
        bail!("--store <dir> is required in {:?} mode", args.mode);
    };
    Ok(FileStorage::new(dir))
}

async fn run_logic_scenarios(
    args: &Args,
    scenarios: &[String],
    seeds: &[u64],
) -> Vec<ScenarioResult> {
    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let logic_tester = LogicTester::new(args.verbose);
    let mut results = Vec::new();

    for scenario_name in scenarios {
        if let Some(scenario) = get_scenario(scenario_name) {
            let scenario_results = logic_tester
                .run_scenario(&scenario, seeds, args.iterations)
                .await;
            results.extend(scenario_results);
        } else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
        }
    }

    results
}

fn run_inspect(args: &Args, config: &GameConfig) -> Result<()> {
    let storage = require_store(args)?;
    log::debug!("Inspecting {}", storage.root().display());
    let report = inspect::inspect_store(storage, &config.storage_key, args.dry_run)?;
    let mut output_target = OutputTarget::new(args.output.clone())?;
    inspect::write_inspect_report(
        &mut output_target,
        &report,
        args.report == ReportFormat::Json,
    )?;
    output_target.flush_inner()?;
    Ok(())
}

async fn run_play(args: &Args, config: GameConfig) -> Result<()> {
    let storage = require_store(args)?;
    let Some(data) = args.data.as_deref() else {
        bail!("--data <dataset.json> is required in play mode");
    };
    let dataset = load_dataset(data, &config)?;
    let guesses = parse_ids(&args.guesses)?;
    let reporter_path = config.win_report_path.clone();
    let mut game = WotdleGame::open_with_clock(storage, clock_for(args)?, config)?;
    let todays = play::todays_from(&game, &dataset, args.seeded)?;

    let report = match args.rank {
        Some(rank) => {
            play::play_day(&mut game, &todays, &guesses, &StaticReporter::ranked(rank)).await?
        }
        None => {
            let reporter = OfflineReporter::new(reporter_path);
            play::play_day(&mut game, &todays, &guesses, &reporter).await?
        }
    };

    let mut output_target = OutputTarget::new(args.output.clone())?;
    play::write_play_report(
        &mut output_target,
        &report,
        args.report == ReportFormat::Json,
    )?;
    output_target.flush_inner()?;
    Ok(())
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report {
        ReportFormat::Json => {
            if results.is_empty() {
                writeln!(&mut output_target, "[]")?;
            } else {
                logic::reports::generate_json_report(&mut output_target, results)?;
            }
        }
        ReportFormat::Markdown => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Wotdle Logic Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        ReportFormat::Console => {
            if results.is_empty() {
                writeln!(&mut output_target, "No logic scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn base_args() -> Args {
        Args {
            mode: TestMode::Logic,
            scenarios: "smoke".to_string(),
            list_scenarios: false,
            seeds: "1337".to_string(),
            iterations: 1,
            report: ReportFormat::Json,
            verbose: false,
            output: None,
            config: None,
            store: None,
            data: None,
            seeded: false,
            guesses: String::new(),
            rank: None,
            at: None,
            dry_run: false,
        }
    }

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "wotdle-main-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    fn sample_result(passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: "Smoke Test".to_string(),
            passed,
            iterations_run: 3,
            successful_iterations: if passed { 3 } else { 2 },
            failures: if passed {
                Vec::new()
            } else {
                vec!["failure".to_string()]
            },
            average_duration: Duration::from_millis(10),
            performance_data: vec![Duration::from_millis(10)],
        }
    }

    #[test]
    fn expands_all_scenarios_keyword() {
        let expanded = expand_scenarios("smoke,all");
        assert_eq!(expanded[0], "smoke");
        assert_eq!(expanded.iter().filter(|s| *s == "smoke").count(), 1);
        assert!(expanded.contains(&"legacy-migration".to_string()));
    }

    #[test]
    fn expand_scenarios_without_all_preserves_order() {
        let expanded = expand_scenarios("new-day,smoke");
        assert_eq!(expanded, vec!["new-day".to_string(), "smoke".to_string()]);
    }

    #[test]
    fn parse_seeds_reports_bad_tokens() {
        assert_eq!(parse_seeds("1, 2").unwrap(), vec![1, 2]);
        assert!(parse_seeds("1,x").is_err());
    }

    #[test]
    fn load_config_defaults_and_reads_file() {
        assert_eq!(load_config(None).unwrap(), GameConfig::default());

        let path = temp_path("config.json");
        std::fs::write(&path, r#"{"storage_key": "alt-store", "min_tier": 6}"#).unwrap();
        let config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config.storage_key, "alt-store");
        assert_eq!(config.min_tier, 6);
        assert_eq!(config.reference_time_zone, "America/New_York");
    }

    #[test]
    fn require_store_demands_directory() {
        let args = Args {
            mode: TestMode::Inspect,
            ..base_args()
        };
        assert!(require_store(&args).is_err());
    }

    #[test]
    fn maybe_list_scenarios_writes_output() {
        let temp = temp_path("scenarios.txt");
        let args = Args {
            list_scenarios: true,
            output: Some(temp.clone()),
            ..base_args()
        };
        assert!(maybe_list_scenarios(&args).unwrap());
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Available scenarios"));
        assert!(content.contains("won-today"));
    }

    #[test]
    fn maybe_list_scenarios_returns_false_when_disabled() {
        assert!(!maybe_list_scenarios(&base_args()).unwrap());
    }

    #[test]
    fn write_reports_emits_json_output() {
        let temp = temp_path("report.json");
        let args = Args {
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(&temp).unwrap();
        assert!(content.contains("[]"));

        write_reports(&args, &[sample_result(true)], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("scenario_name"));
    }

    #[test]
    fn write_reports_markdown_empty_results() {
        let temp = temp_path("report.md");
        let args = Args {
            report: ReportFormat::Markdown,
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("No scenarios executed"));
    }

    #[test]
    fn write_reports_console_includes_failures() {
        let temp = temp_path("report.txt");
        let args = Args {
            report: ReportFormat::Console,
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(false)], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("failure"));
        assert!(content.contains("Total time"));
    }

    #[tokio::test]
    async fn run_logic_scenarios_collects_results() {
        let args = base_args();
        let results = run_logic_scenarios(&args, &["smoke".to_string(), "nope".to_string()], &[4])
            .await;
        assert_eq!(results.len(), 1);
        assert!(results[0].passed);
    }

    #[tokio::test]
    async fn run_play_writes_store_and_report() {
        let dir = temp_path("store");
        let data = temp_path("dataset.json");
        std::fs::write(
            &data,
            r#"{"vehicles": [{"tank_id": 1, "tier": 8}, {"tank_id": 2, "tier": 9}],
                "daily": [{"dd_mm_yy": "18_10_26", "normal": {"tank_id": 1}}]}"#,
        )
        .unwrap();
        let output = temp_path("play.json");
        let args = Args {
            mode: TestMode::Play,
            store: Some(dir.clone()),
            data: Some(data),
            guesses: "2,1".to_string(),
            rank: Some(11),
            at: Some("2026-10-18".to_string()),
            output: Some(output.clone()),
            ..base_args()
        };
        run_play(&args, GameConfig::default()).await.unwrap();

        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(report["victory"], true);
        assert_eq!(report["rank"], 11);
        assert!(dir.join("wotdle-store.json").exists());
    }
}
