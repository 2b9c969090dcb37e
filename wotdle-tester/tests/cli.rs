use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "wotdle-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_wotdle-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("legacy-migration"));
}

#[test]
fn cli_runs_all_scenarios_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_wotdle-tester");
    let output_path = temp_path("run");
    let output = Command::new(exe)
        .args([
            "--report",
            "json",
            "--scenarios",
            "all",
            "--iterations",
            "2",
            "--seeds",
            "1,180",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output_path).expect("read output"))
            .expect("json report");
    let results = report.as_array().expect("array");
    assert!(results.len() >= 20);
    assert!(results.iter().all(|r| r["passed"] == true));
}

#[test]
fn cli_play_then_inspect_share_the_store() {
    let exe = env!("CARGO_BIN_EXE_wotdle-tester");
    let store = temp_path("store");
    let data = temp_path("dataset.json");
    std::fs::write(
        &data,
        r#"{
            "vehicles": [{"tank_id": 10, "tier": 8, "name": "T-44"}, {"tank_id": 20, "tier": 10, "name": "IS-7"}],
            "daily": [{"dd_mm_yy": "18_10_26", "normal": {"tank_id": 20}}]
        }"#,
    )
    .expect("write dataset");

    let play = Command::new(exe)
        .args(["--mode", "play", "--guesses", "10,20", "--at", "2026-10-18", "--store"])
        .arg(&store)
        .arg("--data")
        .arg(&data)
        .output()
        .expect("run play");
    assert!(play.status.success(), "{}", String::from_utf8_lossy(&play.stderr));
    let stdout = String::from_utf8_lossy(&play.stdout);
    assert!(stdout.contains("Victory: yes"));

    let inspect = Command::new(exe)
        .args(["--mode", "inspect", "--report", "json", "--store"])
        .arg(&store)
        .output()
        .expect("run inspect");
    assert!(inspect.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&inspect.stdout).expect("inspect json");
    assert_eq!(report["stored_version"], 2);
    assert_eq!(report["record"]["classic"]["previousGames"][0]["guessCount"], 2);
}

#[test]
fn cli_play_without_store_fails() {
    let exe = env!("CARGO_BIN_EXE_wotdle-tester");
    let output = Command::new(exe)
        .args(["--mode", "play"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--store"));
}
