use std::process::{Command, Output};

use tempfile::TempDir;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_grid-battle"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to launch grid-battle binary")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "grid-battle failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn short_run_prints_stats_and_heat_maps() {
    let output = run(&[
        "--duration-secs",
        "2",
        "--intensity",
        "light",
        "--seed",
        "7",
    ]);
    let text = stdout(&output);

    assert!(text.contains("player plays for blue"));
    assert!(text.contains("periodic: 20 actions"));
    assert!(text.lines().any(|line| line.starts_with("blue")));
    assert!(text.lines().any(|line| line.starts_with("red")));

    let map_rows = text
        .lines()
        .filter(|line| line.len() == 10 && line.chars().all(|c| ".-+#".contains(c)))
        .count();
    assert_eq!(map_rows, 20, "two ten-row heat maps");
}

#[test]
fn identical_seeds_print_identical_reports() {
    let args = ["--duration-secs", "1", "--burst", "500", "--seed", "11"];
    assert_eq!(stdout(&run(&args)), stdout(&run(&args)));
}

#[test]
fn team_choice_persists_between_runs() {
    let dir = TempDir::new().expect("temp dir");
    let preferences = dir.path().join("team.toml");
    let preferences = preferences.to_str().expect("utf-8 path");

    let first = run(&[
        "--duration-secs",
        "0",
        "--team",
        "red",
        "--preferences",
        preferences,
    ]);
    assert!(stdout(&first).contains("plays for red"));

    let second = run(&["--duration-secs", "0", "--preferences", preferences]);
    assert!(stdout(&second).contains("plays for red"));
}

#[test]
fn invalid_configuration_fails() {
    let dir = TempDir::new().expect("temp dir");
    let config = dir.path().join("run.toml");
    std::fs::write(&config, "step_millis = 0\n").expect("write config");

    let output = run(&["--config", config.to_str().expect("utf-8 path")]);
    assert!(!output.status.success());
}
