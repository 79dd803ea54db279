use assert_cmd::cargo::CargoError;
use assert_cmd::Command;
use tempfile::tempdir;

fn simulator() -> Result<Command, CargoError> {
    Command::cargo_bin("tiered_resistance")
}

fn final_state(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).unwrap()
}

#[test]
fn prints_final_state() {
    let output = simulator()
        .unwrap()
        .args(["--timesteps", "5"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let state = final_state(&output.stdout);
    let infected: u64 = state["infected_by_tier"]
        .as_array()
        .unwrap()
        .iter()
        .map(|count| count.as_u64().unwrap())
        .sum();
    let deaths = state["deaths"].as_u64().unwrap();
    let immune = state["immune"].as_u64().unwrap();
    assert!(deaths + immune + infected <= 250);
}

#[test]
fn same_seed_same_output() {
    let run = || {
        simulator()
            .unwrap()
            .args(["--random-seed", "99", "--timesteps", "15"])
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn writes_reports_to_output_dir() {
    let temp_dir = tempdir().unwrap();
    let output_dir = temp_dir.path().to_str().unwrap();
    simulator()
        .unwrap()
        .args([
            "--config",
            "tests/data/runner_parameters.json",
            "--output-dir",
            output_dir,
            "--log-level",
            "info",
        ])
        .assert()
        .success();

    let mut reader = csv::Reader::from_path(temp_dir.path().join("timesteps.csv")).unwrap();
    assert_eq!(
        reader.headers().unwrap(),
        vec![
            "timestep",
            "uninfected",
            "immune",
            "dead",
            "isolated",
            "infected_none",
            "infected_Penicillin",
            "infected_Amoxycillin",
            "infected_Carbopenamase",
        ]
    );
    assert_eq!(reader.records().count(), 8);
    assert!(temp_dir.path().join("final_state.json").exists());

    // Reports are only replaced when asked.
    simulator()
        .unwrap()
        .args(["--output-dir", output_dir])
        .assert()
        .failure();
    simulator()
        .unwrap()
        .args(["--output-dir", output_dir, "--force-overwrite", "--no-product"])
        .assert()
        .success();
}

#[test]
fn rejects_bad_arguments() {
    simulator()
        .unwrap()
        .args(["--log-level", "loud"])
        .assert()
        .failure();
    simulator()
        .unwrap()
        .args(["--config", "tests/data/does_not_exist.json"])
        .assert()
        .failure();
}
