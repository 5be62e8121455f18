//! End-to-end smoke tests: run the `gridline` binary against a records file.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn workdir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("gridline_e2e_{name}"));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("Failed to create temp dir");
    fs::write(
        dir.join("leads.jsonl"),
        "{\"id\": \"1\", \"firstName\": \"Ann\", \"status\": \"NEW\", \"budget\": 1200}\n\
         {\"id\": \"2\", \"firstName\": \"Bo\", \"status\": \"HOT\", \"budget\": 300}\n\
         {\"id\": \"3\", \"firstName\": \"Cy\", \"status\": \"HOT\", \"budget\": 900}\n",
    )
    .expect("Failed to write records");
    dir
}

fn gridline(dir: &PathBuf, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gridline"))
        .args(["--config", dir.join("absent.toml").to_str().unwrap()])
        .args(["--records", dir.join("leads.jsonl").to_str().unwrap()])
        .arg("--log-stderr")
        .args(args)
        .env("GRIDLINE_STATE_FILE", dir.join("state.json"))
        .env_remove("GRIDLINE_CONFIG")
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute binary")
}

#[test]
fn binary_prints_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_gridline"))
        .arg("--version")
        .output()
        .expect("Failed to execute binary");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains(env!("CARGO_PKG_VERSION")),
        "Expected version in output, got: {stdout}"
    );
}

#[test]
fn view_filters_and_sorts() {
    let dir = workdir("view");
    let output = gridline(
        &dir,
        &[
            "view",
            "--filter",
            "status=HOT",
            "--sort",
            "budget:desc",
            "--columns",
            "firstName,budget",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "First name  Budget");
    assert!(lines[2].starts_with("Cy"));
    assert!(lines[3].starts_with("Bo"));
    assert!(lines[4].contains("of 2"));
    assert!(!dir.join("state.json").exists());
}

#[test]
fn saved_view_is_restored() {
    let dir = workdir("save");
    let saved = gridline(&dir, &["view", "--filter", "status=NEW", "--save"]);
    assert!(saved.status.success(), "{}", String::from_utf8_lossy(&saved.stderr));
    assert!(dir.join("state.json").exists());

    let output = gridline(&dir, &["view", "--columns", "firstName"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Ann"));
    assert!(!stdout.contains("Bo"));
}

#[test]
fn edit_writes_updated_records() {
    let dir = workdir("edit");
    let out_path = dir.join("edited.json");
    let output = gridline(
        &dir,
        &[
            "edit",
            "--ids",
            "1,2",
            "--set",
            "status=WARM",
            "--clear",
            "budget",
            "--output",
            out_path.to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Updated 2 fields on 2 records"));

    let edited: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(edited[0]["status"], "WARM");
    assert!(edited[1]["budget"].is_null());
    assert_eq!(edited[2]["status"], "HOT");
}

#[test]
fn assign_rejects_multiple_records() {
    let dir = workdir("assign");
    let output = gridline(&dir, &["assign", "--id", "1,2", "status=HOT"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("exactly one selected record"));
}
