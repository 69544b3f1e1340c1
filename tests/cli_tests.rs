use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_snapshot(dir: &TempDir, json: &str) -> std::path::PathBuf {
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, json).unwrap();
    path
}

#[test]
fn test_dry_run_prints_templates() {
    let temp_dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(
        &temp_dir,
        r#"[
            {"name": "upper", "arg_types": ["text"]},
            {"name": "lpad", "arg_types": ["text", "integer", "text"]}
        ]"#,
    );

    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("pgfuzz").unwrap();
    cmd.arg("--catalog-json")
        .arg(&snapshot)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"select "upper"($1::text)"#))
        .stdout(predicate::str::contains(
            r#"select "lpad"($1::text, '0'::integer, ''::text)"#,
        ))
        // lpad has a second eligible position.
        .stdout(predicate::str::contains(
            r#"select "lpad"(''::text, '0'::integer, $1::text)"#,
        ))
        .stderr(predicate::str::contains(
            "fuzz done: functions=2 targets=3 built=3 dispatched=0 skipped_pairs=0 failures=0",
        ));
}

#[test]
fn test_excluded_function_never_reaches_templates() {
    let temp_dir = TempDir::new().unwrap();
    // regexp_replace qualifies on signature but sits on the exclusion list.
    let snapshot = write_snapshot(
        &temp_dir,
        r#"[
            {"name": "regexp_replace", "arg_types": ["text", "text", "text"]},
            {"name": "lower", "arg_types": ["text"]}
        ]"#,
    );

    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("pgfuzz").unwrap();
    cmd.arg("--catalog-json")
        .arg(&snapshot)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("regexp_replace").not())
        .stdout(predicate::str::contains(r#"select "lower"($1::text)"#));
}

#[test]
fn test_cli_exclude_flag_extends_list() {
    let temp_dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(
        &temp_dir,
        r#"[
            {"name": "upper", "arg_types": ["text"]},
            {"name": "lower", "arg_types": ["text"]}
        ]"#,
    );

    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("pgfuzz").unwrap();
    cmd.arg("--catalog-json")
        .arg(&snapshot)
        .arg("--dry-run")
        .arg("--exclude")
        .arg("upper")
        .assert()
        .success()
        .stdout(predicate::str::contains("upper").not())
        .stdout(predicate::str::contains(r#"select "lower"($1::text)"#));
}

#[test]
fn test_unregistered_co_parameter_is_a_silent_skip() {
    let temp_dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(
        &temp_dir,
        r#"[
            {"name": "quote_nullable", "arg_types": ["text", "anyelement"]}
        ]"#,
    );

    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("pgfuzz").unwrap();
    cmd.arg("--catalog-json")
        .arg(&snapshot)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("quote_nullable").not())
        .stderr(predicate::str::contains("skipped_pairs=1"))
        // Skips are expected outcomes, never error output.
        .stderr(predicate::str::contains("error").not());
}

#[test]
fn test_emit_catalog_json_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(
        &temp_dir,
        r#"[
            {"name": "upper", "arg_types": ["text"]},
            {"name": "ts_debug", "arg_types": ["text"]},
            {"name": "int4pl", "arg_types": ["integer", "integer"]}
        ]"#,
    );
    let out_path = temp_dir.path().join("selected.json");

    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("pgfuzz").unwrap();
    cmd.arg("--catalog-json")
        .arg(&snapshot)
        .arg("--emit-catalog-json")
        .arg(&out_path)
        .arg("--dry-run")
        .assert()
        .success();

    let content = std::fs::read_to_string(&out_path).unwrap();
    let selected: serde_json::Value = serde_json::from_str(&content).unwrap();
    let names: Vec<&str> = selected
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();

    // ts_debug is excluded, int4pl has no eligible argument.
    assert_eq!(names, vec!["upper"]);
}

#[test]
fn test_max_functions_bounds_the_run() {
    let temp_dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(
        &temp_dir,
        r#"[
            {"name": "upper", "arg_types": ["text"]},
            {"name": "lower", "arg_types": ["text"]}
        ]"#,
    );

    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("pgfuzz").unwrap();
    cmd.arg("--catalog-json")
        .arg(&snapshot)
        .arg("--dry-run")
        .arg("--max-functions")
        .arg("1")
        .assert()
        .success()
        .stderr(predicate::str::contains("functions=1"));
}

#[test]
fn test_dry_run_rejects_failures_jsonl() {
    let temp_dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&temp_dir, "[]");

    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("pgfuzz").unwrap();
    cmd.arg("--catalog-json")
        .arg(&snapshot)
        .arg("--dry-run")
        .arg("--failures-jsonl")
        .arg(temp_dir.path().join("f.jsonl"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--failures-jsonl"));
}

#[test]
fn test_malformed_snapshot_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&temp_dir, "not json");

    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("pgfuzz").unwrap();
    cmd.arg("--catalog-json")
        .arg(&snapshot)
        .arg("--dry-run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("parse catalog snapshot"));
}
