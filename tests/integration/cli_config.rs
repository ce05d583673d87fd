use predicates::prelude::*;
use test_support::{BIN, FIXTURE_VAR, Workspace, cmd_bin, tempdir};

#[test]
fn fetch_without_sources_fails_fast() {
  let ws = Workspace::new(&[]);
  ws.cmd()
    .env(FIXTURE_VAR, "{}")
    .arg("--fetch")
    .assert()
    .failure()
    .stderr(predicate::str::contains("no repositories configured"));
  assert!(!ws.data_path().exists());
}

#[test]
fn missing_config_file_fails_fetch_but_not_report() {
  let td = tempdir();
  let config = td.path().join("absent.yaml");
  let data = td.path().join("d.jsonl");

  cmd_bin(BIN)
    .env_remove(FIXTURE_VAR)
    .arg("--config")
    .arg(&config)
    .arg("--data")
    .arg(&data)
    .arg("--fetch-only")
    .assert()
    .failure()
    .stderr(predicate::str::contains("no repositories configured"));

  cmd_bin(BIN)
    .arg("--config")
    .arg(&config)
    .arg("--data")
    .arg(&data)
    .assert()
    .success()
    .stdout(predicate::str::contains("\"notice\""));
}

#[test]
fn malformed_repository_identifier_is_rejected() {
  let ws = Workspace::new(&["acme/api", "not-a-repo"]);
  ws.cmd()
    .env(FIXTURE_VAR, "{}")
    .arg("--fetch-only")
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid repository identifier \"not-a-repo\""));
}

#[test]
fn data_flag_overrides_config_path() {
  let ws = Workspace::new(&["acme/api"]);
  let alt = ws.dir.path().join("elsewhere/scores.jsonl");
  let out = ws
    .cmd()
    .env(FIXTURE_VAR, "{}")
    .arg("--data")
    .arg(&alt)
    .arg("--fetch-only")
    .output()
    .unwrap();
  assert!(out.status.success());
  assert!(alt.exists());
  assert!(!ws.data_path().exists());
  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v["total"], 0);
  assert_eq!(v["sources"][0]["status"], "empty");
}
