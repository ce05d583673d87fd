use predicates::prelude::*;
use test_support::{FIXTURE_VAR, Workspace, metrics_fixture, read_fixture_text};

fn fixture() -> String {
  let api = read_fixture_text("acme-api.jsonl");
  let web = read_fixture_text("acme-web.jsonl");
  metrics_fixture(&[("acme/api", Some(&api)), ("acme/web", Some(&web)), ("acme/none", None)])
}

#[test]
fn fetch_only_prints_cycle_report_and_writes_dataset() {
  let ws = Workspace::new(&["acme/api", "acme/web", "acme/none"]);

  let out = ws.cmd().env(FIXTURE_VAR, fixture()).arg("--fetch-only").output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v["total"], 6);
  let sources = v["sources"].as_array().unwrap();
  assert_eq!(sources.len(), 3);
  assert_eq!(sources[0]["source"], "acme/api");
  assert_eq!(sources[0]["status"], "ok");
  assert_eq!(sources[0]["record_count"], 4);
  assert_eq!(sources[0]["malformed_lines"], 1);
  assert_eq!(sources[1]["record_count"], 3);
  assert_eq!(sources[2]["status"], "empty");
  assert_eq!(sources[2]["record_count"], 0);

  let data = std::fs::read_to_string(ws.data_path()).unwrap();
  let lines: Vec<&str> = data.lines().collect();
  assert_eq!(lines.len(), 6);
  // undated record first; non-ASCII kept literal; unknown keys preserved
  assert!(lines[0].contains("\"pr_number\":11"));
  assert!(data.contains("山田太郎"));
  assert!(data.contains("\"title\":\"ログ出力を整理\""));
}

#[test]
fn refetching_same_sources_is_idempotent() {
  let ws = Workspace::new(&["acme/api", "acme/web"]);

  ws.cmd().env(FIXTURE_VAR, fixture()).arg("--fetch-only").assert().success();
  let first = std::fs::read_to_string(ws.data_path()).unwrap();
  ws.cmd().env(FIXTURE_VAR, fixture()).arg("--fetch-only").assert().success();
  let second = std::fs::read_to_string(ws.data_path()).unwrap();

  assert_eq!(first, second);
}

#[test]
fn later_source_replaces_shared_pull_request() {
  let ws = Workspace::new(&["acme/api", "acme/web"]);
  ws.cmd().env(FIXTURE_VAR, fixture()).arg("--fetch-only").assert().success();

  let data = std::fs::read_to_string(ws.data_path()).unwrap();
  let pr3: Vec<serde_json::Value> = data
    .lines()
    .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap())
    .filter(|v| v["repo"] == "acme/api" && v["pr_number"] == 3)
    .collect();
  assert_eq!(pr3.len(), 1);
  assert_eq!(pr3[0]["size_score"], 4.0);
}

#[test]
fn failing_source_is_reported_without_aborting_others() {
  let ws = Workspace::new(&["acme/api", "acme/web"]);
  let api = read_fixture_text("acme-api.jsonl");
  let payload = serde_json::json!({"acme/api": api, "acme/web": {"error": "HTTP 502"}}).to_string();

  let out = ws.cmd().env(FIXTURE_VAR, payload).arg("--fetch-only").output().unwrap();
  assert!(out.status.success());
  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v["total"], 4);
  assert_eq!(v["sources"][1]["status"], "error");
  assert_eq!(v["sources"][1]["error_detail"], "HTTP 502");
  assert!(String::from_utf8_lossy(&out.stderr).contains("acme/web: fetch failed (HTTP 502)"));
}

#[test]
fn fetch_then_report_emits_cycle_on_stderr_and_dashboard_on_stdout() {
  let ws = Workspace::new(&["acme/api", "acme/web"]);

  let out = ws.cmd().env(FIXTURE_VAR, fixture()).arg("--fetch").output().unwrap();
  assert!(out.status.success());

  let dash: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(dash["summary"]["count"], 6);
  assert!(dash.get("notice").is_none());

  let stderr = String::from_utf8_lossy(&out.stderr);
  assert!(predicate::str::contains("\"total\": 6").eval(&stderr));
}
