use predicates::prelude::*;
use test_support::{FIXTURE_VAR, Workspace, metrics_fixture, read_fixture_text};

fn fetched_workspace() -> Workspace {
  let ws = Workspace::new(&["acme/api", "acme/web"]);
  let api = read_fixture_text("acme-api.jsonl");
  let web = read_fixture_text("acme-web.jsonl");
  ws.cmd()
    .env(FIXTURE_VAR, metrics_fixture(&[("acme/api", Some(&api)), ("acme/web", Some(&web))]))
    .arg("--fetch-only")
    .assert()
    .success();
  ws
}

fn report(ws: &Workspace, extra: &[&str]) -> serde_json::Value {
  let out = ws.cmd().args(extra).output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  serde_json::from_slice(&out.stdout).unwrap()
}

fn rolling(v: &serde_json::Value, metric: &str) -> serde_json::Value {
  v["rolling"]
    .as_array()
    .unwrap()
    .iter()
    .find(|r| r["metric"] == metric)
    .cloned()
    .unwrap()
}

#[test]
fn empty_dataset_renders_with_notice() {
  let ws = Workspace::new(&["acme/api"]);
  let v = report(&ws, &[]);
  assert!(v["notice"].as_str().unwrap().contains("--fetch"));
  assert_eq!(v["summary"]["count"], 0);
  assert_eq!(v["summary"]["avg_score"], 0.0);
  assert_eq!(v["pull_requests"].as_array().unwrap().len(), 0);
  assert!(!ws.data_path().exists());
}

#[test]
fn rust_log_raises_app_logging_without_verbose() {
  let ws = Workspace::new(&["acme/api"]);
  ws.cmd()
    .env("RUST_LOG", "pr_size_dashboard=debug")
    .assert()
    .success()
    .stderr(predicate::str::contains("no dataset yet"));
}

#[test]
fn full_report_summarizes_and_compares_windows() {
  let ws = fetched_workspace();
  let v = report(&ws, &[]);

  assert_eq!(v["timezone"], "UTC");
  assert_eq!(v["summary"]["count"], 6);
  assert_eq!(v["summary"]["avg_score"], 10.5);

  let count = rolling(&v, "count");
  assert_eq!(count["window"], "7d");
  assert_eq!(count["value"], 3.0);
  assert_eq!(count["delta"], 1.0);
  let sum = rolling(&v, "score_sum");
  assert_eq!(sum["value"], 37.0);
  assert_eq!(sum["delta"], 12.0);

  let prs = v["pull_requests"].as_array().unwrap();
  assert_eq!(prs[0]["pr_number"], 4);
  assert_eq!(prs[prs.len() - 1]["pr_number"], 11);

  let repos: Vec<&str> = v["by_repo"].as_array().unwrap().iter().map(|r| r["repo"].as_str().unwrap()).collect();
  assert_eq!(repos, vec!["acme/api", "acme/web"]);
  assert_eq!(v["choices"]["authors"].as_array().unwrap().len(), 4);
}

#[test]
fn repo_filter_narrows_everything_but_choices() {
  let ws = fetched_workspace();
  let v = report(&ws, &["--repo", "acme/web"]);

  assert_eq!(v["filter"]["repo"], "acme/web");
  assert_eq!(v["summary"]["count"], 2);
  assert_eq!(v["by_repo"].as_array().unwrap().len(), 0);
  assert_eq!(v["choices"]["repos"].as_array().unwrap().len(), 2);
}

#[test]
fn out_flag_writes_report_file() {
  let ws = fetched_workspace();
  let target = ws.dir.path().join("reports/dashboard.json");

  ws.cmd()
    .args(["--out", target.to_str().unwrap()])
    .assert()
    .success()
    .stdout(predicate::str::is_empty());

  let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&target).unwrap()).unwrap();
  assert_eq!(v["summary"]["count"], 6);
}

#[test]
fn reporting_zone_shifts_daily_buckets() {
  let ws = fetched_workspace();
  let v = report(&ws, &["--tz", "Asia/Tokyo", "--repo", "acme/api", "--author", "山田太郎"]);

  let days = v["daily_by_repo"].as_array().unwrap();
  assert_eq!(days.len(), 1);
  // 2025-08-12T23:30Z is already the 13th in Tokyo
  assert_eq!(days[0]["date"], "2025-08-13");
  assert_eq!(v["weekly"][0]["week"], "2025-W33");
}

#[test]
fn unknown_time_zone_is_rejected() {
  let ws = Workspace::new(&["acme/api"]);
  ws.cmd()
    .args(["--tz", "Mars/Olympus"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown time zone"));
}
