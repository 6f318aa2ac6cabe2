use clap::Parser;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use whatblocks::{render_report, run, Args, DataError, ReportOptions};

fn write_logs(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path.to_string_lossy().into_owned()
}

fn args_for(file: &str, store_dir: &Path) -> Args {
    Args::try_parse_from([
        "whatblocks",
        "--file",
        file,
        "--store-dir",
        store_dir.to_str().unwrap(),
    ])
    .unwrap()
}

#[test]
fn file_run_creates_store_and_reports() {
    let dir = TempDir::new().unwrap();
    let file = write_logs(
        dir.path(),
        "home.json",
        r#"{"data": [
            {"domain": "a", "reasons": [{"id": "x"}]},
            {"domain": "b", "reasons": [{"id": "y"}]},
            {"domain": "cd", "reasons": [{"id": "x"}, {"id": "z"}]},
            {"domain": "a", "reasons": [{"id": "q"}]}
        ]}"#,
    );

    let analysis = run(&args_for(&file, dir.path())).unwrap();
    assert_eq!(analysis.entry_count, 4);
    assert_eq!(analysis.attribution.len(), 3);
    assert!(analysis.classification.combos.is_empty());
    assert!(analysis.drifts.is_empty());

    let stored: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("home.blists.json")).unwrap())
            .unwrap();
    assert_eq!(stored["version"], 1);
    assert_eq!(stored["domains"]["cd"], serde_json::json!(["x", "z"]));

    let text = render_report(&analysis, &ReportOptions::default());
    assert!(text.contains("# Domain coverage (3 total)"));
}

#[test]
fn second_run_reports_drift_and_carries_domains_forward() {
    let dir = TempDir::new().unwrap();
    let first = write_logs(
        dir.path(),
        "home.json",
        r#"[
            {"domain": "a", "reasons": [{"id": "x"}]},
            {"domain": "old", "reasons": [{"id": "y"}]}
        ]"#,
    );
    run(&args_for(&first, dir.path())).unwrap();

    let second = write_logs(
        dir.path(),
        "home.json",
        r#"[{"domain": "a", "reasons": [{"id": "x"}, {"id": "w"}]}]"#,
    );
    let analysis = run(&args_for(&second, dir.path())).unwrap();

    assert_eq!(analysis.drifts.len(), 1);
    assert_eq!(analysis.drifts[0].domain, "a");
    assert_eq!(analysis.carried_forward, 1);
    assert!(analysis.attribution.contains_key("old"));
    assert_eq!(analysis.attribution["a"].len(), 2);

    let again = run(&args_for(&second, dir.path())).unwrap();
    assert!(again.drifts.is_empty());
}

#[test]
fn no_store_leaves_nothing_behind() {
    let dir = TempDir::new().unwrap();
    let file = write_logs(
        dir.path(),
        "lab.json",
        r#"[{"domain": "a", "reasons": [{"id": "x"}]}]"#,
    );
    let mut args = args_for(&file, dir.path());
    args.no_store = true;

    run(&args).unwrap();
    assert!(!dir.path().join("lab.blists.json").exists());
}

#[test]
fn empty_reasons_fail_the_run() {
    let dir = TempDir::new().unwrap();
    let file = write_logs(
        dir.path(),
        "bad.json",
        r#"[{"domain": "a", "reasons": []}]"#,
    );

    let err = run(&args_for(&file, dir.path())).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DataError>(),
        Some(DataError::EmptyReasons { .. })
    ));
    assert!(!dir.path().join("bad.blists.json").exists());
}

#[test]
fn malformed_log_file_fails_the_run() {
    let dir = TempDir::new().unwrap();
    let file = write_logs(dir.path(), "broken.json", r#"{"data": [{"domain": 5}]}"#);
    assert!(run(&args_for(&file, dir.path())).is_err());
}

#[test]
fn keep_is_ignored_for_file_input() {
    let dir = TempDir::new().unwrap();
    let file = write_logs(
        dir.path(),
        "home.json",
        r#"[{"domain": "a", "reasons": [{"id": "x"}]}]"#,
    );
    let mut args = args_for(&file, dir.path());
    args.keep = true;

    let analysis = run(&args).unwrap();
    assert_eq!(analysis.attribution.len(), 1);

    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["home.blists.json", "home.json"]);
}
