use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn kilnbook(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("kilnbook").unwrap();
    cmd.arg("--data-dir").arg(dir.path().join("data"));
    cmd.env_remove("KILNBOOK_DIR").env_remove("RUST_LOG");
    cmd
}

fn init(dir: &TempDir) {
    kilnbook(dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Kilnbook initialized"));
}

fn create(dir: &TempDir, kind: &str, json: &str) -> String {
    let out = kilnbook(dir)
        .args(["create", kind, "--json", json])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8(out).unwrap().trim().to_string()
}

#[test]
fn test_commands_require_init() {
    let dir = TempDir::new().unwrap();
    kilnbook(&dir)
        .args(["list", "goal"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("kilnbook init"));
}

#[test]
fn test_init_twice_keeps_config() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    assert!(dir.path().join("data").join("kilnbook.json").is_file());
    kilnbook(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already initialized"));
}

#[test]
fn test_create_list_show_and_search() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let id = create(
        &dir,
        "goal",
        r#"{"title": "Throw 100 mugs", "purpose": "consistent walls"}"#,
    );
    assert_eq!(id.len(), 32);

    kilnbook(&dir)
        .args(["list", "goal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Throw 100 mugs"));

    kilnbook(&dir)
        .args(["show", "goal", &id[..6]])
        .assert()
        .success()
        .stdout(predicate::str::contains("consistent walls"));

    kilnbook(&dir)
        .args(["--format", "json", "search", "MUGS"])
        .assert()
        .success()
        .stdout(predicate::str::contains(id.as_str()));

    kilnbook(&dir)
        .args(["search", "porcelain"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No results"));
}

#[test]
fn test_invalid_create_reports_every_violation() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    kilnbook(&dir)
        .args([
            "create",
            "portfolio_piece",
            "--json",
            r#"{"title": "", "success_rating": 9}"#,
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("title").and(predicate::str::contains("rating")));
}

#[test]
fn test_link_delete_cascade() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let piece = create(&dir, "piece", r#"{"title": "Moon jar"}"#);
    let journal = create(
        &dir,
        "journal",
        r#"{"date": "2025-03-04", "body": "Moon jar cracked in the bisque"}"#,
    );

    kilnbook(&dir)
        .args([
            "link",
            &format!("journal_entry:{journal}"),
            &format!("portfolio_piece:{}", &piece[..8]),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Linked"));

    kilnbook(&dir)
        .args(["links", &format!("portfolio_piece:{piece}")])
        .assert()
        .success()
        .stdout(predicate::str::contains("<-").and(predicate::str::contains("cracked")));

    kilnbook(&dir)
        .args(["delete", "portfolio_piece", &piece])
        .assert()
        .success();

    kilnbook(&dir)
        .args(["links", &format!("journal_entry:{journal}")])
        .assert()
        .success()
        .stdout(predicate::str::contains("No links"));

    kilnbook(&dir)
        .args(["--format", "json", "search", "moon"])
        .assert()
        .success()
        .stdout(predicate::str::contains("portfolio_piece").not());
}

#[test]
fn test_update_and_conflict() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let id = create(&dir, "goal", r#"{"title": "Learn raku", "purpose": "fire"}"#);

    kilnbook(&dir)
        .args(["update", "goal", &id, "--json", r#"{"status": "completed"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("completed"));

    kilnbook(&dir)
        .args([
            "update",
            "goal",
            &id,
            "--json",
            r#"{"status": "active"}"#,
            "--if-unmodified",
            "2000-01-01T00:00:00Z",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("modified"));
}

#[test]
fn test_agenda_expands_recurrence() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    create(
        &dir,
        "event",
        r#"{
            "title": "Open studio",
            "category": "public",
            "task": "open_studio",
            "start": "2025-03-03T10:00:00Z",
            "end": "2025-03-03T14:00:00Z",
            "recurrence": {"frequency": "weekly", "count": 3}
        }"#,
    );

    kilnbook(&dir)
        .args(["agenda", "--from", "2025-03-01", "--to", "2025-03-31"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("2025-03-03")
                .and(predicate::str::contains("2025-03-10"))
                .and(predicate::str::contains("2025-03-17"))
                .and(predicate::str::contains("2025-03-24").not()),
        );

    kilnbook(&dir)
        .args([
            "agenda",
            "--from",
            "2025-03-01",
            "--to",
            "2025-03-31",
            "--category",
            "studio",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("No events"));
}

#[test]
fn test_time_summary_json() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    for start in ["09:00:00", "10:00:00"] {
        create(
            &dir,
            "time",
            &format!(
                r#"{{"date": "2025-03-04", "start_time": "{start}", "minutes": 120, "activity": "throwing"}}"#
            ),
        );
    }

    kilnbook(&dir)
        .args(["--format", "json", "time", "--day", "2025-03-04"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains(r#""total_minutes": 240"#)
                .and(predicate::str::contains(r#""throwing": 240"#)),
        );
}

#[test]
fn test_export_then_import_into_fresh_dir() {
    let source = TempDir::new().unwrap();
    init(&source);
    create(&source, "goal", r#"{"title": "Wood firing", "purpose": "ash"}"#);
    create(
        &source,
        "journal",
        r#"{"date": "2025-03-04", "body": "Stacked wood"}"#,
    );
    let export = source.path().join("export.json");
    kilnbook(&source)
        .args(["export", "--output"])
        .arg(&export)
        .assert()
        .success();

    let target = TempDir::new().unwrap();
    init(&target);
    kilnbook(&target)
        .arg("import")
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 entities"));
    kilnbook(&target)
        .arg("import")
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 0 entities (2 already present"));

    kilnbook(&target)
        .args(["--format", "json", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""total": 2"#));
}
