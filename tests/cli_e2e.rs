use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn tripdiary(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tripdiary").unwrap();
    cmd.arg("--data-dir").arg(data_dir.path());
    cmd
}

#[test]
fn test_new_then_list_shows_trip() {
    let dir = TempDir::new().unwrap();

    tripdiary(&dir)
        .args(["new", "Chiang Mai loop", "--province", "Chiang Mai"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added trip: Chiang Mai loop"));

    tripdiary(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Chiang Mai loop"));
}

#[test]
fn test_clear_requires_confirmation() {
    let dir = TempDir::new().unwrap();
    tripdiary(&dir).args(["new", "Doomed"]).assert().success();

    tripdiary(&dir)
        .arg("clear")
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"));
    tripdiary(&dir)
        .arg("list")
        .assert()
        .stdout(predicate::str::contains("Doomed"));

    tripdiary(&dir).args(["clear", "--yes"]).assert().success();
    tripdiary(&dir)
        .arg("list")
        .assert()
        .stdout(predicate::str::contains("No trips yet"));
}

#[test]
fn test_import_rejects_malformed_file() {
    let dir = TempDir::new().unwrap();
    let bad = dir.path().join("bad.json");
    fs::write(&bad, r#"{"foo": 1}"#).unwrap();

    tripdiary(&dir)
        .arg("import")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing trips or vehicles"));
}

#[test]
fn test_export_writes_timestamped_file() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    tripdiary(&dir).args(["new", "Exported trip"]).assert().success();

    tripdiary(&dir)
        .arg("export")
        .arg("--dir")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 trips"));

    let entries: Vec<_> = fs::read_dir(out.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
    let name = entries[0].as_ref().unwrap().file_name();
    let name = name.to_string_lossy();
    assert!(name.starts_with("trip-diary-") && name.ends_with(".json"));
}
