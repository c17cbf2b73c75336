use assert_cmd::Command;
use predicates::prelude::*;

fn fretpad(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("fretpad").unwrap();
    cmd.env("FRETPAD_HOME", home);
    cmd
}

#[test]
fn first_run_seeds_a_default_profile() {
    let temp_dir = tempfile::tempdir().unwrap();

    fretpad(temp_dir.path())
        .arg("users")
        .arg("list")
        .assert()
        .success()
        .stdout(predicates::str::contains("Default User"));
}

#[test]
fn create_switch_and_delete() {
    let temp_dir = tempfile::tempdir().unwrap();

    fretpad(temp_dir.path())
        .args(["users", "create", "Alice", "--email", "alice@example.com"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Created profile 'Alice'"));

    fretpad(temp_dir.path())
        .args(["users", "switch", "Alice"])
        .assert()
        .success();

    // The current profile carries the marker.
    fretpad(temp_dir.path())
        .args(["users", "list"])
        .assert()
        .success()
        .stdout(predicates::str::contains("* Alice"));

    fretpad(temp_dir.path())
        .args(["users", "delete", "Default User"])
        .assert()
        .success();

    fretpad(temp_dir.path())
        .args(["users", "list"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Default User").not());
}

#[test]
fn deleting_the_last_profile_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    // Seed the store.
    fretpad(temp_dir.path()).arg("users").assert().success();

    fretpad(temp_dir.path())
        .args(["users", "delete", "Default User"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("last"));
}

#[test]
fn show_displays_profile_details() {
    let temp_dir = tempfile::tempdir().unwrap();

    fretpad(temp_dir.path())
        .args(["users", "create", "Alice", "--email", "alice@example.com"])
        .assert()
        .success();

    fretpad(temp_dir.path())
        .args(["users", "show", "Alice"])
        .assert()
        .success()
        .stdout(predicates::str::contains("alice@example.com"))
        .stdout(predicates::str::contains("trainings"));
}

#[test]
fn rename_by_id_prefix() {
    let temp_dir = tempfile::tempdir().unwrap();

    fretpad(temp_dir.path())
        .args(["users", "create", "Bob"])
        .assert()
        .success();

    let output = fretpad(temp_dir.path())
        .args(["users", "list"])
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let bob_line = stdout.lines().find(|l| l.contains("Bob")).unwrap();
    // Line format: marker, name, short id, age.
    let short_id = bob_line
        .split_whitespace()
        .find(|tok| tok.len() == 8 && tok.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap();

    fretpad(temp_dir.path())
        .args(["users", "rename", short_id, "Robert"])
        .assert()
        .success();

    fretpad(temp_dir.path())
        .args(["users", "list"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Robert"));
}

#[test]
fn export_import_round_trip() {
    let temp_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();

    fretpad(temp_dir.path())
        .args(["users", "create", "Alice"])
        .assert()
        .success();

    fretpad(temp_dir.path())
        .arg("export")
        .arg("Alice")
        .arg("--out")
        .arg(out_dir.path())
        .assert()
        .success()
        .stdout(predicates::str::contains("Exported to"));

    let exported = std::fs::read_dir(out_dir.path())
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();
    assert!(exported
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("guitarapp_user_alice_"));

    // Importing into a fresh store lands the profile under a dated name.
    let other_home = tempfile::tempdir().unwrap();
    fretpad(other_home.path())
        .arg("import")
        .arg(&exported)
        .assert()
        .success()
        .stdout(predicates::str::contains("Imported profile 'Alice'"));
}

#[test]
fn backup_then_restore() {
    let temp_dir = tempfile::tempdir().unwrap();

    fretpad(temp_dir.path())
        .args(["users", "create", "Alice"])
        .assert()
        .success();

    fretpad(temp_dir.path())
        .arg("backup")
        .assert()
        .success()
        .stdout(predicates::str::contains("Backup written"));

    fretpad(temp_dir.path())
        .args(["users", "create", "Bob"])
        .assert()
        .success();

    fretpad(temp_dir.path())
        .arg("restore")
        .assert()
        .success();

    fretpad(temp_dir.path())
        .args(["users", "list"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Alice"))
        .stdout(predicates::str::contains("Bob").not());
}

#[test]
fn restore_without_backup_reports_an_error() {
    let temp_dir = tempfile::tempdir().unwrap();

    fretpad(temp_dir.path())
        .arg("restore")
        .assert()
        .failure()
        .stderr(predicates::str::contains("no backup"));
}
