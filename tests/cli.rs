use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn missing_archive_halts_with_explanatory_message() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("emosense")
        .unwrap()
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("archive"));
}
