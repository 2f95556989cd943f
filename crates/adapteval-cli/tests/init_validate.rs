use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn init_demo_then_validate_passes() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("adapteval.yaml");

    Command::cargo_bin("adapteval")
        .unwrap()
        .args(["init", "--demo", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stderr(predicate::str::contains("created"));

    assert!(config.exists());
    assert!(dir
        .path()
        .join("responses/gpt-4o-mini/Plain-LLM/response_0.json")
        .exists());

    Command::cargo_bin("adapteval")
        .unwrap()
        .args(["validate", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stderr(predicate::str::contains("0 issue(s)"));
}

#[test]
fn validate_fails_on_a_missing_alternate_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("adapteval.yaml");

    Command::cargo_bin("adapteval")
        .unwrap()
        .args(["init", "--demo", "--config"])
        .arg(&config)
        .assert()
        .success();

    std::fs::remove_file(
        dir.path()
            .join("responses/gpt-4o-mini/Climsight/response_1.json"),
    )
    .unwrap();

    Command::cargo_bin("adapteval")
        .unwrap()
        .args(["validate", "--config"])
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("MISSING"));
}

#[test]
fn export_on_the_memory_backend_prints_the_header() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("adapteval.yaml");

    Command::cargo_bin("adapteval")
        .unwrap()
        .args(["init", "--config"])
        .arg(&config)
        .assert()
        .success();

    Command::cargo_bin("adapteval")
        .unwrap()
        .args(["export", "--format", "csv", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "user_id,question_id,agent,relevance",
        ));
}
