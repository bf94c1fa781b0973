//! Failure scenarios: bad configs, bad templates, bad paths.

use assert_cmd::Command;
use predicates::prelude::*;

use super::common::{FixtureRepo, LISTING_TEMPLATE};

fn tg_pipegen() -> Command {
    Command::cargo_bin("tg-pipegen").unwrap()
}

#[test]
fn malformed_module_fails_the_run() {
    let repo = FixtureRepo::new();
    repo.module("ok", r#"terraform { source = "git::https://e.com/m.git//x" }"#)
        .module("bad", "terraform {\n  source =\n");
    let template = repo.template(LISTING_TEMPLATE);
    let output = repo.root().join("pipeline.yml");

    tg_pipegen()
        .args(["generate", "--root"])
        .arg(repo.root())
        .arg("--input")
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));

    // No partial artifact on failure.
    assert!(!output.exists());
}

#[test]
fn missing_template_fails_before_any_resolution() {
    let repo = FixtureRepo::new();
    repo.module("app", r#"terraform { source = "git::https://e.com/m.git//a" }"#);
    let output = repo.root().join("pipeline.yml");

    tg_pipegen()
        .args(["generate", "--root"])
        .arg(repo.root())
        .arg("--input")
        .arg(repo.root().join("does-not-exist.tera"))
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read template"));

    assert!(!output.exists());
}

#[test]
fn malformed_template_fails_without_writing_output() {
    let repo = FixtureRepo::new();
    repo.module("app", r#"terraform { source = "git::https://e.com/m.git//a" }"#);
    let template = repo.template("{% for project in %}");
    let output = repo.root().join("pipeline.yml");

    tg_pipegen()
        .args(["generate", "--root"])
        .arg(repo.root())
        .arg("--input")
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));

    assert!(!output.exists());
}

#[test]
fn nonexistent_root_is_reported() {
    let repo = FixtureRepo::new();
    let template = repo.template(LISTING_TEMPLATE);

    tg_pipegen()
        .args(["generate", "--root"])
        .arg(repo.root().join("missing"))
        .arg("--input")
        .arg(&template)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot resolve root directory"));
}
