//! Happy-path generation scenarios.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

use super::common::{FixtureRepo, LISTING_TEMPLATE};

fn tg_pipegen() -> Command {
    Command::cargo_bin("tg-pipegen").unwrap()
}

#[test]
fn renders_projects_with_sibling_and_shared_dependencies() {
    let repo = FixtureRepo::new();
    repo.file("modules/vpc/main.tf", "resource {}\n")
        .module(
            "app",
            r#"
terraform {
  source = "../modules/vpc"
}
dependency "net" {
  config_path = "../net"
}
"#,
        )
        .module("net", r#"terraform { source = "../modules/vpc" }"#);
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
        .success()
        .stdout(predicate::str::contains("2 projects"));

    let rendered = fs::read_to_string(&output).unwrap();
    assert!(rendered.contains("app: app/**/* net/terragrunt.hcl modules/vpc/*.tf*"));
    assert!(rendered.contains("net: net/**/* modules/vpc/*.tf*"));
    assert!(rendered.contains("needs=true workload="));
}

#[test]
fn include_parents_do_not_become_projects() {
    let repo = FixtureRepo::new();
    repo.module("", r#"locals { region = "eu" }"#).module(
        "svc",
        r#"
include "root" {
  path = find_in_parent_folders()
}
terraform { source = "git::https://example.com/m.git//svc" }
"#,
    );
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
        .success()
        .stdout(predicate::str::contains("1 project"));

    let rendered = fs::read_to_string(&output).unwrap();
    assert!(rendered.contains("svc: svc/**/* terragrunt.hcl"));
    assert!(!rendered.contains("\n.: "));
}

#[test]
fn environment_filter_restricts_discovery_and_sets_workload() {
    let repo = FixtureRepo::new();
    repo.module("live/production/app", r#"terraform { source = "git::https://e.com/m.git//a" }"#)
        .module("live/staging/app", r#"terraform { source = "git::https://e.com/m.git//a" }"#);
    let template = repo.template(LISTING_TEMPLATE);
    let output = repo.root().join("pipeline.yml");

    tg_pipegen()
        .args(["generate", "--environment", "production", "--root"])
        .arg(repo.root())
        .arg("--input")
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 project"));

    let rendered = fs::read_to_string(&output).unwrap();
    assert!(rendered.contains("live/production/app:"));
    assert!(!rendered.contains("live/staging/app:"));
    assert!(rendered.contains("workload=prod"));
}

#[test]
fn unknown_environment_is_preserved_on_request() {
    let repo = FixtureRepo::new();
    repo.module("sandbox/app", r#"terraform { source = "git::https://e.com/m.git//a" }"#);
    let template = repo.template(LISTING_TEMPLATE);
    let output = repo.root().join("pipeline.yml");

    tg_pipegen()
        .args(["generate", "--environment", "sandbox", "--preserve-environment", "--root"])
        .arg(repo.root())
        .arg("--input")
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let rendered = fs::read_to_string(&output).unwrap();
    assert!(rendered.contains("workload=sandbox"));
}

#[test]
fn skip_local_removes_the_module_from_output() {
    let repo = FixtureRepo::new();
    repo.module(
        "app",
        r#"
terraform { source = "git::https://e.com/m.git//a" }
locals { gitlab_cicd_skip = true }
"#,
    )
    .module("net", r#"terraform { source = "git::https://e.com/m.git//n" }"#);
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
        .success()
        .stdout(predicate::str::contains("1 project"));

    let rendered = fs::read_to_string(&output).unwrap();
    assert!(!rendered.contains("app:"));
    assert!(rendered.contains("net:"));
}

#[test]
fn parallel_flag_flows_into_the_template() {
    let repo = FixtureRepo::new();
    repo.module("app", r#"terraform { source = "git::https://e.com/m.git//a" }"#);
    let template = repo.template(LISTING_TEMPLATE);
    let output = repo.root().join("pipeline.yml");

    tg_pipegen()
        .args(["generate", "--parallel=false", "--root"])
        .arg(repo.root())
        .arg("--input")
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let rendered = fs::read_to_string(&output).unwrap();
    assert!(rendered.contains("needs=false"));
}

#[test]
fn cascade_can_be_disabled_from_the_command_line() {
    let repo = FixtureRepo::new();
    repo.module(
        "a",
        r#"
terraform { source = "git::https://e.com/m.git//a" }
dependency "b" { config_path = "../b" }
"#,
    )
    .module(
        "b",
        r#"
terraform { source = "git::https://e.com/m.git//b" }
dependency "c" { config_path = "../c" }
"#,
    )
    .module("c", r#"terraform { source = "git::https://e.com/m.git//c" }"#);
    let template = repo.template(LISTING_TEMPLATE);
    let output = repo.root().join("pipeline.yml");

    tg_pipegen()
        .args(["generate", "--cascade-dependencies=false", "--root"])
        .arg(repo.root())
        .arg("--input")
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let rendered = fs::read_to_string(&output).unwrap();
    assert!(rendered.contains("a: a/**/* b/terragrunt.hcl\n"));
}
