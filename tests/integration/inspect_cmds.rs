//! `qagen preview`, `qagen deps` and `qagen packs`.

use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

use crate::common::{SELENIUM_PACK, project_config, qagen, selenium_pack, write_project};

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!("stdout is not JSON ({e}): {}", String::from_utf8_lossy(&output.stdout))
    })
}

#[test]
fn test_preview_json() {
    let fixture = selenium_pack();
    let work = TempDir::new().unwrap();
    let project = write_project(work.path(), &project_config());

    let output = qagen(fixture.root(), work.path())
        .arg("preview")
        .arg(&project)
        .args(["--format", "json", "--content"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["pack"], SELENIUM_PACK);
    let files = report["files"].as_array().unwrap();
    assert_eq!(files.len(), 4);
    assert_eq!(files[0]["path"], "pom.xml");
    assert!(files[0]["checksum"].as_str().unwrap().starts_with("sha256:"));
    assert_eq!(files[3]["path"], "mvnw");
    assert_eq!(files[3]["mode"], 0o755);
    assert_eq!(files[3]["isTemplate"], false);
    assert_eq!(files[1]["content"], "# Shop Tests\n\nRun with {{ mvn test }}\n");

    // Previewing writes nothing
    assert_eq!(std::fs::read_dir(work.path()).unwrap().count(), 1);
}

#[test]
fn test_preview_text() {
    let fixture = selenium_pack();
    let work = TempDir::new().unwrap();
    let project = write_project(work.path(), &project_config());

    qagen(fixture.root(), work.path())
        .arg("preview")
        .arg(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("src/test/java/com/shoptests/base/BaseTest.java"))
        .stdout(predicate::str::contains("4 files"))
        .stdout(predicate::str::contains("LoginTest").not());
}

#[test]
fn test_deps_json() {
    let fixture = selenium_pack();
    let work = TempDir::new().unwrap();
    let project = write_project(work.path(), &project_config());

    let output = qagen(fixture.root(), work.path())
        .arg("deps")
        .arg(&project)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let deps = stdout_json(&output);
    assert_eq!(
        deps,
        serde_json::json!({
            "java": "17",
            "maven": "3.9.6",
            "selenium": "4.21.0",
            "testng": "7.10.2"
        })
    );
}

#[test]
fn test_packs_listing() {
    let fixture = selenium_pack();
    let work = TempDir::new().unwrap();

    qagen(fixture.root(), work.path())
        .arg("packs")
        .assert()
        .success()
        .stdout(predicate::str::contains(SELENIUM_PACK))
        .stdout(predicate::str::contains("web-typescript-playwright-playwright-npm"))
        .stdout(predicate::str::contains("shared").not());
}

#[test]
fn test_packs_check() {
    let fixture = selenium_pack();
    let work = TempDir::new().unwrap();
    let project = write_project(work.path(), &project_config());

    qagen(fixture.root(), work.path())
        .arg("packs")
        .arg("--check")
        .arg(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains(SELENIUM_PACK));

    let mut config = project_config();
    config.build_tool = "gradle".to_string();
    let project = write_project(work.path(), &config);

    let output = qagen(fixture.root(), work.path())
        .arg("packs")
        .arg("--check")
        .arg(&project)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let report = stdout_json(&output);
    assert_eq!(report["pack"], "web-java-selenium-testng-gradle");
    assert_eq!(report["exists"], false);
}
