//! `qagen generate` end to end.

use predicates::prelude::*;
use qagen_cli::test_utils::PackFixture;
use std::io::Read;
use tempfile::TempDir;

use crate::common::{SELENIUM_PACK, project_config, qagen, selenium_pack, write_project};

#[test]
fn test_generate_zip_archive() {
    let fixture = selenium_pack();
    let work = TempDir::new().unwrap();
    let mut config = project_config();
    config.cicd_tool = Some("github-actions".to_string());
    let project = write_project(work.path(), &config);

    qagen(fixture.root(), work.path())
        .arg("generate")
        .arg(&project)
        .args(["--output", "out/shop.zip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(5 files)"));

    let archive_path = work.path().join("out/shop.zip");
    let mut archive = zip::ZipArchive::new(std::fs::File::open(&archive_path).unwrap()).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            ".github/workflows/ci.yml",
            "README.md",
            "mvnw",
            "pom.xml",
            "src/test/java/com/shoptests/base/BaseTest.java",
        ]
    );

    let mut workflow = String::new();
    archive.by_name(".github/workflows/ci.yml").unwrap().read_to_string(&mut workflow).unwrap();
    assert!(workflow.contains("${{ secrets.TOKEN }}"));
    assert!(workflow.contains("name: Shop Tests CI"));

    let mode = archive.by_name("mvnw").unwrap().unix_mode().unwrap();
    assert_eq!(mode & 0o777, 0o755);
}

#[test]
fn test_generate_default_output_name() {
    let fixture = selenium_pack();
    let work = TempDir::new().unwrap();
    let project = write_project(work.path(), &project_config());

    qagen(fixture.root(), work.path()).arg("generate").arg(&project).assert().success();
    assert!(work.path().join("shop_tests.zip").is_file());
}

#[test]
fn test_generate_directory_and_force() {
    let fixture = selenium_pack();
    let work = TempDir::new().unwrap();
    let project = write_project(work.path(), &project_config());

    qagen(fixture.root(), work.path())
        .arg("generate")
        .arg(&project)
        .args(["--output", "shop-tests"])
        .assert()
        .success();

    let root = work.path().join("shop-tests");
    assert_eq!(
        std::fs::read_to_string(root.join("src/test/java/com/shoptests/base/BaseTest.java")).unwrap(),
        "package com.shoptests.base;\n\npublic class BaseTest {}\n"
    );
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(root.join("mvnw")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    qagen(fixture.root(), work.path())
        .arg("generate")
        .arg(&project)
        .args(["--output", "shop-tests"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("already exists"));

    qagen(fixture.root(), work.path())
        .arg("generate")
        .arg(&project)
        .args(["--output", "shop-tests", "--force"])
        .assert()
        .success();
}

#[test]
fn test_generate_yaml_project() {
    let fixture = selenium_pack();
    let work = TempDir::new().unwrap();
    let project = work.path().join("project.yaml");
    std::fs::write(
        &project,
        "projectName: yaml-shop\ntestingType: web\nlanguage: java\nframework: selenium\n\
         testRunner: testng\nbuildTool: maven\nincludeSampleTests: false\n",
    )
    .unwrap();

    qagen(fixture.root(), work.path())
        .arg("generate")
        .arg(&project)
        .args(["-o", "yaml-shop"])
        .assert()
        .success();
    let pom = std::fs::read_to_string(work.path().join("yaml-shop/pom.xml")).unwrap();
    assert!(pom.contains("<artifactId>yaml-shop</artifactId>"));
}

#[test]
fn test_missing_template_strict_and_lenient() {
    let fixture = PackFixture::new(SELENIUM_PACK)
        .file("README.md.hbs", "# {{ projectName }}")
        .declared_only("docs/setup.md.hbs")
        .write()
        .unwrap();
    let work = TempDir::new().unwrap();
    let project = write_project(work.path(), &project_config());

    qagen(fixture.root(), work.path())
        .arg("generate")
        .arg(&project)
        .args(["-o", "strict.zip"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("docs/setup.md.hbs"))
        .stderr(predicate::str::contains("--lenient"));
    assert!(!work.path().join("strict.zip").exists());

    qagen(fixture.root(), work.path())
        .arg("generate")
        .arg(&project)
        .args(["-o", "lenient.zip", "--lenient"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(1 files)"));
}

#[test]
fn test_render_error_names_template() {
    let fixture = PackFixture::new(SELENIUM_PACK)
        .file("README.md.hbs", "# {{ projectNam }}")
        .write()
        .unwrap();
    let work = TempDir::new().unwrap();
    let project = write_project(work.path(), &project_config());

    qagen(fixture.root(), work.path())
        .arg("generate")
        .arg(&project)
        .assert()
        .failure()
        .stderr(predicate::str::contains("README.md.hbs"))
        .stderr(predicate::str::contains("projectName"));
}

#[test]
fn test_unknown_pack() {
    let fixture = selenium_pack();
    let work = TempDir::new().unwrap();
    let mut config = project_config();
    config.framework = "cypress".to_string();
    let project = write_project(work.path(), &config);

    qagen(fixture.root(), work.path())
        .arg("generate")
        .arg(&project)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No template pack found for 'web-java-cypress-testng-maven'"))
        .stderr(predicate::str::contains("qagen packs"));
}

#[test]
fn test_missing_packs_dir() {
    let work = TempDir::new().unwrap();
    let project = write_project(work.path(), &project_config());

    qagen(&work.path().join("no-packs"), work.path())
        .arg("generate")
        .arg(&project)
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_global_config_empty_pack_policy() {
    let fixture = PackFixture::new(SELENIUM_PACK)
        .file("src/test/java/tests/LoginTest.java.hbs", "class LoginTest {}")
        .write()
        .unwrap();
    let work = TempDir::new().unwrap();
    let project = write_project(work.path(), &project_config());

    qagen(fixture.root(), work.path())
        .arg("generate")
        .arg(&project)
        .args(["-o", "empty-ok"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(0 files)"));

    std::fs::write(work.path().join("qagen-config.toml"), "empty_pack_policy = \"error\"\n").unwrap();
    qagen(fixture.root(), work.path())
        .arg("generate")
        .arg(&project)
        .args(["-o", "empty.zip"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("produced no files"));
}
