//! Shared helpers for the integration suites.

use assert_cmd::Command;
use chrono::{TimeZone, Utc};
use qagen_cli::cache::TtlCache;
use qagen_cli::generator::{GenerateOptions, Generator};
use qagen_cli::pack::{DirectoryPackStore, PackResolver};
use qagen_cli::project::ProjectConfig;
use qagen_cli::test_utils::{PackFixture, init_test_logging};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub const SELENIUM_PACK: &str = "web-java-selenium-testng-maven";

/// A Selenium/TestNG/Maven pack with CI/CD files for every supported tool.
pub fn selenium_pack() -> PackFixture {
    init_test_logging(None);
    PackFixture::new(SELENIUM_PACK)
        .file(
            "pom.xml.hbs",
            "<groupId>{{ groupId }}</groupId>\n<artifactId>{{ artifactId }}</artifactId>\n\
             <selenium.version>{{ toolVersions.selenium }}</selenium.version>\n",
        )
        .file("README.md.hbs", "# {{ projectName }}\n\n{{raw}}Run with {{ mvn test }}{{/raw}}\n")
        .file(
            "src/test/java/{{ packagePath }}/base/BaseTest.java.hbs",
            "package {{ packageName }}.base;\n\npublic class BaseTest {}\n",
        )
        .file(
            "src/test/java/{{ packagePath }}/tests/LoginTest.java.hbs",
            "package {{ packageName }}.tests;\n",
        )
        .conditional_file(
            "src/test/resources/log4j2.xml.hbs",
            "<Configuration name=\"{{ artifactId }}\"/>",
            "utilities.logger",
            json!(true),
        )
        .conditional_file(
            ".github/workflows/ci.yml.hbs",
            "name: {{ projectName }} CI\non: [push]\njobs:\n  test:\n    env:\n      TOKEN: ${{ secrets.TOKEN }}\n    runs-on: ${{ matrix.os }}\n",
            "cicdTool",
            json!("github-actions"),
        )
        .conditional_file(
            "Jenkinsfile.hbs",
            "pipeline {\n  environment { NAME = '{{ artifactId }}' }\n  stages { stage('Test') { steps { sh \"mvn -Dbuild=${env.BUILD_ID} test\" } } }\n}\n",
            "cicdTool",
            json!("jenkins"),
        )
        .conditional_file(
            ".circleci/config.yml.hbs",
            "version: 2.1\njobs:\n  test:\n    docker:\n      - image: << parameters.image >>\n    steps:\n      - run: echo {{ projectName }}\n",
            "cicdTool",
            json!("circleci"),
        )
        .verbatim_file("mvnw", "#!/bin/sh\nexec mvn \"$@\"\n", Some(0o755))
        .tool_version("selenium", "4.21.0")
        .shared_versions(&[("java", "17"), ("testng", "7.10.2"), ("maven", "3.9.6"), ("selenium", "4.0.0")])
        .pack("web-typescript-playwright-playwright-npm")
        .file("package.json.hbs", "{ \"name\": \"{{ artifactId }}\" }")
        .write()
        .unwrap()
}

/// The canonical Selenium configuration under a custom project name.
pub fn project_config() -> ProjectConfig {
    let mut config = qagen_cli::test_utils::sample_config();
    config.project_name = "Shop Tests".to_string();
    config
}

/// Engine over a fixture with a fixed timestamp.
pub fn generator(fixture: &PackFixture, options: GenerateOptions) -> Generator<DirectoryPackStore> {
    let cache: Arc<TtlCache> = Arc::new(TtlCache::new());
    let resolver =
        PackResolver::new(DirectoryPackStore::new(fixture.root()), cache, Duration::from_secs(60));
    Generator::new(
        resolver,
        GenerateOptions {
            timestamp: Some(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()),
            ..options
        },
    )
}

/// Write a project configuration as pretty JSON.
pub fn write_project(dir: &Path, config: &ProjectConfig) -> PathBuf {
    let path = dir.join("project.json");
    std::fs::write(&path, serde_json::to_string_pretty(config).unwrap()).unwrap();
    path
}

/// `qagen` bound to a pack root, with an isolated (absent) global config.
pub fn qagen(packs_root: &Path, work_dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_qagen"));
    cmd.current_dir(work_dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("QAGEN_PACKS_DIR")
        .arg("--config")
        .arg(work_dir.join("qagen-config.toml"))
        .arg("--packs-dir")
        .arg(packs_root)
        .arg("--no-progress");
    cmd
}
