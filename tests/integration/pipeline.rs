//! Library-level pipeline tests over an on-disk pack.

use futures::StreamExt;
use qagen_cli::cache::TtlCache;
use qagen_cli::core::QagenError;
use qagen_cli::generator::{GenerateOptions, GeneratedFile, Generator};
use qagen_cli::pack::{DirectoryPackStore, PackResolver};
use qagen_cli::test_utils::PackFixture;
use std::sync::Arc;
use std::time::Duration;

use crate::common::{SELENIUM_PACK, generator, project_config, selenium_pack};

fn find<'a>(files: &'a [GeneratedFile], path: &str) -> &'a GeneratedFile {
    files
        .iter()
        .find(|f| f.path == path)
        .unwrap_or_else(|| panic!("{path} not generated; got {:?}", paths(files)))
}

fn paths(files: &[GeneratedFile]) -> Vec<&str> {
    files.iter().map(|f| f.path.as_str()).collect()
}

#[tokio::test]
async fn test_default_selection_in_manifest_order() {
    let fixture = selenium_pack();
    let files =
        generator(&fixture, GenerateOptions::default()).generate_all(&project_config()).await.unwrap();

    assert_eq!(
        paths(&files),
        vec![
            "pom.xml",
            "README.md",
            "src/test/java/com/shoptests/base/BaseTest.java",
            "mvnw",
        ]
    );

    let pom = find(&files, "pom.xml");
    assert!(pom.content.contains("<groupId>com.shoptests</groupId>"));
    assert!(pom.content.contains("<artifactId>shop-tests</artifactId>"));
    // Pack pins override the shared catalog
    assert!(pom.content.contains("<selenium.version>4.21.0</selenium.version>"));

    assert_eq!(find(&files, "README.md").content, "# Shop Tests\n\nRun with {{ mvn test }}\n");
    assert_eq!(find(&files, "mvnw").mode, Some(0o755));
}

#[tokio::test]
async fn test_github_actions_syntax_survives() {
    let fixture = selenium_pack();
    let mut config = project_config();
    config.cicd_tool = Some("github-actions".to_string());

    let files = generator(&fixture, GenerateOptions::default()).generate_all(&config).await.unwrap();
    let workflow = find(&files, ".github/workflows/ci.yml");
    assert!(workflow.content.starts_with("name: Shop Tests CI\n"));
    assert!(workflow.content.contains("TOKEN: ${{ secrets.TOKEN }}"));
    assert!(workflow.content.contains("runs-on: ${{ matrix.os }}"));
    assert!(!files.iter().any(|f| f.path == "Jenkinsfile"));
}

#[tokio::test]
async fn test_jenkins_and_circleci_syntax_survives() {
    let fixture = selenium_pack();
    let engine = generator(&fixture, GenerateOptions::default());

    let mut jenkins = project_config();
    jenkins.cicd_tool = Some("jenkins".to_string());
    let files = engine.generate_all(&jenkins).await.unwrap();
    let jenkinsfile = find(&files, "Jenkinsfile");
    assert!(jenkinsfile.content.contains("NAME = 'shop-tests'"));
    assert!(jenkinsfile.content.contains("-Dbuild=${env.BUILD_ID}"));

    let mut circle = project_config();
    circle.cicd_tool = Some("circleci".to_string());
    let files = engine.generate_all(&circle).await.unwrap();
    let config_yml = find(&files, ".circleci/config.yml");
    assert!(config_yml.content.contains("- image: << parameters.image >>"));
    assert!(config_yml.content.contains("- run: echo Shop Tests"));
}

#[tokio::test]
async fn test_samples_and_utilities_switch_files_on() {
    let fixture = selenium_pack();
    let mut config = project_config();
    config.include_sample_tests = true;
    config.utilities.insert("logger".to_string(), true);

    let files = generator(&fixture, GenerateOptions::default()).generate_all(&config).await.unwrap();
    assert_eq!(
        find(&files, "src/test/java/com/shoptests/tests/LoginTest.java").content,
        "package com.shoptests.tests;\n"
    );
    assert_eq!(
        find(&files, "src/test/resources/log4j2.xml").content,
        "<Configuration name=\"shop-tests\"/>"
    );
}

#[tokio::test]
async fn test_dropping_stream_after_first_file() {
    let fixture = selenium_pack();
    let engine = generator(&fixture, GenerateOptions::default());
    let config = project_config();

    let first: Vec<GeneratedFile> =
        engine.generate_stream(&config).take(1).map(|r| r.unwrap()).collect().await;
    assert_eq!(paths(&first), vec!["pom.xml"]);

    // A cancelled run leaves the engine usable
    assert_eq!(engine.generate_all(&config).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_files_after_the_consumer_stops_are_never_rendered() {
    let fixture = PackFixture::new(SELENIUM_PACK)
        .file("ok.txt.hbs", "{{ projectName }}")
        .file("broken.txt.hbs", "{{ projectNam }}")
        .write()
        .unwrap();
    let engine = generator(&fixture, GenerateOptions::default());
    let config = project_config();

    let first: Vec<_> = engine.generate_stream(&config).take(1).collect().await;
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].as_ref().unwrap().path, "ok.txt");

    // Pulling past the first file reaches the broken template
    let err = engine.generate_all(&config).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<QagenError>(),
        Some(QagenError::RenderError { path, .. }) if path == "broken.txt.hbs"
    ));
}

#[tokio::test]
async fn test_engine_shared_across_tasks() {
    let fixture = selenium_pack();
    let cache: Arc<TtlCache> = Arc::new(TtlCache::new());
    let resolver = PackResolver::new(
        DirectoryPackStore::new(fixture.root()),
        cache.clone(),
        Duration::from_secs(60),
    );
    let engine = Arc::new(Generator::new(resolver, GenerateOptions::default()));

    let mut handles = Vec::new();
    for name in ["Shop Tests", "Cart Tests", "Shop Tests"] {
        let engine = Arc::clone(&engine);
        let mut config = project_config();
        config.project_name = name.to_string();
        handles.push(tokio::spawn(async move {
            let files = engine.generate_all(&config).await.unwrap();
            files.into_iter().map(|f| f.path).collect::<Vec<_>>()
        }));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }
    assert_eq!(results[0], results[2]);
    assert!(results[1].contains(&"src/test/java/com/carttests/base/BaseTest.java".to_string()));

    let stats = cache.stats();
    assert_eq!(stats.hits + stats.misses, 3);
    assert_eq!(stats.entries, 1);

    engine.generate_all(&project_config()).await.unwrap();
    assert_eq!(cache.stats().hits, stats.hits + 1);
}

#[tokio::test]
async fn test_unknown_combination() {
    let fixture = selenium_pack();
    let mut config = project_config();
    config.test_runner = "junit5".to_string();

    let engine = generator(&fixture, GenerateOptions::default());
    assert!(!engine.resolver().exists(&config).await);

    let err = engine.generate_all(&config).await.unwrap_err();
    match err.downcast_ref::<QagenError>() {
        Some(QagenError::PackNotFound { pack }) => {
            assert_eq!(pack, "web-java-selenium-junit5-maven");
        }
        other => panic!("expected PackNotFound, got {other:?}"),
    }
    assert!(engine.resolver().exists(&project_config()).await);
}

#[tokio::test]
async fn test_pack_listing() {
    let fixture = selenium_pack();
    let engine = generator(&fixture, GenerateOptions::default());
    let packs = engine.resolver().list_packs().await.unwrap();
    let keys: Vec<&str> = packs.iter().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec![SELENIUM_PACK, "web-typescript-playwright-playwright-npm"]);
}
