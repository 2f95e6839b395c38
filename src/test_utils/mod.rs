//! Test utilities for QAGen
//!
//! Helpers shared by unit tests and the integration test target (enabled there
//! through the `test-utils` feature):
//! - [`init_test_logging`] - one-time tracing setup writing through the test harness
//! - [`sample_config`] - the canonical Selenium/TestNG/Maven project configuration
//! - [`PackFixture`] - on-disk template packs in a temporary directory
//!
//! # Example
//!
//! ```rust,no_run
//! use qagen_cli::test_utils::{PackFixture, sample_config};
//!
//! let fixture = PackFixture::new("web-java-selenium-testng-maven")
//!     .file("README.md.hbs", "# {{ projectName }}")
//!     .write()
//!     .unwrap();
//! assert!(fixture.pack_dir().join("manifest.json").exists());
//! assert_eq!(sample_config().pack_key().as_str(), "web-java-selenium-testng-maven");
//! ```

pub mod fixtures;

pub use fixtures::{PackFixture, PackFixtureBuilder};

use std::collections::BTreeMap;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::project::ProjectConfig;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, tests run silently.
///
/// ```bash
/// RUST_LOG=qagen_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// Selenium + TestNG + Maven web project without sample tests.
///
/// Pack key `web-java-selenium-testng-maven`; no CI/CD or reporting tool, no
/// utilities switched on.
#[must_use]
pub fn sample_config() -> ProjectConfig {
    ProjectConfig {
        project_name: "saucedemo-tests".to_string(),
        testing_type: "web".to_string(),
        framework: "selenium".to_string(),
        language: "java".to_string(),
        testing_pattern: Some("page-object-model".to_string()),
        test_runner: "testng".to_string(),
        build_tool: "maven".to_string(),
        group_id: None,
        artifact_id: None,
        cicd_tool: None,
        reporting_tool: None,
        utilities: BTreeMap::new(),
        include_sample_tests: false,
    }
}
