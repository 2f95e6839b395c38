//! File selection: which pack files ship for a configuration.
//!
//! Two independent filters decide whether a [`FileDescriptor`] makes it into the
//! output:
//!
//! - [`classifier`] - Recognises example tests so they can be dropped when the user
//!   asks for a bare skeleton (`includeSampleTests: false`)
//! - [`should_include`] - Applies that filter, then the descriptor's dotted-key
//!   conditionals against the configuration's query view

pub mod classifier;

pub use classifier::is_sample_test;

use serde_json::Value;

use crate::pack::FileDescriptor;
use crate::project::{ProjectConfig, lookup};

/// Decide whether a descriptor is generated for a configuration.
///
/// 1. Sample tests are dropped when `includeSampleTests` is false
/// 2. A descriptor without conditionals is included
/// 3. Otherwise every conditional must resolve to a value strictly equal to the
///    expected one; an absent value never matches, not even `null`
#[must_use]
pub fn should_include(descriptor: &FileDescriptor, config: &ProjectConfig) -> bool {
    if !config.include_sample_tests && is_sample_test(&descriptor.path) {
        tracing::debug!("Skipping sample test {}", descriptor.path);
        return false;
    }

    let Some(conditional) = &descriptor.conditional else {
        return true;
    };

    let view = config.query_view();
    conditional.iter().all(|(key, expected)| matches_condition(&view, key, expected))
}

fn matches_condition(view: &Value, dotted_key: &str, expected: &Value) -> bool {
    lookup(view, dotted_key).is_some_and(|actual| actual == expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_config;
    use serde_json::json;

    #[test]
    fn test_scenario_selenium_without_samples() {
        let config = sample_config();
        assert!(!config.include_sample_tests);

        let login = FileDescriptor::template("src/test/java/tests/LoginTest.java.hbs");
        let base = FileDescriptor::template("src/test/java/base/BaseTest.java.hbs");
        assert!(!should_include(&login, &config));
        assert!(should_include(&base, &config));

        let mut with_samples = config;
        with_samples.include_sample_tests = true;
        assert!(should_include(&login, &with_samples));
    }

    #[test]
    fn test_conditional_on_utility_flag() {
        let descriptor =
            FileDescriptor::template("src/utils/Log.java.hbs").when("utilities.logger", json!(true));

        let mut config = sample_config();
        assert!(!should_include(&descriptor, &config));

        config.utilities.insert("logger".to_string(), false);
        assert!(!should_include(&descriptor, &config));

        config.utilities.insert("logger".to_string(), true);
        assert!(should_include(&descriptor, &config));

        // Unrelated fields do not matter
        config.project_name = "Something Else".to_string();
        config.utilities.insert("screenshots".to_string(), false);
        config.cicd_tool = Some("jenkins".to_string());
        assert!(should_include(&descriptor, &config));
    }

    #[test]
    fn test_conditionals_are_conjunctive() {
        let descriptor = FileDescriptor::template("Jenkinsfile.hbs")
            .when("cicdTool", json!("jenkins"))
            .when("utilities.logger", json!(true));

        let mut config = sample_config();
        config.cicd_tool = Some("jenkins".to_string());
        assert!(!should_include(&descriptor, &config));

        config.utilities.insert("logger".to_string(), true);
        assert!(should_include(&descriptor, &config));
    }

    #[test]
    fn test_absent_value_never_matches_null() {
        let descriptor = FileDescriptor::template("report.hbs").when("reportingTool", Value::Null);
        let config = sample_config();
        assert!(config.reporting_tool.is_none());
        assert!(!should_include(&descriptor, &config));
    }

    #[test]
    fn test_strict_equality() {
        let descriptor = FileDescriptor::template("a.hbs").when("utilities.logger", json!("true"));
        let mut config = sample_config();
        config.utilities.insert("logger".to_string(), true);
        assert!(!should_include(&descriptor, &config));
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let descriptors = vec![
            FileDescriptor::template("pom.xml.hbs"),
            FileDescriptor::template("src/test/java/tests/LoginTest.java.hbs"),
            FileDescriptor::template("src/test/java/pages/LoginPage.java.hbs"),
            FileDescriptor::template("tests/checkout.spec.ts.hbs"),
            FileDescriptor::template("utils/Log.java.hbs").when("utilities.logger", json!(true)),
        ];
        let config = sample_config();

        let once: Vec<FileDescriptor> =
            descriptors.iter().filter(|d| should_include(d, &config)).cloned().collect();
        let twice: Vec<FileDescriptor> =
            once.iter().filter(|d| should_include(d, &config)).cloned().collect();
        assert_eq!(once, twice);
        assert!(once.iter().all(|d| !is_sample_test(&d.path)));
    }
}
