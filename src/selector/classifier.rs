//! Sample-test classification.
//!
//! Packs ship example tests next to the infrastructure every project needs (base
//! classes, configuration, hooks, drivers). [`is_sample_test`] tells them apart from
//! the path alone:
//!
//! 1. infrastructure allowlist (exact file name, prefix or substring) wins first
//! 2. files outside any test directory are never samples
//! 3. otherwise the file name is matched against sample naming conventions
//!
//! The trailing `.hbs` template suffix is ignored for naming conventions.

use crate::constants::TEMPLATE_SUFFIX;

/// Infrastructure files matched by exact file name.
const INFRASTRUCTURE_FILES: &[&str] = &[
    "BaseTest.java",
    "conftest.py",
    "__init__.py",
    "hooks.js",
    "hooks.ts",
    "world.js",
    "world.ts",
    "testng.xml",
    "pytest.ini",
    "cypress.config.js",
    "cypress.config.ts",
    "playwright.config.js",
    "playwright.config.ts",
    "jest.config.js",
    "jest.config.ts",
    "package.json",
    "pom.xml",
    "build.gradle",
];

/// Infrastructure files matched by file-name prefix.
const INFRASTRUCTURE_PREFIXES: &[&str] = &["Base", "base", "setup", "test-utils"];

/// Infrastructure files matched by substring of the file name.
const INFRASTRUCTURE_MARKERS: &[&str] = &[
    "Helper", "Config", "Utils", "Hooks", "Driver", "Factory", "Manager", "Runner", "Listener",
    "fixture", "env",
];

/// Directory markers identifying test trees; matched case-insensitively against the
/// path with a leading `/`.
const TEST_DIRECTORIES: &[&str] = &[
    "/tests/",
    "/test/",
    "/src/test/",
    "/features/",
    "/cypress/e2e/",
    "/e2e/",
    "/specs/",
    "/spec/",
    "/steps/",
    "/step_definitions/",
    "/stepdefinitions/",
    "/__tests__/",
];

/// File-name suffixes of sample tests, compared case-insensitively.
const SAMPLE_SUFFIXES: &[&str] = &[
    ".spec.ts",
    ".spec.js",
    ".test.ts",
    ".test.js",
    ".cy.ts",
    ".cy.js",
    "test.java",
    "tests.java",
    "tests.cs",
    "test.cs",
    ".feature",
    "_test.py",
    "_test.go",
    "steps.java",
    "steps.ts",
    "steps.js",
    "steps.cs",
    "_steps.py",
];

/// File-name prefix of sample tests (pytest convention).
const SAMPLE_PREFIX: &str = "test_";

/// Whether `path` is an example test rather than project infrastructure.
///
/// Pure and deterministic. Paths use `/` separators (pack paths are portable).
///
/// # Examples
///
/// ```
/// use qagen_cli::selector::is_sample_test;
///
/// assert!(is_sample_test("src/test/java/tests/LoginTest.java.hbs"));
/// assert!(!is_sample_test("src/test/java/base/BaseTest.java.hbs"));
/// assert!(!is_sample_test("src/main/java/LoginTest.java"));
/// ```
#[must_use]
pub fn is_sample_test(path: &str) -> bool {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let file_name = file_name.strip_suffix(TEMPLATE_SUFFIX).unwrap_or(file_name);

    if is_infrastructure(file_name) {
        return false;
    }

    if !in_test_directory(path) {
        return false;
    }

    matches_sample_naming(file_name)
}

fn is_infrastructure(file_name: &str) -> bool {
    INFRASTRUCTURE_FILES.contains(&file_name)
        || INFRASTRUCTURE_PREFIXES.iter().any(|prefix| file_name.starts_with(prefix))
        || INFRASTRUCTURE_MARKERS.iter().any(|marker| file_name.contains(marker))
}

fn in_test_directory(path: &str) -> bool {
    let rooted = format!("/{}", path.trim_start_matches('/')).to_ascii_lowercase();
    TEST_DIRECTORIES.iter().any(|marker| rooted.contains(marker))
}

fn matches_sample_naming(file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    lower.starts_with(SAMPLE_PREFIX) || SAMPLE_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
}
