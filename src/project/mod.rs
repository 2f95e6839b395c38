//! Project configuration and pack keys.
//!
//! [`ProjectConfig`] is the user's selection of testing type, language, framework and
//! tooling. The engine never mutates it. Besides the typed struct form it offers a
//! queryable map view ([`ProjectConfig::query_view`]) that manifest conditionals are
//! evaluated against with [`lookup`], one dotted segment at a time.
//!
//! # Loading
//!
//! The CLI accepts project configurations as JSON, YAML or TOML, picked by file
//! extension:
//!
//! ```json
//! {
//!   "projectName": "shop-tests",
//!   "testingType": "web",
//!   "language": "java",
//!   "framework": "selenium",
//!   "testRunner": "testng",
//!   "buildTool": "maven",
//!   "testingPattern": "page-object-model",
//!   "cicdTool": "github-actions",
//!   "utilities": { "logger": true, "screenshots": false },
//!   "includeSampleTests": false
//! }
//! ```

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::constants::PACK_KEY_SEPARATOR;

const fn default_include_sample_tests() -> bool {
    true
}

/// The user's project selections.
///
/// Identifiers are assumed validated and sanitized upstream. Optional fields that are
/// `None` are omitted from the query view rather than serialized as `null`, so a
/// conditional on an unset field never matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Human-readable project name, also the seed for derived identifiers
    pub project_name: String,
    /// Kind of testing (`web`, `mobile`, `api`, ...)
    pub testing_type: String,
    /// Automation framework (`selenium`, `playwright`, `cypress`, ...)
    pub framework: String,
    /// Implementation language (`java`, `typescript`, `python`, `csharp`, ...)
    pub language: String,
    /// Test organisation pattern (`page-object-model`, `bdd`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testing_pattern: Option<String>,
    /// Test runner (`testng`, `junit5`, `pytest`, `jest`, ...)
    pub test_runner: String,
    /// Build tool (`maven`, `gradle`, `npm`, `pip`, ...)
    pub build_tool: String,
    /// Group identifier (Java-style), derived from the project name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Artifact identifier, derived from the project name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,
    /// CI/CD tool (`jenkins`, `github-actions`, `gitlab-ci`, `azure-devops`, `circleci`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cicd_tool: Option<String>,
    /// Reporting tool (`allure`, `extent-reports`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporting_tool: Option<String>,
    /// Named boolean utility switches (`logger`, `screenshots`, `dataProvider`, ...)
    #[serde(default)]
    pub utilities: BTreeMap<String, bool>,
    /// Whether example tests ship with the generated project
    #[serde(default = "default_include_sample_tests")]
    pub include_sample_tests: bool,
}

impl ProjectConfig {
    /// Load a project configuration from a JSON, YAML or TOML file.
    ///
    /// The format is picked from the file extension; unknown extensions are parsed
    /// as JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read project config {}", path.display()))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json").to_ascii_lowercase();
        let config: Self = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid YAML in project config {}", path.display()))?,
            "toml" => toml::from_str(&content)
                .with_context(|| format!("Invalid TOML in project config {}", path.display()))?,
            _ => serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON in project config {}", path.display()))?,
        };

        if config.project_name.trim().is_empty() {
            bail!("Project config {} has an empty projectName", path.display());
        }
        Ok(config)
    }

    /// Derive the pack key for this configuration.
    #[must_use]
    pub fn pack_key(&self) -> PackKey {
        PackKey::from_config(self)
    }

    /// Queryable map view of the configuration.
    ///
    /// Keys use the serialized (camelCase) field names, e.g. `utilities.logger`.
    #[must_use]
    pub fn query_view(&self) -> Value {
        // Plain data with string keys; serialization cannot fail
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Whether the selected testing pattern is behaviour-driven.
    #[must_use]
    pub fn is_bdd(&self) -> bool {
        self.testing_pattern.as_deref().is_some_and(|p| p.eq_ignore_ascii_case("bdd"))
    }

    /// Whether a utility flag is switched on.
    #[must_use]
    pub fn utility(&self, name: &str) -> bool {
        self.utilities.get(name).copied().unwrap_or(false)
    }
}

/// Resolve a dotted key against a JSON tree.
///
/// Walks one `.`-separated segment at a time; any missing link (including indexing
/// into a non-object) resolves to `None`.
///
/// # Examples
///
/// ```
/// use qagen_cli::project::lookup;
/// use serde_json::json;
///
/// let view = json!({ "utilities": { "logger": true } });
/// assert_eq!(lookup(&view, "utilities.logger"), Some(&json!(true)));
/// assert_eq!(lookup(&view, "utilities.reporter"), None);
/// assert_eq!(lookup(&view, "utilities.logger.level"), None);
/// ```
#[must_use]
pub fn lookup<'a>(root: &'a Value, dotted_key: &str) -> Option<&'a Value> {
    dotted_key.split('.').try_fold(root, |node, segment| node.as_object()?.get(segment))
}

/// Deterministic composite identifier of a template pack.
///
/// Built from `testingType`, `language`, `framework`, `testRunner` and `buildTool`,
/// in that order, joined with [`PACK_KEY_SEPARATOR`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackKey(String);

impl PackKey {
    /// Build the key for a configuration.
    #[must_use]
    pub fn from_config(config: &ProjectConfig) -> Self {
        Self(
            [
                config.testing_type.as_str(),
                config.language.as_str(),
                config.framework.as_str(),
                config.test_runner.as_str(),
                config.build_tool.as_str(),
            ]
            .join(PACK_KEY_SEPARATOR),
        )
    }

    /// Wrap an existing key (e.g. a pack directory name).
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PackKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
