//! Template packs: manifests, stores and resolution.
//!
//! A template pack is a manifest plus a tree of template files, identified by a
//! [`PackKey`](crate::project::PackKey). On disk a pack root looks like:
//!
//! ```text
//! packs/
//! ├── shared/
//! │   └── tool-versions.json
//! └── web-java-selenium-testng-maven/
//!     ├── manifest.json
//!     └── templates/
//!         ├── pom.xml.hbs
//!         └── src/test/java/base/BaseTest.java.hbs
//! ```
//!
//! # Manifest Format
//!
//! ```json
//! {
//!   "name": "Selenium + TestNG (Java, Maven)",
//!   "version": "1.4.0",
//!   "combination": {
//!     "testingType": "web", "language": "java", "framework": "selenium",
//!     "testRunner": "testng", "buildTool": "maven"
//!   },
//!   "toolVersions": { "selenium": "4.21.0" },
//!   "files": [
//!     { "path": "pom.xml.hbs", "isTemplate": true },
//!     { "path": "mvnw", "isTemplate": false, "mode": 493 },
//!     {
//!       "path": "src/test/java/{{packagePath}}/utils/Log.java.hbs",
//!       "isTemplate": true,
//!       "conditional": { "utilities.logger": true }
//!     }
//!   ]
//! }
//! ```
//!
//! - [`store`] - The [`PackStore`] trait and the [`DirectoryPackStore`] layout above
//! - [`resolver`] - The cache-aside [`PackResolver`]

pub mod resolver;
pub mod store;

pub use resolver::PackResolver;
pub use store::{DirectoryPackStore, PackStore};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::catalog::ToolVersions;
use crate::project::PackKey;

/// Manifest document of one template pack.
///
/// Read-only once loaded; shared between requests through the manifest cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePackManifest {
    /// Display name of the pack
    pub name: String,
    /// Pack version
    #[serde(default)]
    pub version: String,
    /// Optional description shown by `qagen packs`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Configuration combination the pack supports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combination: Option<PackCombination>,
    /// Tool versions; after resolution this is the shared catalog merged with the
    /// pack's own pins
    #[serde(default)]
    pub tool_versions: ToolVersions,
    /// Files in generation order
    #[serde(default)]
    pub files: Vec<FileDescriptor>,
}

/// The five configuration fields a pack is built for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackCombination {
    pub testing_type: String,
    pub language: String,
    pub framework: String,
    pub test_runner: String,
    pub build_tool: String,
}

impl PackCombination {
    /// Pack key this combination maps to.
    #[must_use]
    pub fn pack_key(&self) -> PackKey {
        PackKey::new(
            [
                self.testing_type.as_str(),
                self.language.as_str(),
                self.framework.as_str(),
                self.test_runner.as_str(),
                self.build_tool.as_str(),
            ]
            .join(crate::constants::PACK_KEY_SEPARATOR),
        )
    }
}

/// One file of a pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    /// Template path relative to the pack's `templates/` directory; may itself
    /// contain template expressions
    pub path: String,
    /// Whether the content is a template (otherwise copied verbatim)
    #[serde(default)]
    pub is_template: bool,
    /// Unix permission bits for the generated file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,
    /// Dotted-key predicates that must all hold for the file to ship
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<BTreeMap<String, Value>>,
}

impl FileDescriptor {
    /// Descriptor for a templated file without conditions.
    pub fn template(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_template: true,
            mode: None,
            conditional: None,
        }
    }

    /// Descriptor for a verbatim file without conditions.
    pub fn verbatim(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_template: false,
            mode: None,
            conditional: None,
        }
    }

    /// Add a conditional predicate.
    #[must_use]
    pub fn when(mut self, dotted_key: impl Into<String>, expected: Value) -> Self {
        self.conditional.get_or_insert_with(BTreeMap::new).insert(dotted_key.into(), expected);
        self
    }

    /// Set the file mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }
}

impl TemplatePackManifest {
    /// Whether the declared combination (if any) maps to `key`.
    #[must_use]
    pub fn supports(&self, key: &PackKey) -> bool {
        self.combination.as_ref().is_none_or(|c| c.pack_key() == *key)
    }
}
