//! Template context building.
//!
//! Every template is rendered against a flat object holding the project
//! configuration (camelCase keys, unset optional fields omitted) plus these
//! computed fields:
//!
//! | Variable       | Value                                                        |
//! |----------------|--------------------------------------------------------------|
//! | `groupId`      | configured, or `com.<alphanumeric lowercase project name>`   |
//! | `artifactId`   | configured, or the lowercase name with spaces/`_` as `-`     |
//! | `packageName`  | group id reduced to a valid package identifier               |
//! | `packagePath`  | `packageName` with `.` as `/`                                |
//! | `namespace`    | PascalCase project name                                      |
//! | `environments` | `["dev", "qa", "prod"]`                                      |
//! | `toolVersions` | shared catalog merged with the pack's pins                   |
//! | `timestamp`    | RFC 3339 UTC with `:` and `.` replaced by `-`                |
//!
//! A context is built fresh for every generation and never cached.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};
use tera::Context as TeraContext;

use crate::catalog::ToolVersions;
use crate::constants::ENVIRONMENTS;
use crate::project::{ProjectConfig, lookup};

/// Variables available to one generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateContext {
    vars: Map<String, Value>,
}

impl TemplateContext {
    /// Build the context stamped with the current time.
    #[must_use]
    pub fn build(config: &ProjectConfig, tool_versions: &ToolVersions) -> Self {
        Self::build_at(config, tool_versions, Utc::now())
    }

    /// Build the context with an explicit timestamp, for reproducible output.
    #[must_use]
    pub fn build_at(
        config: &ProjectConfig,
        tool_versions: &ToolVersions,
        at: DateTime<Utc>,
    ) -> Self {
        let mut vars = match config.query_view() {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let group_id = config.group_id.clone().unwrap_or_else(|| default_group_id(&config.project_name));
        let artifact_id =
            config.artifact_id.clone().unwrap_or_else(|| default_artifact_id(&config.project_name));

        let package = package_name(&group_id);
        vars.insert("packagePath".into(), json!(sanitize_path(&package.replace('.', "/"))));
        vars.insert("packageName".into(), json!(package));
        vars.insert("groupId".into(), json!(group_id));
        vars.insert("artifactId".into(), json!(artifact_id));
        vars.insert("namespace".into(), json!(namespace(&config.project_name)));
        vars.insert("environments".into(), json!(ENVIRONMENTS));
        vars.insert("toolVersions".into(), json!(tool_versions));
        vars.insert("timestamp".into(), json!(file_safe_timestamp(at)));

        Self {
            vars,
        }
    }

    /// Look up a variable by dotted key.
    #[must_use]
    pub fn get(&self, dotted_key: &str) -> Option<&Value> {
        let (head, tail) = match dotted_key.split_once('.') {
            Some((head, tail)) => (head, Some(tail)),
            None => (dotted_key, None),
        };
        let root = self.vars.get(head)?;
        match tail {
            Some(tail) => lookup(root, tail),
            None => Some(root),
        }
    }

    /// Convert into a Tera context.
    #[must_use]
    pub fn to_tera(&self) -> TeraContext {
        let mut context = TeraContext::new();
        for (key, value) in &self.vars {
            context.insert(key.as_str(), value);
        }
        context
    }

    /// Every addressable variable as a dotted path, used for suggestions.
    #[must_use]
    pub fn variable_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for (key, value) in &self.vars {
            collect_names(key, value, &mut names);
        }
        names
    }
}

fn collect_names(prefix: &str, value: &Value, names: &mut Vec<String>) {
    names.push(prefix.to_string());
    if let Value::Object(map) = value {
        for (key, child) in map {
            collect_names(&format!("{prefix}.{key}"), child, names);
        }
    }
}

/// `com.` followed by the project name's ASCII alphanumerics, lowercased.
fn default_group_id(project_name: &str) -> String {
    let compact: String = project_name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if compact.is_empty() {
        "com.project".to_string()
    } else {
        format!("com.{compact}")
    }
}

fn default_artifact_id(project_name: &str) -> String {
    project_name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '_' { '-' } else { c })
        .collect()
}

/// Lowercase dot-separated identifier; other characters dropped, empty segments removed.
fn package_name(group_id: &str) -> String {
    group_id
        .split('.')
        .map(|segment| {
            segment
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
                .map(|c| c.to_ascii_lowercase())
                .collect::<String>()
        })
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// Make a string safe to use as a relative path.
///
/// Characters outside `[A-Za-z0-9._/-]` become `_`, `..` sequences are removed until
/// none remain, and leading slashes are stripped.
///
/// # Examples
///
/// ```
/// use qagen_cli::templating::sanitize_path;
///
/// assert_eq!(sanitize_path("com/acme shop/tests"), "com/acme_shop/tests");
/// assert_eq!(sanitize_path("/../../etc/passwd"), "etc/passwd");
/// ```
#[must_use]
pub fn sanitize_path(raw: &str) -> String {
    let mut path: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '/' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    while path.contains("..") {
        path = path.replace("..", "");
    }
    // Removing ".." can leave "//" behind
    while path.contains("//") {
        path = path.replace("//", "/");
    }
    path.trim_start_matches('/').to_string()
}

/// PascalCase identifier from a project name.
///
/// Splits on `-`, `_` and whitespace, title-cases each segment and concatenates.
#[must_use]
pub fn namespace(project_name: &str) -> String {
    project_name
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect()
}

fn file_safe_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true).replace([':', '.'], "-")
}
