//! Tool version catalog.
//!
//! A single flat `tool -> version` catalog is shared by every pack
//! (`<root>/shared/tool-versions.json`). Packs may pin their own versions in the
//! manifest's `toolVersions`; those overrides always win.

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

use crate::core::QagenError;
use crate::core::file_error::read_optional;

/// Flat map of tool name to version string.
pub type ToolVersions = BTreeMap<String, String>;

/// Load the shared catalog from disk.
///
/// A missing catalog is an empty catalog; a malformed one is an error that names
/// the file.
pub async fn load_catalog(path: &Path) -> Result<ToolVersions> {
    let Some(content) = read_optional(path, "loading shared tool version catalog").await? else {
        tracing::debug!("No shared tool version catalog at {}", path.display());
        return Ok(ToolVersions::new());
    };

    let catalog: ToolVersions =
        serde_json::from_str(&content).map_err(|e| QagenError::ManifestParseError {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;

    tracing::debug!("Loaded {} shared tool versions from {}", catalog.len(), path.display());
    Ok(catalog)
}

/// Merge shared versions with pack overrides; pack entries win.
///
/// Pure and idempotent: `merge(merge(s, o), o) == merge(s, o)`.
#[must_use]
pub fn merge_tool_versions(shared: &ToolVersions, overrides: &ToolVersions) -> ToolVersions {
    let mut merged = shared.clone();
    merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}
