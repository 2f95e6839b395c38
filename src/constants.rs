//! Global constants used throughout the QAGen codebase.
//!
//! File names, separators and default durations that more than one module
//! relies on live here so the on-disk pack layout is defined in one place.

use std::time::Duration;

/// Separator joining the five configuration fields of a pack key.
pub const PACK_KEY_SEPARATOR: &str = "-";

/// File name of the manifest document inside every pack directory.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Directory inside a pack that holds the template tree.
pub const TEMPLATES_DIR_NAME: &str = "templates";

/// Directory under the pack root holding shared, non-pack data.
pub const SHARED_DIR_NAME: &str = "shared";

/// Shared tool version catalog, relative to the shared directory.
pub const SHARED_CATALOG_FILE_NAME: &str = "tool-versions.json";

/// Suffix carried by templated files in a pack; dropped from output paths.
pub const TEMPLATE_SUFFIX: &str = ".hbs";

/// Environment names exposed to every template as `environments`.
pub const ENVIRONMENTS: [&str; 3] = ["dev", "qa", "prod"];

/// Default time-to-live of a cached manifest (1 hour).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Default interval between background sweeps of expired cache entries (60 seconds).
pub const DEFAULT_CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Upper bound for configured cache durations (30 days).
pub const MAX_CACHE_DURATION: Duration = Duration::from_secs(30 * 24 * 3600);
