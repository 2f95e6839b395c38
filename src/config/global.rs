//! Global configuration for QAGen.
//!
//! User-wide settings live in `~/.qagen/config.toml` (`%LOCALAPPDATA%\qagen\config.toml`
//! on Windows). Every field is optional; a missing file yields the defaults.
//!
//! ```toml
//! packs_dir = "~/qagen/packs"
//! cache_ttl_secs = 3600
//! cache_sweep_interval_secs = 60
//! strict = true
//! empty_pack_policy = "allow"
//! templating = true
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::constants::{DEFAULT_CACHE_SWEEP_INTERVAL, DEFAULT_CACHE_TTL, MAX_CACHE_DURATION};
use crate::core::QagenError;
use crate::generator::{EmptyPackPolicy, GenerateOptions};

const fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL.as_secs()
}

const fn default_cache_sweep_interval_secs() -> u64 {
    DEFAULT_CACHE_SWEEP_INTERVAL.as_secs()
}

const fn default_true() -> bool {
    true
}

/// User-wide QAGen settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Template pack root; `~` and environment variables are expanded.
    ///
    /// Defaults to `packs` next to the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packs_dir: Option<String>,

    /// Lifetime of a cached manifest in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Interval between sweeps of expired cache entries in seconds
    #[serde(default = "default_cache_sweep_interval_secs")]
    pub cache_sweep_interval_secs: u64,

    /// Abort on missing template files
    #[serde(default = "default_true")]
    pub strict: bool,

    /// Outcome of a run that produces no files
    #[serde(default)]
    pub empty_pack_policy: EmptyPackPolicy,

    /// Evaluate templates; `false` copies pack files verbatim
    #[serde(default = "default_true")]
    pub templating: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            packs_dir: None,
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_sweep_interval_secs: default_cache_sweep_interval_secs(),
            strict: true,
            empty_pack_policy: EmptyPackPolicy::default(),
            templating: true,
        }
    }
}

impl GlobalConfig {
    /// Load from the default location, or defaults when the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or the file exists
    /// but cannot be read or parsed.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` when given, otherwise from the default location.
    ///
    /// A missing file yields defaults in both cases.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if fs::try_exists(&path).await.unwrap_or(false) {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No global config at {}; using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or holds a
    /// cache duration that is zero or longer than 30 days.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse global config from {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), QagenError> {
        let max = MAX_CACHE_DURATION.as_secs();
        for (name, secs) in [
            ("cache_ttl_secs", self.cache_ttl_secs),
            ("cache_sweep_interval_secs", self.cache_sweep_interval_secs),
        ] {
            if secs == 0 || secs > max {
                return Err(QagenError::ConfigError {
                    message: format!("{name} must be between 1 and {max}, got {secs}"),
                });
            }
        }
        Ok(())
    }

    /// Platform-specific location of the global config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home (or, on Windows, local data) directory cannot be
    /// determined.
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    fn config_dir() -> Result<PathBuf> {
        let dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("qagen")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".qagen")
        };
        Ok(dir)
    }

    /// Resolve the pack root, preferring `override_dir` over the configured value.
    ///
    /// # Errors
    ///
    /// Returns [`QagenError::ConfigError`] when expansion fails (an unknown
    /// `$VARIABLE`), or an error if the default directory cannot be determined.
    pub fn packs_dir(&self, override_dir: Option<&str>) -> Result<PathBuf> {
        match override_dir.or(self.packs_dir.as_deref()) {
            Some(raw) => {
                let expanded = shellexpand::full(raw).map_err(|e| QagenError::ConfigError {
                    message: format!("Cannot expand packs_dir '{raw}': {e}"),
                })?;
                Ok(PathBuf::from(expanded.as_ref()))
            }
            None => Ok(Self::config_dir()?.join("packs")),
        }
    }

    /// Manifest lifetime in the cache.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Interval of the cache sweeper.
    #[must_use]
    pub const fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_interval_secs)
    }

    /// Generation options implied by this configuration.
    #[must_use]
    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            strict: self.strict,
            empty_pack_policy: self.empty_pack_policy,
            timestamp: None,
            templating: self.templating,
        }
    }
}
