//! Cache-aside manifest resolution.
//!
//! [`PackResolver`] turns a [`ProjectConfig`] into its merged manifest:
//!
//! 1. derive the [`PackKey`]
//! 2. `get` it from the [`ManifestCache`]
//! 3. on a miss, load from the [`PackStore`], merge the shared tool version catalog
//!    under the pack's own pins, and `set` it back with the configured TTL
//!
//! Cache failures are soft: they are logged and the manifest is served from the
//! store. Store failures and unknown packs are hard errors.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use super::{PackStore, TemplatePackManifest};
use crate::cache::ManifestCache;
use crate::catalog::merge_tool_versions;
use crate::core::QagenError;
use crate::project::{PackKey, ProjectConfig};

/// Resolves manifests through an injected cache in front of a pack store.
pub struct PackResolver<S> {
    store: S,
    cache: Arc<dyn ManifestCache>,
    ttl: Duration,
}

impl<S: PackStore> PackResolver<S> {
    /// Create a resolver; `ttl` is applied to every manifest written to the cache.
    pub fn new(store: S, cache: Arc<dyn ManifestCache>, ttl: Duration) -> Self {
        Self {
            store,
            cache,
            ttl,
        }
    }

    /// Resolve the merged manifest for a configuration.
    ///
    /// # Errors
    ///
    /// [`QagenError::PackNotFound`] when no manifest exists for the derived key, or
    /// the store's error when the manifest cannot be read or parsed.
    pub async fn resolve(&self, config: &ProjectConfig) -> Result<Arc<TemplatePackManifest>> {
        self.resolve_key(&config.pack_key()).await
    }

    /// Resolve the merged manifest for an explicit key.
    pub async fn resolve_key(&self, key: &PackKey) -> Result<Arc<TemplatePackManifest>> {
        match self.cache.get(key.as_str()) {
            Ok(Some(manifest)) => {
                tracing::debug!("Manifest cache hit for {}", key);
                return Ok(manifest);
            }
            Ok(None) => tracing::debug!("Manifest cache miss for {}", key),
            Err(e) => {
                let err = QagenError::CacheUnavailable {
                    reason: e.reason,
                };
                tracing::warn!("{}; loading {} from the pack store", err, key);
            }
        }

        let manifest = Arc::new(self.load(key).await?);

        if let Err(e) = self.cache.set(key.as_str(), Arc::clone(&manifest), self.ttl) {
            tracing::warn!("Could not cache manifest for {}: {}", key, e);
        }
        Ok(manifest)
    }

    /// Whether a pack exists for a configuration. Never fails; store errors count as
    /// "does not exist".
    pub async fn exists(&self, config: &ProjectConfig) -> bool {
        let key = config.pack_key();
        if let Ok(Some(_)) = self.cache.get(key.as_str()) {
            return true;
        }
        match self.store.load_manifest(&key).await {
            Ok(found) => found.is_some(),
            Err(e) => {
                tracing::debug!("Treating pack {} as absent: {:#}", key, e);
                false
            }
        }
    }

    /// Read one template file of a pack.
    pub async fn read_template(&self, key: &PackKey, path: &str) -> Result<Option<String>> {
        self.store.read_template(key, path).await
    }

    /// List every available pack key.
    pub async fn list_packs(&self) -> Result<Vec<PackKey>> {
        self.store.list_packs().await
    }

    async fn load(&self, key: &PackKey) -> Result<TemplatePackManifest> {
        let mut manifest =
            self.store.load_manifest(key).await?.ok_or_else(|| QagenError::PackNotFound {
                pack: key.to_string(),
            })?;

        if !manifest.supports(key)
            && let Some(combination) = &manifest.combination
        {
            tracing::warn!(
                "Pack {} declares combination {}; serving it under the directory key",
                key,
                combination.pack_key()
            );
        }

        let shared = self.store.shared_catalog().await?;
        manifest.tool_versions = merge_tool_versions(&shared, &manifest.tool_versions);

        tracing::debug!(
            "Loaded pack {} ({} files, {} tool versions)",
            key,
            manifest.files.len(),
            manifest.tool_versions.len()
        );
        Ok(manifest)
    }
}
