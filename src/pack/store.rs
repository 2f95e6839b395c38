//! Pack storage backends.
//!
//! The engine's only contract with pack storage is: given a pack key return a
//! manifest, and given a declared template path return its text. The storage medium
//! sits behind [`PackStore`]; [`DirectoryPackStore`] implements the on-disk layout
//! described in the [module docs](super).

use anyhow::Result;
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use tokio::sync::OnceCell;

use super::TemplatePackManifest;
use crate::catalog::{ToolVersions, load_catalog};
use crate::constants::{
    MANIFEST_FILE_NAME, SHARED_CATALOG_FILE_NAME, SHARED_DIR_NAME, TEMPLATES_DIR_NAME,
};
use crate::core::file_error::{FileOperation, FileResultExt, read_optional};
use crate::core::QagenError;
use crate::project::PackKey;

/// Source of pack manifests, template files and the shared version catalog.
///
/// Absence is not an error: `Ok(None)` means "no such pack" or "no such file".
pub trait PackStore: Send + Sync {
    /// Load the raw manifest of a pack (shared versions not yet merged).
    fn load_manifest(
        &self,
        key: &PackKey,
    ) -> impl Future<Output = Result<Option<TemplatePackManifest>>> + Send;

    /// Read a template file by its declared path.
    fn read_template(
        &self,
        key: &PackKey,
        path: &str,
    ) -> impl Future<Output = Result<Option<String>>> + Send;

    /// The shared tool version catalog.
    fn shared_catalog(&self) -> impl Future<Output = Result<ToolVersions>> + Send;

    /// Every pack key the store can serve.
    fn list_packs(&self) -> impl Future<Output = Result<Vec<PackKey>>> + Send;
}

/// Directory-per-pack store rooted at a local path.
#[derive(Debug)]
pub struct DirectoryPackStore {
    root: PathBuf,
    catalog: OnceCell<ToolVersions>,
}

impl DirectoryPackStore {
    /// Create a store over `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            catalog: OnceCell::new(),
        }
    }

    /// The pack root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of one pack, `None` if the key cannot name a single directory.
    fn pack_dir(&self, key: &PackKey) -> Option<PathBuf> {
        let key = key.as_str();
        let single_segment = !key.is_empty()
            && key != SHARED_DIR_NAME
            && matches!(
                Path::new(key).components().collect::<Vec<_>>().as_slice(),
                [Component::Normal(_)]
            );
        single_segment.then(|| self.root.join(key))
    }
}

/// Join a declared template path below `base`, refusing anything that escapes it.
pub(crate) fn contained_join(base: &Path, relative: &str) -> Option<PathBuf> {
    let mut joined = base.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => joined.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    (joined != base).then_some(joined)
}

impl PackStore for DirectoryPackStore {
    async fn load_manifest(&self, key: &PackKey) -> Result<Option<TemplatePackManifest>> {
        let Some(dir) = self.pack_dir(key) else {
            tracing::warn!("Rejecting pack key that is not a single path segment: {}", key);
            return Ok(None);
        };
        let path = dir.join(MANIFEST_FILE_NAME);

        let Some(content) = read_optional(&path, "loading pack manifest").await? else {
            return Ok(None);
        };

        let manifest = serde_json::from_str(&content).map_err(|e| {
            QagenError::ManifestParseError {
                file: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Some(manifest))
    }

    async fn read_template(&self, key: &PackKey, path: &str) -> Result<Option<String>> {
        let templates = self
            .pack_dir(key)
            .map(|dir| dir.join(TEMPLATES_DIR_NAME))
            .ok_or_else(|| QagenError::PackNotFound {
                pack: key.to_string(),
            })?;

        let file = contained_join(&templates, path).ok_or_else(|| QagenError::FileSystemError {
            operation: format!("resolving template path of pack '{key}' (path escapes the pack)"),
            path: path.to_string(),
        })?;

        Ok(read_optional(&file, "reading template file").await?)
    }

    async fn shared_catalog(&self) -> Result<ToolVersions> {
        let path = self.root.join(SHARED_DIR_NAME).join(SHARED_CATALOG_FILE_NAME);
        let catalog = self.catalog.get_or_try_init(|| load_catalog(&path)).await?;
        Ok(catalog.clone())
    }

    async fn list_packs(&self) -> Result<Vec<PackKey>> {
        let mut entries = tokio::fs::read_dir(&self.root).await.with_file_context(
            FileOperation::List,
            &self.root,
            "listing template packs",
        )?;

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await.with_file_context(
            FileOperation::List,
            &self.root,
            "listing template packs",
        )? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == SHARED_DIR_NAME || name.starts_with('.') {
                continue;
            }
            if tokio::fs::try_exists(entry.path().join(MANIFEST_FILE_NAME)).await.unwrap_or(false)
            {
                keys.push(PackKey::new(name));
            }
        }
        keys.sort();
        Ok(keys)
    }
}
