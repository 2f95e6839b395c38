//! On-disk template pack fixtures.
//!
//! [`PackFixture::new`] starts a builder for one or more packs; [`PackFixtureBuilder::write`]
//! lays them out under a fresh temporary directory using the real pack layout, so
//! tests exercise the same [`DirectoryPackStore`](crate::pack::DirectoryPackStore)
//! code path as production.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::catalog::ToolVersions;
use crate::constants::{
    MANIFEST_FILE_NAME, SHARED_CATALOG_FILE_NAME, SHARED_DIR_NAME, TEMPLATES_DIR_NAME,
};
use crate::pack::{FileDescriptor, TemplatePackManifest};

struct PackSpec {
    key: String,
    tool_versions: ToolVersions,
    files: Vec<(FileDescriptor, Option<String>)>,
}

impl PackSpec {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            tool_versions: ToolVersions::new(),
            files: Vec::new(),
        }
    }
}

/// Builder collecting packs before they are written to disk.
pub struct PackFixtureBuilder {
    packs: Vec<PackSpec>,
    shared: Option<ToolVersions>,
}

/// Template packs written to a temporary pack root; removed on drop.
pub struct PackFixture {
    dir: TempDir,
    primary: String,
}

impl PackFixture {
    /// Start a fixture whose first (primary) pack is `key`.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(key: &str) -> PackFixtureBuilder {
        PackFixtureBuilder {
            packs: vec![PackSpec::new(key)],
            shared: None,
        }
    }

    /// The pack root.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Directory of the primary pack.
    pub fn pack_dir(&self) -> PathBuf {
        self.pack_dir_of(&self.primary)
    }

    /// Directory of any pack in the fixture.
    pub fn pack_dir_of(&self, key: &str) -> PathBuf {
        self.dir.path().join(key)
    }
}

impl PackFixtureBuilder {
    fn current(&mut self) -> &mut PackSpec {
        // `new` always pushes a pack, so the list is never empty
        let last = self.packs.len() - 1;
        &mut self.packs[last]
    }

    /// Start another pack; following calls add to it.
    pub fn pack(mut self, key: &str) -> Self {
        self.packs.push(PackSpec::new(key));
        self
    }

    /// Add a templated file.
    pub fn file(mut self, path: &str, content: &str) -> Self {
        self.current().files.push((FileDescriptor::template(path), Some(content.to_string())));
        self
    }

    /// Add a templated file guarded by one conditional.
    pub fn conditional_file(mut self, path: &str, content: &str, key: &str, expected: Value) -> Self {
        let descriptor = FileDescriptor::template(path).when(key, expected);
        self.current().files.push((descriptor, Some(content.to_string())));
        self
    }

    /// Add a file copied verbatim, optionally with a mode.
    pub fn verbatim_file(mut self, path: &str, content: &str, mode: Option<u32>) -> Self {
        let mut descriptor = FileDescriptor::verbatim(path);
        descriptor.mode = mode;
        self.current().files.push((descriptor, Some(content.to_string())));
        self
    }

    /// Declare a templated file in the manifest without writing it.
    pub fn declared_only(mut self, path: &str) -> Self {
        self.current().files.push((FileDescriptor::template(path), None));
        self
    }

    /// Pin a tool version in the current pack's manifest.
    pub fn tool_version(mut self, tool: &str, version: &str) -> Self {
        self.current().tool_versions.insert(tool.to_string(), version.to_string());
        self
    }

    /// Write a shared tool version catalog.
    pub fn shared_versions(mut self, versions: &[(&str, &str)]) -> Self {
        let shared = self.shared.get_or_insert_with(ToolVersions::new);
        for (tool, version) in versions {
            shared.insert((*tool).to_string(), (*version).to_string());
        }
        self
    }

    /// Lay the packs out on disk.
    pub fn write(self) -> Result<PackFixture> {
        let dir = TempDir::new().context("Failed to create pack fixture directory")?;
        let primary = self.packs[0].key.clone();

        for pack in &self.packs {
            write_pack(dir.path(), pack)?;
        }

        if let Some(shared) = &self.shared {
            let shared_dir = dir.path().join(SHARED_DIR_NAME);
            std::fs::create_dir_all(&shared_dir)?;
            std::fs::write(
                shared_dir.join(SHARED_CATALOG_FILE_NAME),
                serde_json::to_string_pretty(shared)?,
            )?;
        }

        Ok(PackFixture {
            dir,
            primary,
        })
    }
}

fn write_pack(root: &Path, pack: &PackSpec) -> Result<()> {
    let pack_dir = root.join(&pack.key);
    let templates = pack_dir.join(TEMPLATES_DIR_NAME);
    std::fs::create_dir_all(&templates)
        .with_context(|| format!("Failed to create {}", templates.display()))?;

    let manifest = TemplatePackManifest {
        name: format!("{} fixture", pack.key),
        version: "1.0.0".to_string(),
        description: None,
        combination: None,
        tool_versions: pack.tool_versions.clone(),
        files: pack.files.iter().map(|(descriptor, _)| descriptor.clone()).collect(),
    };
    std::fs::write(pack_dir.join(MANIFEST_FILE_NAME), serde_json::to_string_pretty(&manifest)?)?;

    for (descriptor, content) in &pack.files {
        let Some(content) = content else {
            continue;
        };
        let path = templates.join(&descriptor.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}
