//! Plumbing shared by the commands: engine construction, spinners, output format.

use anyhow::Result;
use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::CliConfig;
use crate::cache::{ManifestCache, TtlCache};
use crate::config::GlobalConfig;
use crate::core::QagenError;
use crate::generator::{GenerateOptions, Generator};
use crate::pack::{DirectoryPackStore, PackResolver};

/// Output format of the reporting commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON on stdout
    Json,
}

/// The global configuration plus the objects every command builds from it.
pub struct CommandContext {
    /// Loaded global configuration
    pub global: GlobalConfig,
    packs_dir: PathBuf,
    cache: Arc<TtlCache>,
    no_progress: bool,
}

impl CommandContext {
    /// Load the global config and prepare the manifest cache.
    ///
    /// # Errors
    ///
    /// Fails when the global config is invalid or the pack root is not a directory.
    pub async fn load(config: &CliConfig) -> Result<Self> {
        let global = GlobalConfig::load_with_optional(config.config_path.clone()).await?;
        let packs_dir = global.packs_dir(config.packs_dir.as_deref())?;

        if !tokio::fs::metadata(&packs_dir).await.is_ok_and(|m| m.is_dir()) {
            return Err(QagenError::ConfigError {
                message: format!(
                    "Template pack directory {} does not exist (set --packs-dir or packs_dir)",
                    packs_dir.display()
                ),
            }
            .into());
        }
        tracing::debug!("Using template packs from {}", packs_dir.display());

        let cache: Arc<TtlCache> = Arc::new(TtlCache::new());
        cache.spawn_sweeper(global.cache_sweep_interval());

        Ok(Self {
            global,
            packs_dir,
            cache,
            no_progress: config.no_progress,
        })
    }

    /// The pack root.
    pub fn packs_dir(&self) -> &Path {
        &self.packs_dir
    }

    /// A resolver over the pack root, sharing this context's cache.
    pub fn resolver(&self) -> PackResolver<DirectoryPackStore> {
        let cache: Arc<dyn ManifestCache> = self.cache.clone();
        PackResolver::new(DirectoryPackStore::new(&self.packs_dir), cache, self.global.cache_ttl())
    }

    /// A generator using `options`.
    pub fn generator(&self, options: GenerateOptions) -> Generator<DirectoryPackStore> {
        Generator::new(self.resolver(), options)
    }

    /// A spinner on stderr, hidden when progress is off or stderr is not a terminal.
    pub fn spinner(&self, prefix: &'static str) -> ProgressBar {
        if self.no_progress || !std::io::stderr().is_terminal() {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{prefix:.bold} {spinner:.cyan} {msg}")
        {
            bar.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
        }
        bar.set_prefix(prefix);
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }
}
