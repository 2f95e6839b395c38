//! Project generation pipeline.
//!
//! A generation run is an explicit state machine driven by the consumer:
//!
//! ```text
//! Resolving ──> Iterating ──┬──> Selecting ──> Loading ──> Rendering ──> Emitting ─┐
//!                           │        │ excluded     │ missing (lenient)            │
//!                           │        └──────────────┴──────────<───────────────────┘
//!                           └──> Done
//! any hard failure ──> Aborted (the stream yields the error and ends)
//! ```
//!
//! - **Resolving** derives the pack key, resolves the merged manifest through the
//!   [`PackResolver`] and builds the [`TemplateContext`]
//! - **Iterating** walks the manifest's descriptors in declaration order; for each
//!   one the selector decides inclusion, the template is loaded from the store, path
//!   and content are rendered, and one [`GeneratedFile`] is emitted
//!
//! [`Generator::generate_stream`] is pull-based: nothing after the current file is
//! computed until the consumer polls again, and dropping the stream cancels the run.
//! [`Generator::generate_all`] simply drains the stream.

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::stream::{self, Stream, TryStreamExt};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::constants::TEMPLATE_SUFFIX;
use crate::core::QagenError;
use crate::pack::{FileDescriptor, PackResolver, PackStore, TemplatePackManifest};
use crate::project::{PackKey, ProjectConfig};
use crate::selector::should_include;
use crate::templating::{TemplateContext, TemplateRenderer};

/// What to do when a run emits no files at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyPackPolicy {
    /// An empty project is a valid outcome
    #[default]
    Allow,
    /// Fail with [`QagenError::EmptyProject`]
    Error,
}

/// Options controlling a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Abort on a missing template file instead of skipping it
    pub strict: bool,
    /// Outcome of a run that produced nothing
    pub empty_pack_policy: EmptyPackPolicy,
    /// Fixed timestamp for reproducible output; `None` uses the current time
    pub timestamp: Option<DateTime<Utc>>,
    /// Evaluate templates; when false every file is copied verbatim
    pub templating: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            strict: true,
            empty_pack_policy: EmptyPackPolicy::Allow,
            timestamp: None,
            templating: true,
        }
    }
}

/// One rendered project file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedFile {
    /// Output path relative to the project root, `/`-separated
    pub path: String,
    /// Rendered content
    pub content: String,
    /// Whether the content was produced by the template engine
    pub is_template: bool,
    /// Unix permission bits requested by the pack
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,
}

impl GeneratedFile {
    /// SHA-256 digest of the content as `sha256:<hex>`.
    #[must_use]
    pub fn checksum(&self) -> String {
        let digest = Sha256::digest(self.content.as_bytes());
        format!("sha256:{}", hex::encode(digest))
    }

    /// Content size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// State carried between descriptors of one run.
struct RunState {
    key: PackKey,
    manifest: Arc<TemplatePackManifest>,
    context: TemplateContext,
    next: usize,
    emitted: usize,
}

enum PipelineState {
    Resolving,
    Iterating(Box<RunState>),
}

/// The template pack engine.
///
/// Shareable across tasks behind an `Arc`; every run builds its own context.
pub struct Generator<S> {
    resolver: PackResolver<S>,
    renderer: TemplateRenderer,
    options: GenerateOptions,
}

impl<S: PackStore> Generator<S> {
    /// Create an engine over a resolver.
    pub fn new(resolver: PackResolver<S>, options: GenerateOptions) -> Self {
        Self {
            resolver,
            renderer: TemplateRenderer::new(options.templating),
            options,
        }
    }

    /// The pack resolver.
    pub fn resolver(&self) -> &PackResolver<S> {
        &self.resolver
    }

    /// The options runs are executed with.
    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Stream the project's files one at a time, in manifest order.
    ///
    /// The first error ends the stream. Files already yielded stay valid; an
    /// erroring file is never yielded partially.
    pub fn generate_stream<'a>(
        &'a self,
        config: &'a ProjectConfig,
    ) -> impl Stream<Item = Result<GeneratedFile>> + Send + 'a {
        stream::try_unfold(PipelineState::Resolving, move |state| self.advance(config, state))
    }

    /// Generate the whole project in memory.
    ///
    /// # Errors
    ///
    /// The first error of the run, see [`Generator::generate_stream`].
    pub async fn generate_all(&self, config: &ProjectConfig) -> Result<Vec<GeneratedFile>> {
        self.generate_stream(config).try_collect().await
    }

    /// Run the state machine until the next file is emitted or the run ends.
    async fn advance(
        &self,
        config: &ProjectConfig,
        mut state: PipelineState,
    ) -> Result<Option<(GeneratedFile, PipelineState)>> {
        loop {
            state = match state {
                PipelineState::Resolving => {
                    let key = config.pack_key();
                    tracing::debug!("Resolving pack {}", key);
                    let manifest = self.resolver.resolve_key(&key).await?;

                    let context = match self.options.timestamp {
                        Some(at) => TemplateContext::build_at(config, &manifest.tool_versions, at),
                        None => TemplateContext::build(config, &manifest.tool_versions),
                    };
                    tracing::debug!(
                        "Context built for {}; iterating {} descriptors",
                        key,
                        manifest.files.len()
                    );

                    PipelineState::Iterating(Box::new(RunState {
                        key,
                        manifest,
                        context,
                        next: 0,
                        emitted: 0,
                    }))
                }
                PipelineState::Iterating(mut run) => {
                    let Some(descriptor) = run.manifest.files.get(run.next).cloned() else {
                        return self.finish(&run);
                    };
                    run.next += 1;

                    if !should_include(&descriptor, config) {
                        tracing::debug!("Excluded {}", descriptor.path);
                        PipelineState::Iterating(run)
                    } else if let Some(file) = self.emit(&run, &descriptor).await? {
                        run.emitted += 1;
                        return Ok(Some((file, PipelineState::Iterating(run))));
                    } else {
                        PipelineState::Iterating(run)
                    }
                }
            };
        }
    }

    fn finish(&self, run: &RunState) -> Result<Option<(GeneratedFile, PipelineState)>> {
        if run.emitted == 0 && self.options.empty_pack_policy == EmptyPackPolicy::Error {
            return Err(QagenError::EmptyProject {
                pack: run.key.to_string(),
            }
            .into());
        }
        tracing::debug!("Pack {} done; emitted {} files", run.key, run.emitted);
        Ok(None)
    }

    /// Load, render and emit one selected descriptor; `None` when skipped.
    async fn emit(
        &self,
        run: &RunState,
        descriptor: &FileDescriptor,
    ) -> Result<Option<GeneratedFile>> {
        let Some(raw) = self.resolver.read_template(&run.key, &descriptor.path).await? else {
            let missing = QagenError::TemplateFileMissing {
                pack: run.key.to_string(),
                path: descriptor.path.clone(),
            };
            if self.options.strict || missing.is_fatal_in_lenient_mode() {
                return Err(missing.into());
            }
            tracing::warn!("{}; skipping", missing);
            return Ok(None);
        };

        let rendered_path = self.renderer.render_path(&descriptor.path, &run.context)?;
        let (path, content) = if descriptor.is_template {
            let content = self.renderer.render_content(&raw, &run.context, &descriptor.path)?;
            (strip_template_suffix(rendered_path), content)
        } else {
            (rendered_path, raw)
        };

        tracing::debug!("Emitting {}", path);
        Ok(Some(GeneratedFile {
            path,
            content,
            is_template: descriptor.is_template,
            mode: descriptor.mode,
        }))
    }
}

/// Drop a trailing `.hbs`, unless that would leave no file name.
fn strip_template_suffix(path: String) -> String {
    match path.strip_suffix(TEMPLATE_SUFFIX) {
        Some(stripped) if !stripped.is_empty() && !stripped.ends_with('/') => stripped.to_string(),
        _ => path,
    }
}
