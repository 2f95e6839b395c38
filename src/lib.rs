//! QAGen - Template Pack Engine for QA test-automation projects
//!
//! QAGen turns a declarative project configuration (testing type, language, framework,
//! test runner, build tool, CI/CD and reporting tools, optional utilities) into a
//! ready-to-run project skeleton. The heavy lifting happens in the template pack
//! engine: it selects the pack that matches the configuration, builds a rendering
//! context, decides per file whether it ships, renders paths and contents with Tera,
//! and streams the result one file at a time to an archive writer or previewer.
//!
//! # Architecture Overview
//!
//! Data flows in one direction:
//!
//! ```text
//! ProjectConfig -> PackKey -> Manifest -> (Context, FileDescriptors)
//!               -> selected descriptors -> GeneratedFile stream -> sink
//! ```
//!
//! - A *pack* lives in a directory named after its [`project::PackKey`] and contains a
//!   `manifest.json` plus a `templates/` tree
//! - Pack manifests are cached process-wide in an explicitly constructed
//!   [`cache::TtlCache`] with time-based eviction
//! - CI/CD pipeline files keep their own `${...}`, `${{...}}` and
//!   `<< parameters.* >>` syntax through rendering
//!
//! # Core Modules
//!
//! ## Engine
//! - [`project`] - Project configuration, pack keys and the dotted-key query view
//! - [`catalog`] - Shared tool version catalog and per-pack overrides
//! - [`pack`] - Pack manifests, pack stores and the cache-aside pack resolver
//! - [`selector`] - Sample-test classification and conditional file inclusion
//! - [`templating`] - Context builder, foreign-syntax masking and the Tera renderer
//! - [`generator`] - Streaming and batch generation pipeline
//! - [`dependencies`] - Per-configuration dependency list for display
//!
//! ## Supporting Modules
//! - [`cache`] - TTL key/value cache for manifests
//! - [`archive`] - ZIP and directory sinks consuming the generated file stream
//! - [`config`] - Global configuration (`~/.qagen/config.toml`)
//! - [`core`] - Error types and user-friendly error reporting
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use qagen_cli::cache::TtlCache;
//! use qagen_cli::generator::{GenerateOptions, Generator};
//! use qagen_cli::pack::{DirectoryPackStore, PackResolver};
//! use qagen_cli::project::ProjectConfig;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example(config: ProjectConfig) -> anyhow::Result<()> {
//! let store = DirectoryPackStore::new("packs");
//! let cache: Arc<TtlCache> = Arc::new(TtlCache::new());
//! let resolver = PackResolver::new(store, cache, Duration::from_secs(3600));
//! let generator = Generator::new(resolver, GenerateOptions::default());
//!
//! let files = generator.generate_all(&config).await?;
//! for file in &files {
//!     println!("{}", file.path);
//! }
//! # Ok(())
//! # }
//! ```

// Engine modules
pub mod catalog;
pub mod dependencies;
pub mod generator;
pub mod pack;
pub mod project;
pub mod selector;
pub mod templating;

// Supporting modules
pub mod archive;
pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
