//! Configuration management for QAGen
//!
//! Two documents configure a run:
//!
//! 1. **Global configuration** (`~/.qagen/config.toml`) - pack root, cache tuning and
//!    generation defaults, see [`GlobalConfig`]
//! 2. **Project configuration** - the user's selections, passed per invocation, see
//!    [`ProjectConfig`](crate::project::ProjectConfig)
//!
//! Command-line flags take precedence over the global configuration:
//!
//! | Setting            | Global key          | Flag            |
//! |--------------------|---------------------|-----------------|
//! | pack root          | `packs_dir`         | `--packs-dir`   |
//! | missing templates  | `strict`            | `--lenient`     |
//! | config location    | -                   | `--config`      |

pub mod global;

pub use global::GlobalConfig;
