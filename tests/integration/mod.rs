//! Integration test suite for QAGen
//!
//! End-to-end tests over on-disk template packs: the library pipeline driven
//! directly, and the `qagen` binary driven through `assert_cmd`.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **common**: Pack fixtures and command helpers shared by the suites
//! - **pipeline**: Streaming generation, CI/CD syntax preservation, shared engines
//! - **generate_cmd**: `qagen generate` into archives and directories
//! - **inspect_cmds**: `qagen preview`, `qagen deps` and `qagen packs`

mod common;

mod generate_cmd;
mod inspect_cmds;
mod pipeline;
