//! Core types and functionality for QAGen
//!
//! This module holds the error taxonomy shared by every engine component:
//!
//! - [`error`] - [`QagenError`], [`ErrorContext`] and [`user_friendly_error`]
//! - [`file_error`] - File operation errors that remember the path and purpose

pub mod error;
pub mod file_error;

pub use error::{ErrorContext, QagenError, user_friendly_error};
pub use file_error::{FileOperation, FileOperationError, FileResultExt};
