//! Error handling for QAGen
//!
//! This module provides the error taxonomy of the template pack engine and the
//! user-friendly error reporting used by the CLI. The error system follows two rules:
//! 1. **Strongly-typed errors** so callers can tell a missing pack from a broken template
//! 2. **Diagnosable messages** that always name the pack or file being processed
//!
//! # Error Categories
//!
//! - **Pack resolution**: [`QagenError::PackNotFound`], [`QagenError::ManifestParseError`]
//! - **Generation**: [`QagenError::TemplateFileMissing`], [`QagenError::RenderError`],
//!   [`QagenError::EmptyProject`]
//! - **Cache**: [`QagenError::CacheUnavailable`] (soft failure, resolvers fall back to the store)
//! - **Configuration and I/O**: [`QagenError::ConfigError`], [`QagenError::FileSystemError`],
//!   [`QagenError::IoError`]
//!
//! The pure parts of the engine (classifier, selector, context builder) are total
//! functions and never produce errors.
//!
//! # Examples
//!
//! ```rust,no_run
//! use qagen_cli::core::{QagenError, user_friendly_error};
//!
//! let error = QagenError::PackNotFound {
//!     pack: "web-java-selenium-testng-maven".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for QAGen operations
///
/// Every variant produced by an I/O-touching component carries the pack key or the
/// file path that was being processed when the failure happened.
#[derive(Error, Debug)]
pub enum QagenError {
    /// No manifest exists for the pack key derived from a configuration
    ///
    /// Non-retriable: the configuration names a combination no pack supports.
    #[error("No template pack found for '{pack}'")]
    PackNotFound {
        /// The pack key that was looked up
        pack: String,
    },

    /// A file declared in the manifest is missing from the pack's template tree
    #[error("Template file '{path}' declared by pack '{pack}' does not exist")]
    TemplateFileMissing {
        /// Pack the descriptor belongs to
        pack: String,
        /// Declared template path of the missing file
        path: String,
    },

    /// Template compilation or execution failed
    #[error("Failed to render template '{path}': {cause}")]
    RenderError {
        /// Template path (or rendered path template) being processed
        path: String,
        /// Formatted cause reported by the template engine
        cause: String,
    },

    /// The cache collaborator failed; callers treat this as a soft failure
    #[error("Manifest cache unavailable: {reason}")]
    CacheUnavailable {
        /// Why the cache could not serve the request
        reason: String,
    },

    /// A generation run finished without producing a single file
    #[error("Template pack '{pack}' produced no files for this configuration")]
    EmptyProject {
        /// Pack key that was generated
        pack: String,
    },

    /// Manifest or catalog document could not be parsed
    #[error("Invalid manifest document {file}")]
    ManifestParseError {
        /// Path to the document that failed to parse
        file: String,
        /// Specific reason for the parsing failure
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// File system error
    #[error("File system error: {operation}")]
    FileSystemError {
        /// The file system operation that failed
        operation: String,
        /// Path where the file system error occurred
        path: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for QagenError {
    fn clone(&self) -> Self {
        match self {
            Self::PackNotFound {
                pack,
            } => Self::PackNotFound {
                pack: pack.clone(),
            },
            Self::TemplateFileMissing {
                pack,
                path,
            } => Self::TemplateFileMissing {
                pack: pack.clone(),
                path: path.clone(),
            },
            Self::RenderError {
                path,
                cause,
            } => Self::RenderError {
                path: path.clone(),
                cause: cause.clone(),
            },
            Self::CacheUnavailable {
                reason,
            } => Self::CacheUnavailable {
                reason: reason.clone(),
            },
            Self::EmptyProject {
                pack,
            } => Self::EmptyProject {
                pack: pack.clone(),
            },
            Self::ManifestParseError {
                file,
                reason,
            } => Self::ManifestParseError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            Self::FileSystemError {
                operation,
                path,
            } => Self::FileSystemError {
                operation: operation.clone(),
                path: path.clone(),
            },
            // io::Error is not Clone; keep the kind and message
            Self::IoError(e) => Self::IoError(std::io::Error::new(e.kind(), e.to_string())),
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

impl QagenError {
    /// Whether the error aborts a generation run in lenient mode as well.
    ///
    /// Only missing template files are recoverable; everything else is fatal.
    #[must_use]
    pub const fn is_fatal_in_lenient_mode(&self) -> bool {
        !matches!(self, Self::TemplateFileMissing { .. })
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// Wraps a [`QagenError`] with an optional suggestion and optional details for CLI
/// display.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying QAGen error
    pub error: QagenError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`QagenError`]
    #[must_use]
    pub const fn new(error: QagenError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`QagenError`] anywhere in the error chain, [`std::io::Error`] and
/// configuration parse errors. Anything else is reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    // Commands wrap engine errors in context; look through the whole chain
    if let Some(qagen_error) = error.chain().find_map(|e| e.downcast_ref::<QagenError>()) {
        let ctx = create_error_context(qagen_error.clone());
        if ctx.details.is_none() && error.chain().count() > 1 {
            return ctx.with_details(format_chain(&error));
        }
        return ctx;
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(QagenError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check file ownership and permissions of the pack root and output path")
                .with_details("QAGen could not read a pack file or write the generated project");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(QagenError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            std::io::ErrorKind::AlreadyExists => {
                return ErrorContext::new(QagenError::FileSystemError {
                    operation: "file creation".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Remove the existing output or use --force to overwrite");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(QagenError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax of the configuration file");
    }

    ErrorContext::new(QagenError::Other {
        message: format_chain(&error),
    })
}

/// Render an error and its causes as a numbered chain.
fn format_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }
    message
}

/// Map each [`QagenError`] variant to a tailored suggestion
fn create_error_context(error: QagenError) -> ErrorContext {
    match &error {
        QagenError::PackNotFound { pack } => {
            let details = format!(
                "Pack keys are built as testingType-language-framework-testRunner-buildTool; '{pack}' has no matching pack directory"
            );
            ErrorContext::new(error)
                .with_suggestion("Run 'qagen packs' to list the supported combinations")
                .with_details(details)
        }

        QagenError::TemplateFileMissing { .. } => ErrorContext::new(error)
            .with_suggestion("Restore the file in the pack's templates/ directory, or run with --lenient to skip it")
            .with_details("The manifest declares a file the pack does not contain"),

        QagenError::RenderError { .. } => ErrorContext::new(error)
            .with_suggestion(
                "Check template syntax: variables use {{ var }}, control flow uses {% %}. \
                 Wrap literal examples in {{{{raw}}}}...{{{{/raw}}}}",
            ),

        QagenError::EmptyProject { .. } => ErrorContext::new(error)
            .with_suggestion("Enable sample tests or set empty_pack_policy = \"allow\" in the global config"),

        QagenError::ManifestParseError { reason, .. } => {
            let details = reason.clone();
            ErrorContext::new(error)
                .with_suggestion("Validate the manifest JSON against the pack format")
                .with_details(details)
        }

        QagenError::FileSystemError { path, .. } => {
            let details = format!("Path: {path}");
            ErrorContext::new(error).with_details(details)
        }

        _ => ErrorContext::new(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = QagenError::PackNotFound {
            pack: "web-java-selenium-testng-maven".to_string(),
        };
        assert_eq!(error.to_string(), "No template pack found for 'web-java-selenium-testng-maven'");

        let error = QagenError::RenderError {
            path: "README.md.hbs".to_string(),
            cause: "unexpected end".to_string(),
        };
        assert_eq!(error.to_string(), "Failed to render template 'README.md.hbs': unexpected end");
    }

    #[test]
    fn test_error_clone() {
        let error = QagenError::TemplateFileMissing {
            pack: "p".to_string(),
            path: "a.txt".to_string(),
        };
        assert_eq!(error.clone().to_string(), error.to_string());

        let io = QagenError::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.clone().to_string(), io.to_string());
    }

    #[test]
    fn test_lenient_fatality() {
        assert!(
            !QagenError::TemplateFileMissing {
                pack: "p".to_string(),
                path: "a".to_string(),
            }
            .is_fatal_in_lenient_mode()
        );
        assert!(
            QagenError::RenderError {
                path: "a".to_string(),
                cause: "b".to_string(),
            }
            .is_fatal_in_lenient_mode()
        );
    }

    #[test]
    fn test_user_friendly_error_finds_wrapped_error() {
        let error = anyhow::Error::from(QagenError::PackNotFound {
            pack: "x".to_string(),
        })
        .context("Failed to generate project");

        let ctx = user_friendly_error(error);
        assert!(matches!(ctx.error, QagenError::PackNotFound { .. }));
        assert!(ctx.suggestion.unwrap().contains("qagen packs"));
    }

    #[test]
    fn test_user_friendly_error_generic() {
        let ctx = user_friendly_error(anyhow::anyhow!("Something went wrong"));
        match ctx.error {
            QagenError::Other {
                message,
            } => assert_eq!(message, "Something went wrong"),
            _ => panic!("Expected Other error"),
        }
    }

    #[test]
    fn test_error_context_display() {
        let ctx = ErrorContext::new(QagenError::ConfigError {
            message: "bad".to_string(),
        })
        .with_suggestion("fix it");

        let display = format!("{ctx}");
        assert!(display.contains("Configuration error: bad"));
        assert!(display.contains("Suggestion: fix it"));
    }
}
