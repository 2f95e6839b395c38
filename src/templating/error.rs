//! Structured template errors.
//!
//! The renderer turns raw Tera failures into a [`TemplateError`] before attaching the
//! file path, so users see which variable was unknown, where, and what they probably
//! meant instead of Tera's internal one-off template names.

use thiserror::Error;

use crate::core::QagenError;

/// Failure while rendering a template path or template content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A variable referenced by the template is not in the context
    #[error("variable '{variable}' not found in context")]
    VariableNotFound {
        /// Variable as written in the template
        variable: String,
        /// Close matches among the context variables
        suggestions: Vec<String>,
        /// Line reported by Tera, if any
        line: Option<usize>,
    },

    /// Parse or evaluation error other than an unknown variable
    #[error("{message}")]
    SyntaxError {
        /// Cleaned-up Tera message chain
        message: String,
        /// Line reported by Tera, if any
        line: Option<usize>,
    },

    /// A rendered output path is absolute or climbs out of the project root
    #[error("rendered path '{rendered}' escapes the project root")]
    UnsafePath {
        /// The offending rendered path
        rendered: String,
    },
}

impl TemplateError {
    /// Line number reported by the template engine.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::VariableNotFound {
                line,
                ..
            }
            | Self::SyntaxError {
                line,
                ..
            } => *line,
            Self::UnsafePath {
                ..
            } => None,
        }
    }

    /// One-paragraph description including line and suggestions.
    #[must_use]
    pub fn format_with_context(&self) -> String {
        let mut msg = self.to_string();

        if let Some(line) = self.line() {
            msg.push_str(&format!(" (line {line})"));
        }

        if let Self::VariableNotFound {
            suggestions,
            ..
        } = self
            && !suggestions.is_empty()
        {
            msg.push_str(&format!("; did you mean {}?", suggestions.join(", ")));
        }
        msg
    }

    /// Attach the template path, producing the engine-level error.
    #[must_use]
    pub fn at(self, path: &str) -> QagenError {
        QagenError::RenderError {
            path: path.to_string(),
            cause: self.format_with_context(),
        }
    }
}
