//! Template rendering engine with Tera.
//!
//! [`TemplateRenderer`] renders both descriptor paths and file contents against a
//! [`TemplateContext`]. Content goes through [`masking`](super::masking) first so
//! raw blocks and CI/CD interpolation survive untouched.

use regex::Regex;
use std::sync::OnceLock;
use strsim::levenshtein;
use tera::Tera;

use super::context::TemplateContext;
use super::error::TemplateError;
use super::masking::{classify_pipeline, mask};
use crate::core::QagenError;

/// Maximum allowed Levenshtein distance as a percentage of target length for suggestions.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Tera-backed renderer for pack paths and contents.
///
/// A fresh Tera instance is created per render with autoescaping disabled, so the
/// renderer holds no mutable state and can be shared across tasks.
#[derive(Debug, Clone, Copy)]
pub struct TemplateRenderer {
    /// Whether templating is enabled globally
    enabled: bool,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TemplateRenderer {
    /// Create a renderer; a disabled renderer returns every input verbatim.
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self {
            enabled,
        }
    }

    /// Render a descriptor path into an output path.
    ///
    /// The result uses `/` separators and must stay inside the project root.
    ///
    /// # Errors
    ///
    /// [`QagenError::RenderError`] naming `template` if rendering fails or the
    /// rendered path is empty, absolute or contains a `..` segment.
    pub fn render_path(
        &self,
        template: &str,
        context: &TemplateContext,
    ) -> Result<String, QagenError> {
        let rendered = if self.enabled {
            self.render_str(template, context).map_err(|e| e.at(template))?
        } else {
            template.to_string()
        };

        normalize_output_path(&rendered).ok_or_else(|| {
            TemplateError::UnsafePath {
                rendered,
            }
            .at(template)
        })
    }

    /// Render file content; `path` selects CI/CD masking and names the file in errors.
    ///
    /// # Errors
    ///
    /// [`QagenError::RenderError`] with the template path attached. Nothing is
    /// returned for a file that fails part-way.
    pub fn render_content(
        &self,
        content: &str,
        context: &TemplateContext,
        path: &str,
    ) -> Result<String, QagenError> {
        if !self.enabled {
            tracing::debug!("Templating disabled, returning {} as-is", path);
            return Ok(content.to_string());
        }

        let pipeline = classify_pipeline(path);
        if let Some(kind) = pipeline {
            tracing::debug!("Masking {:?} syntax in {}", kind, path);
        }

        let masked = mask(content, pipeline);
        let rendered = self.render_str(masked.text(), context).map_err(|e| e.at(path))?;
        Ok(masked.restore(&rendered))
    }

    fn render_str(&self, template: &str, context: &TemplateContext) -> Result<String, TemplateError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);

        tera.render_str(template, &context.to_tera())
            .map_err(|e| Self::parse_tera_error(&e, context))
    }

    /// Parse a Tera error into a structured TemplateError
    fn parse_tera_error(error: &tera::Error, context: &TemplateContext) -> TemplateError {
        let line = Self::extract_line_from_tera_error(error);

        let variable = error_chain(error).iter().find_map(|msg| Self::extract_variable_name(msg));
        if let Some(variable) = variable {
            let suggestions = Self::find_similar_variables(&variable, &context.variable_names());
            return TemplateError::VariableNotFound {
                variable,
                suggestions,
                line,
            };
        }

        TemplateError::SyntaxError {
            message: Self::format_tera_error(error),
            line,
        }
    }

    /// Extract variable name from "Variable `foo` not found" message
    fn extract_variable_name(error_msg: &str) -> Option<String> {
        variable_regexes().iter().find_map(|re| {
            re.captures(error_msg).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_string())
        })
    }

    /// Find similar variable names using Levenshtein distance
    fn find_similar_variables(target: &str, available: &[String]) -> Vec<String> {
        let mut scored: Vec<_> =
            available.iter().map(|var| (var.clone(), levenshtein(target, var))).collect();

        // Closest first, ties broken by name
        scored.sort_by(|(a, da), (b, db)| da.cmp(db).then_with(|| a.cmp(b)));

        scored
            .into_iter()
            .filter(|(_, dist)| *dist <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
            .take(3)
            .map(|(var, _)| var)
            .collect()
    }

    /// Extract line number from Tera error message
    ///
    /// Parse errors carry a ` --> line:column` marker; render errors carry none.
    fn extract_line_from_tera_error(error: &tera::Error) -> Option<usize> {
        let re = position_regex()?;
        error_chain(error).iter().find_map(|msg| {
            re.captures(msg)?.get(1)?.as_str().parse::<usize>().ok()
        })
    }

    /// Format a Tera error with detailed information about what went wrong.
    ///
    /// Walks the error chain, drops Tera's internal one-off template name and
    /// returns the remaining messages joined root-last.
    pub fn format_tera_error(error: &tera::Error) -> String {
        let messages: Vec<String> = error_chain(error)
            .into_iter()
            .map(|msg| {
                msg.replace("while rendering '__tera_one_off'", "")
                    .replace("Failed to render '__tera_one_off'", "Template rendering failed")
                    .replace("Failed to parse '__tera_one_off'", "Template syntax error")
                    .replace("'__tera_one_off'", "template")
                    .trim()
                    .to_string()
            })
            .filter(|cleaned| {
                !cleaned.is_empty()
                    && cleaned != "Template rendering failed"
                    && cleaned != "Template syntax error"
            })
            .collect();

        if messages.is_empty() {
            "Template syntax error".to_string()
        } else {
            messages.join(" -> ")
        }
    }
}

fn variable_regexes() -> &'static [Regex] {
    static REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();
    REGEXES.get_or_init(|| {
        [r"Variable `([^`]+)` not found", r"Unknown variable `([^`]+)`"]
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect()
    })
}

fn position_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"-->\s*(\d+):(\d+)").ok()).as_ref()
}

fn error_chain(error: &tera::Error) -> Vec<String> {
    use std::error::Error;

    let mut messages = vec![error.to_string()];
    let mut current: Option<&dyn Error> = error.source();
    while let Some(err) = current {
        messages.push(err.to_string());
        current = err.source();
    }
    messages
}

/// Forward-slash relative path inside the project root, `None` if it escapes.
fn normalize_output_path(rendered: &str) -> Option<String> {
    let unified = rendered.trim().replace('\\', "/");
    if unified.starts_with('/') || unified.get(1..2) == Some(":") {
        return None;
    }

    let mut segments = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            other => segments.push(other),
        }
    }

    (!segments.is_empty()).then(|| segments.join("/"))
}
