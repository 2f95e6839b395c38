//! Protection of foreign template syntax.
//!
//! Pack files are Tera templates, but many of them are themselves written in a
//! language with its own interpolation syntax: CI/CD pipelines use `${{ ... }}`
//! (GitHub Actions, Azure Pipelines), `${...}` (Jenkins, GitLab, shell) and
//! `<< parameters.* >>` (CircleCI). Left alone, Tera would try to evaluate them.
//!
//! Masking is a two-pass tokenizer:
//!
//! 1. [`mask`] extracts raw blocks (`{{{{raw}}}}...{{{{/raw}}}}` and
//!    `{{raw}}...{{/raw}}`) into an index-addressed table, replacing them with
//!    numbered placeholders, then swaps the delimiters of foreign expressions in
//!    pipeline files for inert markers, keeping the inner text
//! 2. [`MaskedTemplate::restore`] puts every raw block back by index and turns the
//!    markers back into the literal delimiters
//!
//! Rendering `mask(x)` with a context that touches none of the protected spans and
//! restoring the result yields the protected spans byte for byte.

use regex::Regex;
use std::sync::OnceLock;

use crate::constants::TEMPLATE_SUFFIX;

const GHA_OPEN: &str = "__QAGEN_GHA_OPEN__";
const GHA_CLOSE: &str = "__QAGEN_GHA_CLOSE__";
const JENKINS_OPEN: &str = "__QAGEN_JENKINS_OPEN__";
const JENKINS_CLOSE: &str = "__QAGEN_JENKINS_CLOSE__";
const PARAM_OPEN: &str = "__QAGEN_PARAM_OPEN__";
const PARAM_CLOSE: &str = "__QAGEN_PARAM_CLOSE__";

/// Raw block spellings, longest first.
const RAW_SPELLINGS: [(&str, &str); 2] =
    [("{{{{raw}}}}", "{{{{/raw}}}}"), ("{{raw}}", "{{/raw}}")];

/// CI/CD system a pack file belongs to, detected from its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineKind {
    /// `Jenkinsfile`
    Jenkins,
    /// `.github/workflows/*.yml` or `*.yaml`
    GitHubActions,
    /// `azure-pipelines.yml`
    AzurePipelines,
    /// `.gitlab-ci.yml`
    GitLabCi,
    /// `.circleci/config.yml`
    CircleCi,
}

/// Detect the CI/CD class of a path; the `.hbs` template suffix is ignored.
///
/// # Examples
///
/// ```
/// use qagen_cli::templating::masking::{PipelineKind, classify_pipeline};
///
/// assert_eq!(classify_pipeline("Jenkinsfile.hbs"), Some(PipelineKind::Jenkins));
/// assert_eq!(
///     classify_pipeline(".github/workflows/ci.yml"),
///     Some(PipelineKind::GitHubActions)
/// );
/// assert_eq!(classify_pipeline("src/main.yml"), None);
/// ```
#[must_use]
pub fn classify_pipeline(path: &str) -> Option<PipelineKind> {
    let path = path.strip_suffix(TEMPLATE_SUFFIX).unwrap_or(path).replace('\\', "/");
    let rooted = format!("/{}", path.trim_start_matches('/'));
    let file_name = rooted.rsplit('/').next().unwrap_or_default();

    if file_name == "Jenkinsfile" {
        Some(PipelineKind::Jenkins)
    } else if rooted.contains("/.github/workflows/")
        && (file_name.ends_with(".yml") || file_name.ends_with(".yaml"))
    {
        Some(PipelineKind::GitHubActions)
    } else if file_name == "azure-pipelines.yml" {
        Some(PipelineKind::AzurePipelines)
    } else if file_name == ".gitlab-ci.yml" {
        Some(PipelineKind::GitLabCi)
    } else if rooted.ends_with("/.circleci/config.yml") {
        Some(PipelineKind::CircleCi)
    } else {
        None
    }
}

/// Template text with protected spans swapped out, plus the table to restore them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedTemplate {
    text: String,
    raw_blocks: Vec<String>,
}

impl MaskedTemplate {
    /// Text to hand to the template engine.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of raw blocks extracted.
    #[must_use]
    pub fn raw_block_count(&self) -> usize {
        self.raw_blocks.len()
    }

    /// Restore raw blocks by index, then reverse the delimiter markers.
    #[must_use]
    pub fn restore(&self, rendered: &str) -> String {
        let mut restored = rendered.to_string();
        for (index, block) in self.raw_blocks.iter().enumerate() {
            restored = restored.replace(&raw_placeholder(index), block);
        }

        restored
            .replace(GHA_OPEN, "${{")
            .replace(GHA_CLOSE, "}}")
            .replace(JENKINS_OPEN, "${")
            .replace(JENKINS_CLOSE, "}")
            .replace(PARAM_OPEN, "<<")
            .replace(PARAM_CLOSE, ">>")
    }
}

/// Protect raw blocks and, for pipeline files, foreign interpolation syntax.
#[must_use]
pub fn mask(content: &str, pipeline: Option<PipelineKind>) -> MaskedTemplate {
    let mut raw_blocks = Vec::new();
    let mut text = extract_raw_blocks(content, &mut raw_blocks);

    if let Some(kind) = pipeline {
        text = mask_dollar_expressions(&text);
        if kind == PipelineKind::CircleCi {
            text = mask_circleci_parameters(&text);
        }
    }

    if !raw_blocks.is_empty() {
        tracing::debug!("Protected {} raw block(s)", raw_blocks.len());
    }
    MaskedTemplate {
        text,
        raw_blocks,
    }
}

fn raw_placeholder(index: usize) -> String {
    format!("__QAGEN_RAW_{index}__")
}

fn extract_raw_blocks(content: &str, blocks: &mut Vec<String>) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    loop {
        // Earliest opener wins; on a tie the longer spelling does
        let next = RAW_SPELLINGS
            .iter()
            .filter_map(|&(open, close)| rest.find(open).map(|at| (at, open, close)))
            .min_by_key(|&(at, open, _)| (at, std::cmp::Reverse(open.len())));

        let Some((start, open, close)) = next else {
            break;
        };
        let body_start = start + open.len();

        let Some(body_len) = rest[body_start..].find(close) else {
            tracing::warn!("Unterminated raw block opener '{}' left as-is", open);
            out.push_str(&rest[..body_start]);
            rest = &rest[body_start..];
            continue;
        };

        out.push_str(&rest[..start]);
        out.push_str(&raw_placeholder(blocks.len()));
        blocks.push(rest[body_start..body_start + body_len].to_string());
        rest = &rest[body_start + body_len + close.len()..];
    }

    out.push_str(rest);
    out
}

/// Mask `${{ X }}` and `${X}`, trying the longer form first at every position.
fn mask_dollar_expressions(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let expr = &rest[start..];

        if let Some(inner) = expr.strip_prefix("${{")
            && let Some(end) = inner.find("}}")
        {
            out.push_str(GHA_OPEN);
            out.push_str(&inner[..end]);
            out.push_str(GHA_CLOSE);
            rest = &inner[end + 2..];
        } else if let Some(end) = matching_brace(&expr[2..]) {
            out.push_str(JENKINS_OPEN);
            out.push_str(&expr[2..2 + end]);
            out.push_str(JENKINS_CLOSE);
            rest = &expr[2 + end + 1..];
        } else {
            out.push_str("${");
            rest = &expr[2..];
        }
    }

    out.push_str(rest);
    out
}

/// Byte offset of the `}` closing an already opened brace.
fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (offset, ch) in text.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(offset);
                }
            }
            _ => {}
        }
    }
    None
}

fn circleci_parameter_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    REGEX
        .get_or_init(|| Regex::new(r"<<(\s*(?:parameters|pipeline)\.[A-Za-z0-9_.-]+\s*)>>").ok())
        .as_ref()
}

fn mask_circleci_parameters(text: &str) -> String {
    match circleci_parameter_regex() {
        Some(re) => re.replace_all(text, format!("{PARAM_OPEN}${{1}}{PARAM_CLOSE}")).into_owned(),
        None => text.to_string(),
    }
}
