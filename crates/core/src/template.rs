//! Placeholder extraction and rendering for template content.
//!
//! Template text uses two placeholder forms:
//!
//! - `{variable}`: a plain variable, filled from user-supplied values
//!   at execution time.
//! - `{{tag}}`: a snippet insert, resolved from the library of snippets
//!   carrying that tag.
//!
//! Extraction returns names in first-occurrence order with no duplicates.
//! Empty (`{}`) and whitespace-only placeholder names are never treated as
//! placeholders: they pass through rendering as literal text. Unterminated
//! braces are likewise left alone; no error is raised for malformed forms.
//!
//! Everything here is a pure function over strings.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Reserved variable carrying the previous workflow step's rendered output.
pub const PREVIOUS_OUTPUT_VAR: &str = "previous_output";

/// Matches both placeholder forms in one left-to-right pass. The `{{tag}}`
/// alternative comes first so a double brace is never consumed as a plain
/// variable whose name starts with `{`.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]*)\}\}|\{([^{}]*)\}").unwrap());

/// Errors raised while rendering template content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// A `{variable}` placeholder had no supplied value.
    #[error("No value supplied for variable '{0}'")]
    MissingVariable(String),

    /// A `{{tag}}` placeholder referenced a tag no snippet carries.
    #[error("No snippet found for tag '{0}'")]
    UnknownSnippet(String),
}

/// Extract plain `{variable}` names from `content`.
///
/// Returns unique names in first-occurrence order. `{{tag}}` forms are
/// skipped, as are empty and whitespace-only names.
pub fn extract_variables(content: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for caps in PLACEHOLDER_RE.captures_iter(content) {
        // Group 1 is a snippet tag; only group 2 is a plain variable.
        if let Some(name) = caps.get(2) {
            let name = name.as_str();
            if name.trim().is_empty() {
                continue;
            }
            if seen.insert(name.to_string()) {
                out.push(name.to_string());
            }
        }
    }
    out
}

/// Extract `{{tag}}` snippet references from `content`.
///
/// Returns unique tags in first-occurrence order, skipping empty names.
pub fn extract_snippet_tags(content: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for caps in PLACEHOLDER_RE.captures_iter(content) {
        if let Some(tag) = caps.get(1) {
            let tag = tag.as_str();
            if tag.trim().is_empty() {
                continue;
            }
            if seen.insert(tag.to_string()) {
                out.push(tag.to_string());
            }
        }
    }
    out
}

/// Substitute snippet tags and variables into `content`.
///
/// Snippet tags resolve from `snippets` (tag → snippet content), then
/// variables resolve from `values`. Snippet content is inserted verbatim;
/// placeholders inside snippet content are not re-expanded (matching how
/// the editor inserts snippets as finished text).
///
/// Fails on the first variable without a value or tag without a snippet.
/// Empty/whitespace placeholder names are copied through unchanged.
pub fn render(
    content: &str,
    values: &HashMap<String, String>,
    snippets: &HashMap<String, String>,
) -> Result<String, RenderError> {
    let mut error: Option<RenderError> = None;
    let rendered = PLACEHOLDER_RE.replace_all(content, |caps: &regex::Captures<'_>| {
        if error.is_some() {
            return caps[0].to_string();
        }
        if let Some(tag) = caps.get(1) {
            let tag = tag.as_str();
            if tag.trim().is_empty() {
                return caps[0].to_string();
            }
            match snippets.get(tag) {
                Some(body) => body.clone(),
                None => {
                    error = Some(RenderError::UnknownSnippet(tag.to_string()));
                    caps[0].to_string()
                }
            }
        } else {
            let name = &caps[2];
            if name.trim().is_empty() {
                return caps[0].to_string();
            }
            match values.get(name) {
                Some(value) => value.clone(),
                None => {
                    error = Some(RenderError::MissingVariable(name.to_string()));
                    caps[0].to_string()
                }
            }
        }
    });
    match error {
        Some(e) => Err(e),
        None => Ok(rendered.into_owned()),
    }
}

/* --------------------------------------------------------------------------
   Tests
   -------------------------------------------------------------------------- */
