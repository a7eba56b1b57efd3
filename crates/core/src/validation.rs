//! Shared validation limits and checks for templates, workflows, snippets,
//! and folders.
//!
//! These are the server-side equivalent of the request schemas the SPA
//! relies on: every create/update handler funnels its input through the
//! functions here before touching the database.

use crate::error::CoreError;

/* --------------------------------------------------------------------------
   Item type constants
   -------------------------------------------------------------------------- */

/// Item type for templates in junction tables.
pub const ITEM_TYPE_TEMPLATE: &str = "template";

/// Item type for workflows in junction tables.
pub const ITEM_TYPE_WORKFLOW: &str = "workflow";

/// Item type for snippets in junction tables.
pub const ITEM_TYPE_SNIPPET: &str = "snippet";

/// All valid item types for folder associations and favorites.
pub const VALID_ITEM_TYPES: &[&str] =
    &[ITEM_TYPE_TEMPLATE, ITEM_TYPE_WORKFLOW, ITEM_TYPE_SNIPPET];

/// All valid collapsible header sections persisted in UI state.
pub const VALID_HEADER_TYPES: &[&str] = &["templates", "workflows", "snippets", "favorites"];

/// Default category applied when a template/workflow omits one.
pub const DEFAULT_CATEGORY: &str = "general";

/* --------------------------------------------------------------------------
   Validation limits
   -------------------------------------------------------------------------- */

/// Maximum length for an entity name (templates, workflows, snippets, folders).
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length for a description.
pub const MAX_DESCRIPTION_LEN: usize = 5000;

/// Maximum length for template/snippet content.
pub const MAX_CONTENT_LEN: usize = 100_000;

/// Maximum length for a single snippet tag.
pub const MAX_TAG_LEN: usize = 50;

/// Maximum number of tags on a snippet.
pub const MAX_TAGS: usize = 20;

/* --------------------------------------------------------------------------
   Validation functions
   -------------------------------------------------------------------------- */

/// Validate an entity name: non-empty after trimming, within length limits.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("name must not be empty".into()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "name too long ({} chars, max {MAX_NAME_LEN})",
            name.len()
        )));
    }
    Ok(())
}

/// Validate an optional description length.
pub fn validate_description(description: Option<&str>) -> Result<(), CoreError> {
    if let Some(d) = description {
        if d.len() > MAX_DESCRIPTION_LEN {
            return Err(CoreError::Validation(format!(
                "description too long ({} chars, max {MAX_DESCRIPTION_LEN})",
                d.len()
            )));
        }
    }
    Ok(())
}

/// Validate template/snippet content length.
pub fn validate_content(content: &str) -> Result<(), CoreError> {
    if content.len() > MAX_CONTENT_LEN {
        return Err(CoreError::Validation(format!(
            "content too long ({} chars, max {MAX_CONTENT_LEN})",
            content.len()
        )));
    }
    Ok(())
}

/// Validate and normalize snippet tags: trim, lowercase, drop empties,
/// de-duplicate preserving first occurrence.
pub fn normalize_tags(tags: &[String]) -> Result<Vec<String>, CoreError> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() {
            continue;
        }
        if tag.len() > MAX_TAG_LEN {
            return Err(CoreError::Validation(format!(
                "tag '{tag}' too long (max {MAX_TAG_LEN} chars)"
            )));
        }
        if seen.insert(tag.clone()) {
            out.push(tag);
        }
    }
    if out.len() > MAX_TAGS {
        return Err(CoreError::Validation(format!(
            "too many tags ({}, max {MAX_TAGS})",
            out.len()
        )));
    }
    Ok(out)
}

/// Validate an item type for folder associations / favorites.
pub fn validate_item_type(item_type: &str) -> Result<(), CoreError> {
    if VALID_ITEM_TYPES.contains(&item_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid item_type '{item_type}'. Must be one of: {}",
            VALID_ITEM_TYPES.join(", ")
        )))
    }
}

/// Validate a collapsible header type for UI state persistence.
pub fn validate_header_type(header_type: &str) -> Result<(), CoreError> {
    if VALID_HEADER_TYPES.contains(&header_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid header_type '{header_type}'. Must be one of: {}",
            VALID_HEADER_TYPES.join(", ")
        )))
    }
}

/* --------------------------------------------------------------------------
   Tests
   -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    // --- Name validation ---

    #[test]
    fn validate_name_accepts_valid() {
        assert!(validate_name("Cold Outreach Email").is_ok());
    }

    #[test]
    fn validate_name_rejects_empty_and_whitespace() {
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
    }

    #[test]
    fn validate_name_rejects_too_long() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        let err = validate_name(&long).unwrap_err();
        assert!(err.to_string().contains("too long"));
    }

    // --- Description / content ---

    #[test]
    fn validate_description_allows_none_and_limits_length() {
        assert!(validate_description(None).is_ok());
        assert!(validate_description(Some("short")).is_ok());
        let long = "x".repeat(MAX_DESCRIPTION_LEN + 1);
        assert!(validate_description(Some(&long)).is_err());
    }

    #[test]
    fn validate_content_rejects_oversize() {
        let long = "x".repeat(MAX_CONTENT_LEN + 1);
        assert!(validate_content(&long).is_err());
    }

    // --- Tags ---

    #[test]
    fn normalize_tags_trims_lowercases_and_dedupes() {
        let tags = vec![
            " Greeting ".to_string(),
            "greeting".to_string(),
            "".to_string(),
            "Sign-Off".to_string(),
        ];
        let out = normalize_tags(&tags).unwrap();
        assert_eq!(out, vec!["greeting", "sign-off"]);
    }

    #[test]
    fn normalize_tags_rejects_too_many() {
        let tags: Vec<String> = (0..MAX_TAGS + 1).map(|i| format!("tag{i}")).collect();
        assert!(normalize_tags(&tags).is_err());
    }

    // --- Item / header types ---

    #[test]
    fn validate_item_type_accepts_known_types() {
        for t in VALID_ITEM_TYPES {
            assert!(validate_item_type(t).is_ok());
        }
    }

    #[test]
    fn validate_item_type_rejects_unknown() {
        assert!(validate_item_type("prompt").is_err());
    }

    #[test]
    fn validate_header_type_rejects_unknown() {
        assert!(validate_header_type("archive").is_err());
    }
}
