//! Template lint. Only empty content is invalid; everything else is advice.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::template::{extract_merge_fields, format_template_content, FormatOptions};

/// Word count above which a template is considered long.
pub const LONG_TEMPLATE_WORDS: usize = 500;

pub const EMPTY_CONTENT_ISSUE: &str = "Template content is empty";
pub const ADD_HEADINGS_SUGGESTION: &str = "Consider adding headings to organize your template";
pub const ADD_MERGE_FIELDS_SUGGESTION: &str =
    "Consider adding merge fields like [FIRST_NAME] for personalization";
pub const LONG_TEMPLATE_SUGGESTION: &str = "Consider breaking long templates into smaller sections";

static LOOSE_BRACKET_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([A-Za-z_][A-Za-z0-9_ ]*)\]").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateValidation {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

pub fn validate_template(raw: &str) -> TemplateValidation {
    if raw.trim().is_empty() {
        return TemplateValidation {
            is_valid: false,
            issues: vec![EMPTY_CONTENT_ISSUE.to_string()],
            suggestions: Vec::new(),
        };
    }

    let parsed = format_template_content(
        raw,
        &FormatOptions {
            mobile_optimized: false,
            add_accessibility_tags: false,
        },
    );
    let mut suggestions = Vec::new();

    if parsed.heading_outline.is_empty() {
        suggestions.push(ADD_HEADINGS_SUGGESTION.to_string());
    }
    if parsed.merge_fields.is_empty() {
        suggestions.push(ADD_MERGE_FIELDS_SUGGESTION.to_string());
    }
    if raw.split_whitespace().count() > LONG_TEMPLATE_WORDS {
        suggestions.push(LONG_TEMPLATE_SUGGESTION.to_string());
    }

    let valid_fields = extract_merge_fields(raw);
    let mut flagged: Vec<&str> = Vec::new();
    for cap in LOOSE_BRACKET_TOKEN.captures_iter(raw) {
        let token = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
        if valid_fields.iter().any(|f| f == token) || flagged.contains(&token) {
            continue;
        }
        flagged.push(token);
        suggestions.push(format!(
            "Merge field [{}] will not be recognized; use UPPER_SNAKE_CASE like [{}]",
            token,
            to_upper_snake(token)
        ));
    }

    TemplateValidation {
        is_valid: true,
        issues: Vec::new(),
        suggestions,
    }
}

fn to_upper_snake(token: &str) -> String {
    token
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_ascii_uppercase()
}
