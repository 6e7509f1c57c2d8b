//! String utility functions.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

static VARIABLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_\-]*)\}").unwrap());

/// Names of the `{placeholder}` tokens in `template`, first occurrence first,
/// without duplicates.
pub fn template_variables(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for cap in VARIABLE_PATTERN.captures_iter(template) {
        let name = &cap[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Replace `{placeholder}` tokens found in `values`.
///
/// Tokens with no entry are left as written, and braces that do not form
/// a valid placeholder (JSON, stray `{`) are untouched.
pub fn interpolate_known(template: &str, values: &HashMap<String, String>) -> String {
    if !template.contains('{') || values.is_empty() {
        return template.to_string();
    }
    VARIABLE_PATTERN
        .replace_all(template, |cap: &regex::Captures<'_>| match values.get(&cap[1]) {
            Some(value) => value.clone(),
            None => cap[0].to_string(),
        })
        .into_owned()
}
