//! Markup back to plain text.

use once_cell::sync::Lazy;
use regex::Regex;

static SKIP_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<a\b[^>]*class="sr-only[^"]*"[^>]*>.*?</a>"#).unwrap());
static BLOCK_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</?(?:h[1-6]|p|div|ul|ol|li|section|article|header|footer)\b[^>]*>|<br\s*/?>")
        .unwrap()
});
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strip tags, decode the entities the formatter emits, collapse whitespace.
///
/// Block-level boundaries become a single space; inline tags vanish without
/// adding one, so `[NAME],` stays glued to its punctuation. Visually hidden
/// skip links are dropped.
pub fn to_plain_text(markup: &str) -> String {
    let without_skip = SKIP_LINK.replace_all(markup, "");
    let blocks_spaced = BLOCK_TAG.replace_all(&without_skip, " ");
    let untagged = ANY_TAG.replace_all(&blocks_spaced, "");
    let decoded = decode_entities(&untagged);
    WHITESPACE.replace_all(&decoded, " ").trim().to_string()
}

fn decode_entities(text: &str) -> String {
    // &amp; last so "&amp;lt;" decodes to "&lt;", not "<".
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
