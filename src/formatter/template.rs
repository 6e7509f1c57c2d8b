//! Template content formatting: a small markup dialect to annotated HTML.
//!
//! Recognized dialect:
//!
//! - `#`, `##`, `###` followed by whitespace start a heading line
//! - `- ` / `* ` start an unordered list item, `1. ` an ordered one
//! - blank lines separate paragraphs
//! - `**bold**` and `*italic*` spans
//! - `[UPPER_SNAKE]` merge fields, grammar `\[[A-Z_][A-Z0-9_]*\]`
//!
//! Everything else is text: it is HTML-escaped and never interpreted.
//! Formatting is total; malformed markup passes through literally.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Reading speed used for the read-time estimate.
pub const WORDS_PER_MINUTE: usize = 200;
/// Floor for the read-time estimate.
pub const MIN_READ_TIME_SECONDS: u32 = 1;

pub const DOCUMENT_ROLE: &str = "article";
pub const DOCUMENT_ARIA_LABEL: &str = "Email template content";
pub const SKIP_LINK_TEXT: &str = "Skip to template content";
pub const CONTENT_ANCHOR_ID: &str = "template-content";

pub(crate) static MERGE_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([A-Z_][A-Z0-9_]*)\]").unwrap());
static HEADING_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,3})[ \t]+(\S.*)$").unwrap());
static UNORDERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-*][ \t]+(\S.*)$").unwrap());
static ORDERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.[ \t]+(\S.*)$").unwrap());
static BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([^*\s](?:[^*]*[^*\s])?)\*\*").unwrap());
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*\s](?:[^*]*[^*\s])?)\*").unwrap());

const PARAGRAPH_CLASS: &str = "mb-4";
const UNORDERED_LIST_CLASS: &str = "list-disc ml-6 mb-4 space-y-1";
const ORDERED_LIST_CLASS: &str = "list-decimal ml-6 mb-4 space-y-1";
const BOLD_CLASS: &str = "font-semibold text-gray-900";
const ITALIC_CLASS: &str = "italic text-gray-700";
const MERGE_FIELD_CLASS: &str =
    "merge-field inline-flex items-center px-2 py-0.5 rounded bg-purple-100 text-purple-800 font-mono text-sm";

// ============================================================================
// Options and output
// ============================================================================

/// Formatting switches. Both default to enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Responsive size and spacing classes on headings.
    pub mobile_optimized: bool,
    /// ARIA container plus skip link around the output.
    pub add_accessibility_tags: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            mobile_optimized: true,
            add_accessibility_tags: true,
        }
    }
}

/// One heading found in the source, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingEntry {
    pub level: u8,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeFieldLabel {
    pub field: String,
    pub aria_label: String,
}

/// Labels handed to assistive tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibilityMetadata {
    pub document_role: String,
    pub aria_label: String,
    pub merge_field_labels: Vec<MergeFieldLabel>,
    pub skip_link_text: String,
    /// `"H1: Title"` style entries, one per heading.
    pub heading_structure: Vec<String>,
}

/// Result of formatting one template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTemplateContent {
    pub rendered_markup: String,
    /// Distinct merge-field names in first-occurrence order.
    pub merge_fields: Vec<String>,
    pub heading_outline: Vec<HeadingEntry>,
    pub estimated_read_time_seconds: u32,
    pub accessibility: AccessibilityMetadata,
}

impl ParsedTemplateContent {
    /// Read time rounded up to whole minutes, at least one.
    pub fn estimated_read_time_minutes(&self) -> u32 {
        self.estimated_read_time_seconds.div_ceil(60).max(1)
    }
}

// ============================================================================
// Formatter
// ============================================================================

/// Formatter bound to a fixed set of options.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateContentFormatter {
    options: FormatOptions,
}

impl TemplateContentFormatter {
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> FormatOptions {
        self.options
    }

    pub fn format(&self, raw: &str) -> ParsedTemplateContent {
        format_template_content(raw, &self.options)
    }
}

enum Block {
    Heading(u8, String),
    Paragraph(Vec<String>),
    List { ordered: bool, items: Vec<String> },
}

/// Format `raw` into annotated markup plus metadata.
pub fn format_template_content(raw: &str, options: &FormatOptions) -> ParsedTemplateContent {
    let blocks = parse_blocks(raw);

    let heading_outline: Vec<HeadingEntry> = blocks
        .iter()
        .filter_map(|b| match b {
            Block::Heading(level, text) => Some(HeadingEntry {
                level: *level,
                text: outline_text(text),
            }),
            _ => None,
        })
        .collect();

    let merge_fields = extract_merge_fields(raw);

    let body = blocks
        .iter()
        .map(|b| render_block(b, options))
        .collect::<Vec<_>>()
        .join("\n");

    let rendered_markup = if options.add_accessibility_tags {
        format!(
            "<div role=\"{}\" aria-label=\"{}\" class=\"template-content\">\n\
             <a href=\"#{}\" class=\"sr-only focus:not-sr-only\">{}</a>\n\
             <div id=\"{}\">\n{}\n</div>\n</div>",
            DOCUMENT_ROLE, DOCUMENT_ARIA_LABEL, CONTENT_ANCHOR_ID, SKIP_LINK_TEXT, CONTENT_ANCHOR_ID, body
        )
    } else {
        body
    };

    let accessibility = AccessibilityMetadata {
        document_role: DOCUMENT_ROLE.to_string(),
        aria_label: DOCUMENT_ARIA_LABEL.to_string(),
        merge_field_labels: merge_fields
            .iter()
            .map(|f| MergeFieldLabel {
                field: f.clone(),
                aria_label: merge_field_aria_label(f),
            })
            .collect(),
        skip_link_text: SKIP_LINK_TEXT.to_string(),
        heading_structure: heading_outline
            .iter()
            .map(|h| format!("H{}: {}", h.level, h.text))
            .collect(),
    };

    ParsedTemplateContent {
        rendered_markup,
        merge_fields,
        heading_outline,
        estimated_read_time_seconds: estimate_read_time_seconds(raw),
        accessibility,
    }
}

/// Distinct merge-field names in first-occurrence order.
pub fn extract_merge_fields(raw: &str) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for cap in MERGE_FIELD.captures_iter(raw) {
        let name = &cap[1];
        if !fields.iter().any(|f| f == name) {
            fields.push(name.to_string());
        }
    }
    fields
}

/// Seconds to read `raw` at [`WORDS_PER_MINUTE`], rounded up.
pub fn estimate_read_time_seconds(raw: &str) -> u32 {
    let words = raw.split_whitespace().count();
    let seconds = (words * 60).div_ceil(WORDS_PER_MINUTE);
    u32::try_from(seconds).unwrap_or(u32::MAX).max(MIN_READ_TIME_SECONDS)
}

fn merge_field_aria_label(field: &str) -> String {
    format!("Merge field: {}", field)
}

/// Escape everything outside the recognized dialect.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn parse_blocks(raw: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Option<Block> = None;

    for line in raw.lines() {
        let line = line.trim();

        if line.is_empty() {
            blocks.extend(current.take());
            continue;
        }

        if let Some(cap) = HEADING_LINE.captures(line) {
            blocks.extend(current.take());
            let level = cap[1].len() as u8;
            blocks.push(Block::Heading(level, cap[2].trim().to_string()));
            continue;
        }

        let list_item = ORDERED_ITEM
            .captures(line)
            .map(|c| (true, c[1].trim().to_string()))
            .or_else(|| {
                UNORDERED_ITEM
                    .captures(line)
                    .map(|c| (false, c[1].trim().to_string()))
            });

        match list_item {
            Some((ordered, item)) => {
                if let Some(Block::List { ordered: o, items }) = current.as_mut() {
                    if *o == ordered {
                        items.push(item);
                        continue;
                    }
                }
                blocks.extend(current.take());
                current = Some(Block::List {
                    ordered,
                    items: vec![item],
                });
            }
            None => {
                if let Some(Block::Paragraph(lines)) = current.as_mut() {
                    lines.push(line.to_string());
                    continue;
                }
                blocks.extend(current.take());
                current = Some(Block::Paragraph(vec![line.to_string()]));
            }
        }
    }

    blocks.extend(current);
    blocks
}

fn heading_class(level: u8, mobile: bool) -> &'static str {
    match (level, mobile) {
        (1, false) => "text-2xl font-bold text-gray-900 mb-4 mt-8",
        (2, false) => "text-xl font-bold text-gray-900 mb-3 mt-6",
        (_, false) => "text-lg font-semibold text-gray-900 mb-2 mt-4",
        (1, true) => "text-xl sm:text-2xl font-bold text-gray-900 mb-3 sm:mb-4 mt-6 sm:mt-8",
        (2, true) => "text-lg sm:text-xl font-bold text-gray-900 mb-2 sm:mb-3 mt-4 sm:mt-6",
        (_, true) => "text-base sm:text-lg font-semibold text-gray-900 mb-2 mt-3 sm:mt-4",
    }
}

fn render_block(block: &Block, options: &FormatOptions) -> String {
    match block {
        Block::Heading(level, text) => format!(
            "<h{l} class=\"{}\">{}</h{l}>",
            heading_class(*level, options.mobile_optimized),
            render_inline(text),
            l = level
        ),
        Block::Paragraph(lines) => format!(
            "<p class=\"{}\">{}</p>",
            PARAGRAPH_CLASS,
            lines
                .iter()
                .map(|l| render_inline(l))
                .collect::<Vec<_>>()
                .join("<br>")
        ),
        Block::List { ordered, items } => {
            let (tag, class) = if *ordered {
                ("ol", ORDERED_LIST_CLASS)
            } else {
                ("ul", UNORDERED_LIST_CLASS)
            };
            let items: String = items
                .iter()
                .map(|i| format!("<li>{}</li>", render_inline(i)))
                .collect();
            format!("<{t} class=\"{}\">{}</{t}>", class, items, t = tag)
        }
    }
}

/// Heading text with emphasis markers removed; merge-field brackets stay.
fn outline_text(text: &str) -> String {
    let unbolded = BOLD.replace_all(text, "$1");
    ITALIC.replace_all(&unbolded, "$1").into_owned()
}

fn render_inline(text: &str) -> String {
    let escaped = escape_html(text);
    let bold = BOLD.replace_all(&escaped, format!("<strong class=\"{}\">$1</strong>", BOLD_CLASS).as_str());
    let italic = ITALIC.replace_all(&bold, format!("<em class=\"{}\">$1</em>", ITALIC_CLASS).as_str());
    MERGE_FIELD
        .replace_all(&italic, |cap: &regex::Captures<'_>| {
            format!(
                "<span class=\"{}\" role=\"button\" tabindex=\"0\" aria-label=\"{}\">[{}]</span>",
                MERGE_FIELD_CLASS,
                merge_field_aria_label(&cap[1]),
                &cap[1]
            )
        })
        .into_owned()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> FormatOptions {
        FormatOptions {
            mobile_optimized: false,
            add_accessibility_tags: false,
        }
    }

    #[test]
    fn test_merge_fields_dedup_and_order() {
        let out = format_template_content(
            "Hi [NAME], welcome [NAME]! Your code is [CODE].",
            &FormatOptions::default(),
        );
        assert_eq!(out.merge_fields, vec!["NAME", "CODE"]);
        assert_eq!(out.rendered_markup.matches("aria-label=\"Merge field: NAME\"").count(), 2);
        assert_eq!(out.accessibility.merge_field_labels.len(), 2);
        assert_eq!(out.accessibility.merge_field_labels[1].aria_label, "Merge field: CODE");
    }

    #[test]
    fn test_unterminated_bracket_is_literal() {
        let out = format_template_content("Unterminated [NAME and normal text", &plain());
        assert!(out.merge_fields.is_empty());
        assert!(out.rendered_markup.contains("Unterminated [NAME and normal text"));
    }

    #[test]
    fn test_non_identifier_brackets_are_literal() {
        let out = format_template_content("[first_name] [Two Words] [1ST] [OK_1]", &plain());
        assert_eq!(out.merge_fields, vec!["OK_1"]);
        assert!(out.rendered_markup.contains("[first_name] [Two Words] [1ST]"));
    }

    #[test]
    fn test_nested_brackets_take_inner_field() {
        let out = format_template_content("[[NAME]]", &plain());
        assert_eq!(out.merge_fields, vec!["NAME"]);
        assert!(out.rendered_markup.starts_with("<p class=\"mb-4\">[<span"));
        assert!(out.rendered_markup.ends_with("</span>]</p>"));
    }

    #[test]
    fn test_empty_input_is_well_formed() {
        let out = format_template_content("", &FormatOptions::default());
        assert!(out.merge_fields.is_empty());
        assert!(out.heading_outline.is_empty());
        assert!(out.estimated_read_time_seconds > 0);
        assert!(out.rendered_markup.contains("role=\"article\""));
    }

    #[test]
    fn test_heading_outline_order() {
        let out = format_template_content("# One\ntext\n## Two\n### Three", &plain());
        assert_eq!(
            out.heading_outline,
            vec![
                HeadingEntry { level: 1, text: "One".into() },
                HeadingEntry { level: 2, text: "Two".into() },
                HeadingEntry { level: 3, text: "Three".into() },
            ]
        );
        assert_eq!(
            out.accessibility.heading_structure,
            vec!["H1: One", "H2: Two", "H3: Three"]
        );
    }

    #[test]
    fn test_outline_drops_emphasis_markers() {
        let out = format_template_content("# [X] *y*\n## **Main** Newsletter [MONTH]", &plain());
        assert_eq!(out.heading_outline[0].text, "[X] y");
        assert_eq!(
            out.accessibility.heading_structure,
            vec!["H1: [X] y", "H2: Main Newsletter [MONTH]"]
        );
        assert!(out.rendered_markup.contains("<em class="));
    }

    #[test]
    fn test_four_hashes_is_not_a_heading() {
        let out = format_template_content("#### Deep\n#NoSpace", &plain());
        assert!(out.heading_outline.is_empty());
        assert!(out.rendered_markup.contains("#### Deep<br>#NoSpace"));
    }

    #[test]
    fn test_desktop_heading_classes() {
        let out = format_template_content("# Impact Report", &plain());
        assert!(out
            .rendered_markup
            .contains("<h1 class=\"text-2xl font-bold text-gray-900 mb-4 mt-8\">Impact Report</h1>"));
    }

    #[test]
    fn test_mobile_heading_classes() {
        let options = FormatOptions {
            mobile_optimized: true,
            add_accessibility_tags: false,
        };
        let out = format_template_content("# A\n## B\n### C", &options);
        assert_eq!(out.rendered_markup.matches("text-xl sm:text-2xl").count(), 1);
        assert_eq!(out.rendered_markup.matches("text-lg sm:text-xl").count(), 1);
        assert_eq!(out.rendered_markup.matches("text-base sm:text-lg").count(), 1);
        assert!(out.rendered_markup.contains("mb-3 sm:mb-4"));
        assert!(out.rendered_markup.contains("mt-4 sm:mt-6"));
    }

    #[test]
    fn test_emphasis_markup() {
        let out = format_template_content("**We are grateful** for your *continued* support.", &plain());
        assert!(out
            .rendered_markup
            .contains("<strong class=\"font-semibold text-gray-900\">We are grateful</strong>"));
        assert!(out
            .rendered_markup
            .contains("<em class=\"italic text-gray-700\">continued</em>"));
    }

    #[test]
    fn test_stray_markers_are_literal() {
        let out = format_template_content("2 * 3 = 6 and **open", &plain());
        assert!(out.rendered_markup.contains("2 * 3 = 6 and **open"));
        assert!(!out.rendered_markup.contains("<em"));
        assert!(!out.rendered_markup.contains("<strong"));
    }

    #[test]
    fn test_script_content_is_escaped() {
        let out = format_template_content("<script>alert('x')</script> & [NAME]", &plain());
        assert!(!out.rendered_markup.contains("<script>"));
        assert!(out
            .rendered_markup
            .contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; "));
        assert_eq!(out.merge_fields, vec!["NAME"]);
    }

    #[test]
    fn test_lists_and_paragraphs() {
        let raw = "Your gift helped:\n- Feed [MEALS] families\n- Shelter people\n\n1. First\n2. Second\n\nThanks,\nMaya";
        let out = format_template_content(raw, &plain());
        assert!(out.rendered_markup.contains("<p class=\"mb-4\">Your gift helped:</p>"));
        assert!(out.rendered_markup.contains("<ul class=\"list-disc ml-6 mb-4 space-y-1\"><li>Feed "));
        assert_eq!(out.rendered_markup.matches("<li>").count(), 4);
        assert!(out.rendered_markup.contains("<ol class=\"list-decimal ml-6 mb-4 space-y-1\">"));
        assert!(out.rendered_markup.contains("<p class=\"mb-4\">Thanks,<br>Maya</p>"));
    }

    #[test]
    fn test_accessibility_wrapper() {
        let out = format_template_content("Hello [TRAINING_DATE]", &FormatOptions::default());
        let m = &out.rendered_markup;
        assert!(m.contains("role=\"article\""));
        assert!(m.contains("aria-label=\"Email template content\""));
        assert!(m.contains("Skip to template content"));
        assert!(m.contains("class=\"sr-only focus:not-sr-only\""));
        assert!(m.contains("id=\"template-content\""));
        assert!(m.contains("role=\"button\""));
        assert!(m.contains("tabindex=\"0\""));
    }

    #[test]
    fn test_read_time_from_raw_word_count() {
        let short = format_template_content("Thanks [NAME]! Your [AMOUNT] donation helps.", &plain());
        assert_eq!(short.estimated_read_time_seconds, 2);
        assert_eq!(short.estimated_read_time_minutes(), 1);

        let long = "word ".repeat(450);
        let out = format_template_content(&long, &plain());
        assert_eq!(out.estimated_read_time_seconds, 135);
        assert_eq!(out.estimated_read_time_minutes(), 3);
    }

    #[test]
    fn test_formatter_struct_uses_its_options() {
        let formatter = TemplateContentFormatter::new(plain());
        let out = formatter.format("# T");
        assert!(!out.rendered_markup.contains("role=\"article\""));
        assert_eq!(formatter.options(), plain());
    }
}
