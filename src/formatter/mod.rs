//! Template content formatting.
//!
//! [`template`] turns the lightweight authoring dialect (headings, emphasis,
//! `[MERGE_FIELD]` tokens, lists) into escaped, class-annotated markup with
//! an outline, a read-time estimate and accessibility labels. The sibling
//! modules go the other way ([`plain_text`]), lint ([`validation`]) and
//! measure ([`metrics`]).

pub mod metrics;
pub mod plain_text;
pub mod template;
pub mod validation;

pub use metrics::{get_performance_metrics, PerformanceMetrics};
pub use plain_text::to_plain_text;
pub use template::{
    extract_merge_fields, format_template_content, AccessibilityMetadata, FormatOptions,
    HeadingEntry, MergeFieldLabel, ParsedTemplateContent, TemplateContentFormatter,
};
pub use validation::{validate_template, TemplateValidation};
