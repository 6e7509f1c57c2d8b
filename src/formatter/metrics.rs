//! Observational metrics for a formatting pass.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::template::{format_template_content, FormatOptions};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Wall-clock milliseconds spent formatting.
    pub processing_time_ms: f64,
    /// Input length in characters.
    pub content_size: usize,
    /// Output markup length divided by input length (input floored at 1).
    pub compression_ratio: f64,
}

/// Format `raw` with default options and report timing and size ratios.
pub fn get_performance_metrics(raw: &str) -> PerformanceMetrics {
    let started = Instant::now();
    let parsed = format_template_content(raw, &FormatOptions::default());
    let elapsed = started.elapsed();

    let content_size = raw.chars().count();
    let output_size = parsed.rendered_markup.chars().count();

    PerformanceMetrics {
        processing_time_ms: elapsed.as_secs_f64() * 1000.0,
        content_size,
        compression_ratio: output_size as f64 / content_size.max(1) as f64,
    }
}
