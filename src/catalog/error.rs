//! Catalog loading errors.

use thiserror::Error;

/// Errors that can occur while loading or validating a [`super::MentorCatalog`].
#[derive(Debug, Error)]
pub enum CatalogError {
    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog parsed but violates a structural rule.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The file extension is not one of json, yaml, yml.
    #[error("Unsupported catalog format: {0}")]
    UnsupportedFormat(String),
}
