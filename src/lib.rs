//! # mentorkit
//!
//! Core of an AI-learning mentor: persona trait blending, trait-driven style
//! edits, greeting selection, email-template formatting, and character-voiced
//! content generation with a reviewable content store.
//!
//! The pure pieces ([`persona`], [`formatter`]) take a [`catalog::MentorCatalog`]
//! or plain strings and never fail. [`generation`] and [`store`] carry the
//! I/O, and [`server`] puts everything behind an axum router.

pub mod catalog;
pub mod formatter;
pub mod generation;
pub mod persona;
pub mod server;
pub mod store;
pub mod utilities;

pub use catalog::{CatalogError, MentorCatalog};
pub use formatter::{
    format_template_content, to_plain_text, validate_template, FormatOptions,
    ParsedTemplateContent, TemplateContentFormatter,
};
pub use generation::{ContentService, GeneratedContent, GenerationError, GenerationRequest};
pub use persona::{
    apply_style_edits, blend, GreetingSelector, PersonalityBlender, TraitOverride, TraitVector,
};
pub use store::{ContentStore, StoreError};

/// Crate version reported by the health endpoint.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
