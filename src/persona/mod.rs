//! Persona system: trait vectors, blending, style edits and greetings.
//!
//! # Architecture
//!
//! ```text
//! MentorCatalog { base_personality, characters, tones, response_templates }
//!   ↓  character overrides (hard replace)
//!   ↓  tone modifier (70/30 blend)
//! TraitVector (resolved)
//!   ↓  threshold rules
//! apply_style_edits(text)          GreetingSelector → greeting text
//! ```
//!
//! Everything here is synchronous and side-effect free apart from the
//! random choice inside [`greeting::RandomPicker`].

pub mod blend;
pub mod greeting;
pub mod style;
pub mod traits;

// Re-exports
pub use blend::{blend, PersonalityBlender, CONTEXT_BLEND_WEIGHT, CONTEXT_RETAIN_WEIGHT};
pub use greeting::{FixedPicker, GreetingSelector, RandomPicker, TemplatePicker};
pub use style::apply_style_edits;
pub use traits::{TraitDimension, TraitOverride, TraitVector};
