//! Personality blending: base vector + persona override + tone modifier.
//!
//! Character overrides replace values outright. Tone modifiers nudge:
//! each touched dimension becomes `current * 0.7 + modifier * 0.3`,
//! computed against the already-overridden value.

use std::sync::Arc;

use crate::catalog::MentorCatalog;

use super::traits::{clamp_unit, TraitOverride, TraitVector};

/// Share of the current value kept when a tone modifier is blended in.
pub const CONTEXT_RETAIN_WEIGHT: f32 = 0.7;
/// Share of the tone modifier's value.
pub const CONTEXT_BLEND_WEIGHT: f32 = 0.3;

/// Resolve a trait vector from a base and two optional partial vectors.
///
/// Inputs are never mutated. Every value in the result is clamped into
/// [0, 1].
pub fn blend(
    base: &TraitVector,
    character_override: Option<&TraitOverride>,
    context_modifier: Option<&TraitOverride>,
) -> TraitVector {
    let mut resolved = base.clamped();

    if let Some(overrides) = character_override {
        for (dim, value) in overrides.iter() {
            resolved = resolved.with(dim, value);
        }
    }

    if let Some(modifier) = context_modifier {
        for (dim, value) in modifier.iter() {
            let current = resolved.get(dim);
            let mixed =
                current * CONTEXT_RETAIN_WEIGHT + clamp_unit(value) * CONTEXT_BLEND_WEIGHT;
            resolved = resolved.with(dim, mixed);
        }
    }

    resolved
}

// ============================================================================
// Catalog-backed resolver
// ============================================================================

/// Resolves persona ids and tone ids against an injected catalog.
#[derive(Debug, Clone)]
pub struct PersonalityBlender {
    catalog: Arc<MentorCatalog>,
}

impl PersonalityBlender {
    pub fn new(catalog: Arc<MentorCatalog>) -> Self {
        Self { catalog }
    }

    /// The catalog's base personality.
    pub fn base(&self) -> TraitVector {
        self.catalog.base_personality
    }

    /// Blend the catalog base with a character's overrides and a tone.
    ///
    /// Unknown ids behave as if they were not given.
    pub fn resolve(&self, character_id: Option<&str>, tone_id: Option<&str>) -> TraitVector {
        let character = character_id.and_then(|id| {
            let found = self.catalog.character(id);
            if found.is_none() {
                log::debug!("Unknown character '{}', using base personality", id);
            }
            found
        });
        let tone = tone_id.and_then(|id| {
            let found = self.catalog.tone(id);
            if found.is_none() {
                log::debug!("Unknown tone '{}', skipping tone modifier", id);
            }
            found
        });

        blend(
            &self.catalog.base_personality,
            character.map(|c| &c.overrides),
            tone.map(|t| &t.modifier),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
