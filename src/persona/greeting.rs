//! Contextual greetings drawn from catalog response templates.
//!
//! Pool lookup order: the character's own greeting pool, then the generic
//! pool for first-time or returning users, then a fixed default. Within a
//! pool one template is chosen through an injected [`TemplatePicker`].

use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;

use crate::catalog::{MentorCatalog, ResponseTemplate, GREETING_CONTEXT, RETURN_GREETING_CONTEXT};
use crate::utilities::string_utils::interpolate_known;

/// Used when the catalog has no usable greeting pool at all.
pub const DEFAULT_GREETING: &str = "Hi there! I'm here to help you learn about AI.";
/// Substituted for `{name}` when no user name is known.
pub const DEFAULT_USER_NAME: &str = "there";
/// Substituted for `{topic}` when no lesson topic is known.
pub const DEFAULT_TOPIC: &str = "AI skills";

// ============================================================================
// Pickers
// ============================================================================

/// Chooses one index out of `len` candidates. `len` is always at least 1.
pub trait TemplatePicker: Send + Sync {
    fn pick(&self, len: usize) -> usize;
}

/// Uniform choice from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPicker;

impl TemplatePicker for RandomPicker {
    fn pick(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Always picks the same index (wrapped into range).
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPicker(pub usize);

impl TemplatePicker for FixedPicker {
    fn pick(&self, len: usize) -> usize {
        self.0 % len
    }
}

// ============================================================================
// GreetingSelector
// ============================================================================

pub struct GreetingSelector {
    catalog: Arc<MentorCatalog>,
    picker: Arc<dyn TemplatePicker>,
}

impl std::fmt::Debug for GreetingSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GreetingSelector").finish_non_exhaustive()
    }
}

impl GreetingSelector {
    pub fn new(catalog: Arc<MentorCatalog>, picker: Arc<dyn TemplatePicker>) -> Self {
        Self { catalog, picker }
    }

    /// Selector with uniform random choice.
    pub fn random(catalog: Arc<MentorCatalog>) -> Self {
        Self::new(catalog, Arc::new(RandomPicker))
    }

    fn pool(&self, character_id: Option<&str>, is_returning_user: bool) -> Option<&ResponseTemplate> {
        let generic_context = if is_returning_user {
            RETURN_GREETING_CONTEXT
        } else {
            GREETING_CONTEXT
        };
        character_id
            .and_then(|id| self.catalog.template_pool(GREETING_CONTEXT, Some(id)))
            .or_else(|| self.catalog.template_pool(generic_context, None))
            .or_else(|| self.catalog.template_pool(GREETING_CONTEXT, None))
            .filter(|pool| !pool.templates.is_empty())
    }

    /// Build a greeting for the given learner and lesson.
    pub fn select_greeting(
        &self,
        user_name: Option<&str>,
        character_id: Option<&str>,
        lesson_topic: Option<&str>,
        is_returning_user: bool,
    ) -> String {
        let Some(pool) = self.pool(character_id, is_returning_user) else {
            log::debug!("No greeting templates in catalog, using default greeting");
            return DEFAULT_GREETING.to_string();
        };

        let index = self.picker.pick(pool.templates.len()).min(pool.templates.len() - 1);
        let template = &pool.templates[index];

        let mut values: HashMap<String, String> = pool.variables.clone();
        values.insert("name".into(), non_blank(user_name).unwrap_or(DEFAULT_USER_NAME).to_string());
        values.insert("topic".into(), non_blank(lesson_topic).unwrap_or(DEFAULT_TOPIC).to_string());

        interpolate_known(template, &values)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ============================================================================
// Tests
// ============================================================================
