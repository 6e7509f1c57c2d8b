//! Mentor catalog: read-only reference data for personas and greetings.
//!
//! The catalog holds the base personality, character profiles, tone
//! contexts, response templates and quick actions. It is loaded once
//! (from the embedded default or a JSON/YAML override) and handed to the
//! blender and greeting selector explicitly.

pub mod error;

pub use error::CatalogError;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::persona::traits::{TraitOverride, TraitVector};
use crate::utilities::string_utils::template_variables;

/// Embedded default catalog (used when no override file is provided).
const EMBEDDED_CATALOG_JSON: &str = include_str!("default_catalog.json");

/// Context tag for first-visit greetings.
pub const GREETING_CONTEXT: &str = "greeting";
/// Context tag for returning-user greetings.
pub const RETURN_GREETING_CONTEXT: &str = "return_greeting";
/// Placeholders the greeting selector fills on every template.
pub const GREETING_PLACEHOLDERS: [&str; 2] = ["name", "topic"];

// ============================================================================
// Reference records
// ============================================================================

/// A predefined persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterProfile {
    /// Stable lowercase identifier (`maya`, `sofia`, ...).
    pub id: String,
    /// Display name.
    pub name: String,
    /// One-sentence description of who the character is.
    pub description: String,
    /// Tone descriptor used in generation prompts.
    pub tone: String,
    /// Free-text style descriptor.
    #[serde(default)]
    pub style: String,
    /// Topical focus areas.
    #[serde(default)]
    pub focus_areas: Vec<String>,
    /// Hard trait overrides applied on top of the base personality.
    #[serde(default)]
    pub overrides: TraitOverride,
    /// Preferred generation model, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Suggested prompts shown next to the chat input.
    #[serde(default)]
    pub quick_actions: Vec<String>,
}

/// A situational tone, blended rather than imposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneContext {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub modifier: TraitOverride,
}

/// A pool of candidate texts for one (context, character) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseTemplate {
    pub id: String,
    pub context: String,
    /// Owning character; `None` for generic pools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    /// Candidate texts with `{placeholder}` tokens.
    pub templates: Vec<String>,
    /// Default values for placeholders not supplied by the caller.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub variables: HashMap<String, String>,
}

// ============================================================================
// MentorCatalog
// ============================================================================

/// The complete set of persona reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorCatalog {
    pub base_personality: TraitVector,
    #[serde(default)]
    pub characters: Vec<CharacterProfile>,
    #[serde(default)]
    pub tones: Vec<ToneContext>,
    #[serde(default)]
    pub response_templates: Vec<ResponseTemplate>,
    #[serde(default)]
    pub default_quick_actions: Vec<String>,
}

impl MentorCatalog {
    /// Load the embedded default catalog.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json_str(EMBEDDED_CATALOG_JSON)
    }

    /// Parse and validate a JSON catalog.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse and validate a YAML catalog.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_yaml::from_str(yaml)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog file, choosing the parser by extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        let content = std::fs::read_to_string(path)?;
        log::debug!("Loading mentor catalog from {}", path.display());
        match ext.as_str() {
            "json" => Self::from_json_str(&content),
            "yaml" | "yml" => Self::from_yaml_str(&content),
            other => Err(CatalogError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Check structural rules: unique ids, trait ranges, non-empty pools,
    /// and template owners that exist.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let bad = self.base_personality.out_of_range();
        if !bad.is_empty() {
            return Err(CatalogError::Validation(format!(
                "base personality has out-of-range values for {:?}",
                bad
            )));
        }

        let mut seen = HashSet::new();
        for c in &self.characters {
            if !seen.insert(c.id.as_str()) {
                return Err(CatalogError::Validation(format!(
                    "duplicate character id '{}'",
                    c.id
                )));
            }
            let bad = c.overrides.out_of_range();
            if !bad.is_empty() {
                return Err(CatalogError::Validation(format!(
                    "character '{}' has out-of-range overrides for {:?}",
                    c.id, bad
                )));
            }
        }

        let mut seen_tones = HashSet::new();
        for t in &self.tones {
            if !seen_tones.insert(t.id.as_str()) {
                return Err(CatalogError::Validation(format!(
                    "duplicate tone id '{}'",
                    t.id
                )));
            }
            let bad = t.modifier.out_of_range();
            if !bad.is_empty() {
                return Err(CatalogError::Validation(format!(
                    "tone '{}' has out-of-range modifiers for {:?}",
                    t.id, bad
                )));
            }
        }

        let mut seen_templates = HashSet::new();
        for r in &self.response_templates {
            if !seen_templates.insert(r.id.as_str()) {
                return Err(CatalogError::Validation(format!(
                    "duplicate response template id '{}'",
                    r.id
                )));
            }
            if r.templates.is_empty() {
                return Err(CatalogError::Validation(format!(
                    "response template '{}' has no candidate texts",
                    r.id
                )));
            }
            if let Some(owner) = &r.character {
                if !seen.contains(owner.as_str()) {
                    return Err(CatalogError::Validation(format!(
                        "response template '{}' references unknown character '{}'",
                        r.id, owner
                    )));
                }
            }
        }

        for (template_id, placeholder) in self.unresolved_placeholders() {
            log::warn!(
                "Response template '{}' uses {{{}}}, which nothing fills; it will be shown as written",
                template_id,
                placeholder
            );
        }

        Ok(())
    }

    /// `(template id, placeholder)` pairs for placeholders that neither the
    /// greeting selector nor the pool's own `variables` supply.
    pub fn unresolved_placeholders(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for r in &self.response_templates {
            for text in &r.templates {
                for name in template_variables(text) {
                    let known = GREETING_PLACEHOLDERS.contains(&name.as_str())
                        || r.variables.contains_key(&name);
                    let pair = (r.id.clone(), name);
                    if !known && !out.contains(&pair) {
                        out.push(pair);
                    }
                }
            }
        }
        out
    }

    pub fn character(&self, id: &str) -> Option<&CharacterProfile> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn tone(&self, id: &str) -> Option<&ToneContext> {
        self.tones.iter().find(|t| t.id == id)
    }

    /// Exact (context, character) lookup. `character = None` matches only
    /// generic pools.
    pub fn template_pool(&self, context: &str, character: Option<&str>) -> Option<&ResponseTemplate> {
        self.response_templates
            .iter()
            .find(|r| r.context == context && r.character.as_deref() == character)
    }

    /// Quick actions for a character, or the catalog defaults.
    pub fn quick_actions(&self, character_id: Option<&str>) -> &[String] {
        character_id
            .and_then(|id| self.character(id))
            .filter(|c| !c.quick_actions.is_empty())
            .map(|c| c.quick_actions.as_slice())
            .unwrap_or(self.default_quick_actions.as_slice())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_catalog_loads() {
        let catalog = MentorCatalog::embedded().unwrap();
        assert_eq!(catalog.characters.len(), 7);
        assert!(catalog.character("maya").is_some());
        assert!(catalog.tone("greeting").is_some());
        assert!(catalog.template_pool(GREETING_CONTEXT, None).is_some());
        assert!(catalog.template_pool(RETURN_GREETING_CONTEXT, None).is_some());
    }

    #[test]
    fn test_quick_actions_fall_back_to_defaults() {
        let catalog = MentorCatalog::embedded().unwrap();
        let maya = catalog.quick_actions(Some("maya"));
        assert!(maya.iter().any(|a| a.contains("donor")));
        let unknown = catalog.quick_actions(Some("nobody"));
        assert_eq!(unknown, catalog.default_quick_actions.as_slice());
        assert_eq!(catalog.quick_actions(None), catalog.default_quick_actions.as_slice());
    }

    #[test]
    fn test_duplicate_character_rejected() {
        let json = r#"{
            "base_personality": {"enthusiasm":0.5,"empathy":0.5,"professionalism":0.5,"humor":0.5,"directness":0.5},
            "characters": [
                {"id":"a","name":"A","description":"d","tone":"t"},
                {"id":"a","name":"A2","description":"d","tone":"t"}
            ]
        }"#;
        let err = MentorCatalog::from_json_str(json).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
        assert!(err.to_string().contains("duplicate character id 'a'"));
    }

    #[test]
    fn test_duplicate_tone_rejected() {
        let json = r#"{
            "base_personality": {"enthusiasm":0.5,"empathy":0.5,"professionalism":0.5,"humor":0.5,"directness":0.5},
            "tones": [
                {"id":"calm","modifier":{"humor":0.2}},
                {"id":"calm","modifier":{"empathy":0.9}}
            ]
        }"#;
        let err = MentorCatalog::from_json_str(json).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
        assert!(err.to_string().contains("duplicate tone id 'calm'"));
    }

    #[test]
    fn test_duplicate_template_id_rejected() {
        let json = r#"{
            "base_personality": {"enthusiasm":0.5,"empathy":0.5,"professionalism":0.5,"humor":0.5,"directness":0.5},
            "response_templates": [
                {"id":"g","context":"greeting","templates":["hi"]},
                {"id":"g","context":"return_greeting","templates":["hi again"]}
            ]
        }"#;
        let err = MentorCatalog::from_json_str(json).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
        assert!(err.to_string().contains("duplicate response template id 'g'"));
    }

    #[test]
    fn test_unresolved_placeholders_reported() {
        let json = r#"{
            "base_personality": {"enthusiasm":0.5,"empathy":0.5,"professionalism":0.5,"humor":0.5,"directness":0.5},
            "response_templates": [
                {"id":"g","context":"greeting","templates":["Hi {name}, {mood} day for {topic}!","{mood} again, {org}"],
                 "variables":{"org":"Lyra"}}
            ]
        }"#;
        let catalog = MentorCatalog::from_json_str(json).unwrap();
        assert_eq!(
            catalog.unresolved_placeholders(),
            vec![("g".to_string(), "mood".to_string())]
        );
        assert!(MentorCatalog::embedded().unwrap().unresolved_placeholders().is_empty());
    }

    #[test]
    fn test_out_of_range_override_rejected() {
        let json = r#"{
            "base_personality": {"enthusiasm":0.5,"empathy":0.5,"professionalism":0.5,"humor":0.5,"directness":0.5},
            "tones": [{"id":"loud","modifier":{"enthusiasm":1.7}}]
        }"#;
        let err = MentorCatalog::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("tone 'loud'"));
    }

    #[test]
    fn test_template_with_unknown_owner_rejected() {
        let json = r#"{
            "base_personality": {"enthusiasm":0.5,"empathy":0.5,"professionalism":0.5,"humor":0.5,"directness":0.5},
            "response_templates": [{"id":"g","context":"greeting","character":"ghost","templates":["hi"]}]
        }"#;
        let err = MentorCatalog::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("unknown character 'ghost'"));
    }

    #[test]
    fn test_empty_template_pool_rejected() {
        let json = r#"{
            "base_personality": {"enthusiasm":0.5,"empathy":0.5,"professionalism":0.5,"humor":0.5,"directness":0.5},
            "response_templates": [{"id":"g","context":"greeting","templates":[]}]
        }"#;
        assert!(MentorCatalog::from_json_str(json).is_err());
    }

    #[test]
    fn test_yaml_catalog_from_path() {
        let yaml = r#"
base_personality:
  enthusiasm: 0.6
  empathy: 0.7
  professionalism: 0.8
  humor: 0.2
  directness: 0.9
characters:
  - id: tester
    name: Tess
    description: Synthetic persona
    tone: Dry
    overrides:
      humor: 0.1
"#;
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        let catalog = MentorCatalog::from_path(file.path()).unwrap();
        assert_eq!(catalog.base_personality.directness(), 0.9);
        assert_eq!(catalog.character("tester").unwrap().overrides.humor, Some(0.1));
    }

    #[test]
    fn test_unsupported_extension() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(b"x = 1").unwrap();
        let err = MentorCatalog::from_path(file.path()).unwrap_err();
        assert!(matches!(err, CatalogError::UnsupportedFormat(ref e) if e == "toml"));
    }
}
