//! Character-voiced content generation.
//!
//! A [`ContentService`] turns a [`GenerationRequest`] into a persisted
//! [`GeneratedContent`] record: it looks the character up in the catalog,
//! builds the system and user prompts, asks a [`ContentGenerator`] for the
//! body (and, except for lessons, a title), then saves the result with a
//! pending approval status.
//!
//! The generator is a seam: [`http::HttpContentGenerator`] talks to an
//! OpenAI-compatible chat-completions endpoint, tests plug in a scripted
//! mock.

pub mod error;
pub mod http;

pub use error::GenerationError;
pub use http::HttpContentGenerator;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{CharacterProfile, MentorCatalog};
use crate::store::ContentStore;

/// Pattern guidance used when the request carries none.
pub const DEFAULT_PATTERNS: &str = "Focus on personalization and data-driven approaches";
/// Audience used when the request carries none.
pub const DEFAULT_AUDIENCE: &str = "nonprofit professionals";
/// Model used when the character does not name one.
pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-001";
/// Content type that skips title generation.
pub const LESSON_CONTENT_TYPE: &str = "lesson";

const CONTENT_TEMPERATURE: f32 = 0.7;
const CONTENT_MAX_TOKENS: u32 = 1500;
const TITLE_TEMPERATURE: f32 = 0.5;
const TITLE_MAX_TOKENS: u32 = 50;
const TITLE_EXCERPT_CHARS: usize = 200;

// ============================================================================
// Records
// ============================================================================

/// Inbound generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub character_id: String,
    pub content_type: String,
    pub topic: String,
    /// Replaces the generated user prompt verbatim when present.
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
    /// Pattern guidance folded into the system prompt.
    #[serde(default)]
    pub patterns: Option<String>,
}

impl GenerationRequest {
    pub fn new(
        character_id: impl Into<String>,
        content_type: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            character_id: character_id.into(),
            content_type: content_type.into(),
            topic: topic.into(),
            context: None,
            target_audience: None,
            patterns: None,
        }
    }

    /// Check that every required field is non-blank.
    pub fn validate(&self) -> Result<(), GenerationError> {
        for (field, value) in [
            ("character_id", &self.character_id),
            ("content_type", &self.content_type),
            ("topic", &self.topic),
        ] {
            if value.trim().is_empty() {
                return Err(GenerationError::InvalidRequest(format!(
                    "{} is required",
                    field
                )));
            }
        }
        Ok(())
    }

    fn patterns(&self) -> &str {
        non_blank(self.patterns.as_deref()).unwrap_or(DEFAULT_PATTERNS)
    }

    fn target_audience(&self) -> &str {
        non_blank(self.target_audience.as_deref()).unwrap_or(DEFAULT_AUDIENCE)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Request parameters stored alongside the generated body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    pub topic: String,
    #[serde(default)]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub patterns: Option<String>,
}

/// Review state of a generated record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" => Ok(ApprovalStatus::Rejected),
            other => Err(format!("unknown approval status '{}'", other)),
        }
    }
}

/// A generated, persisted piece of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub character_id: String,
    pub content_type: String,
    pub title: String,
    pub content: String,
    pub metadata: GenerationMetadata,
    pub approval_status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
}

impl GeneratedContent {
    /// New pending record stamped with a fresh id and the current time.
    pub fn new(
        user_id: Option<String>,
        character_id: &str,
        content_type: &str,
        title: &str,
        content: &str,
        metadata: GenerationMetadata,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            character_id: character_id.to_string(),
            content_type: content_type.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            metadata,
            approval_status: ApprovalStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// Generator seam
// ============================================================================

/// One system + user prompt exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Anything that can answer a [`CompletionRequest`] with text.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError>;
}

// ============================================================================
// Prompts
// ============================================================================

/// System prompt establishing the character's voice for `content_type`.
pub fn build_system_prompt(character: &CharacterProfile, content_type: &str, patterns: &str) -> String {
    let expertise = character.focus_areas.join(", ");
    let name = &character.name;
    format!(
        "You are {name}, a {description}.\n\
         Your communication style is {tone}.\n\
         Your expertise areas are: {expertise}.\n\
         \n\
         Create {content_type} content that:\n\
         1. Maintains {name}'s unique voice and personality\n\
         2. Applies these proven engagement patterns: {patterns}\n\
         3. Adapts those data-driven methods to your specific expertise area\n\
         4. Provides actionable, practical advice\n\
         5. Engages the target audience effectively\n\
         \n\
         The content should feel authentically {name} while leveraging proven engagement strategies.",
        description = character.description,
        tone = character.tone,
    )
}

/// User prompt: the request's context verbatim, or one built from its fields.
pub fn build_user_prompt(request: &GenerationRequest, character: &CharacterProfile) -> String {
    if let Some(context) = non_blank(request.context.as_deref()) {
        return context.to_string();
    }
    format!(
        "Create {} content about \"{}\" for {}.\n\
         Apply the proven engagement patterns while maintaining {}'s unique voice and expertise.",
        request.content_type,
        request.topic,
        request.target_audience(),
        character.name
    )
}

/// Title used when title generation is unavailable or fails.
pub fn fallback_title(character: &CharacterProfile, content_type: &str, topic: &str) -> String {
    format!("{}'s {} on {}", character.name, content_type, topic)
}

/// Drop every single and double quote from a generated title.
pub fn strip_quotes(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '"' && *c != '\'')
        .collect::<String>()
        .trim()
        .to_string()
}

// ============================================================================
// Service
// ============================================================================

/// Generates character content and persists it.
pub struct ContentService {
    catalog: Arc<MentorCatalog>,
    generator: Arc<dyn ContentGenerator>,
    store: Arc<dyn ContentStore>,
    default_model: String,
}

impl fmt::Debug for ContentService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentService")
            .field("default_model", &self.default_model)
            .field("store", &self.store)
            .finish()
    }
}

impl ContentService {
    pub fn new(
        catalog: Arc<MentorCatalog>,
        generator: Arc<dyn ContentGenerator>,
        store: Arc<dyn ContentStore>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            generator,
            store,
            default_model: default_model.into(),
        }
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    /// Model for `character`: its own, else the configured default.
    pub fn model_for(&self, character: &CharacterProfile) -> String {
        character
            .model
            .clone()
            .unwrap_or_else(|| self.default_model.clone())
    }

    /// Validate, generate, title and persist one piece of content.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        user_id: Option<String>,
    ) -> Result<GeneratedContent, GenerationError> {
        request.validate()?;
        let character = self
            .catalog
            .character(&request.character_id)
            .ok_or_else(|| GenerationError::UnknownCharacter(request.character_id.clone()))?;

        let model = self.model_for(character);
        log::debug!(
            "ContentService::generate: character={}, content_type={}, model={}",
            character.id,
            request.content_type,
            model
        );

        let body = self
            .generator
            .complete(&CompletionRequest {
                model: model.clone(),
                system: build_system_prompt(character, &request.content_type, request.patterns()),
                user: build_user_prompt(request, character),
                temperature: CONTENT_TEMPERATURE,
                max_tokens: CONTENT_MAX_TOKENS,
            })
            .await?;
        if body.trim().is_empty() {
            return Err(GenerationError::MalformedResponse(
                "generator returned empty content".to_string(),
            ));
        }

        let title = if request.content_type == LESSON_CONTENT_TYPE {
            request.topic.clone()
        } else {
            self.generate_title(character, request, &model, &body).await
        };

        let content = GeneratedContent::new(
            user_id,
            &character.id,
            &request.content_type,
            &title,
            &body,
            GenerationMetadata {
                topic: request.topic.clone(),
                target_audience: request.target_audience.clone(),
                patterns: Some(request.patterns().to_string()),
            },
        );
        self.store.save(&content)?;
        Ok(content)
    }

    async fn generate_title(
        &self,
        character: &CharacterProfile,
        request: &GenerationRequest,
        model: &str,
        body: &str,
    ) -> String {
        let excerpt: String = body.chars().take(TITLE_EXCERPT_CHARS).collect();
        let title_request = CompletionRequest {
            model: model.to_string(),
            system: format!(
                "Generate a compelling title for this {} content in {}'s voice.",
                request.content_type, character.name
            ),
            user: format!("Content: {}...", excerpt),
            temperature: TITLE_TEMPERATURE,
            max_tokens: TITLE_MAX_TOKENS,
        };

        match self.generator.complete(&title_request).await {
            Ok(raw) => {
                let title = strip_quotes(&raw);
                if title.is_empty() {
                    fallback_title(character, &request.content_type, &request.topic)
                } else {
                    title
                }
            }
            Err(e) => {
                log::warn!("Title generation failed, using fallback: {}", e);
                fallback_title(character, &request.content_type, &request.topic)
            }
        }
    }
}
