//! Axum route handlers for the mentorkit HTTP server.
//!
//! # Routes
//!
//! - `GET  /health`                       : `{"status": "ok", "version": ...}`
//! - `POST /format`                       : raw template → annotated markup + metadata
//! - `POST /plain-text`                   : markup → plain text
//! - `POST /validate`                     : template lint
//! - `POST /metrics`                      : formatting timing and size ratio
//! - `POST /blend`                        : resolve a trait vector
//! - `POST /style`                        : trait-driven text edits
//! - `POST /greeting`                     : pick and fill a greeting
//! - `GET  /characters`                   : character summaries
//! - `GET  /characters/:id/quick-actions` : quick actions for one character
//! - `POST /generate`                     : generate and persist content (503 if disabled)
//! - `GET  /content`                      : stored content, newest first
//! - `GET  /content/:id`                  : one stored record
//! - `POST /content/:id/approval`         : set approval status

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Path, Query, Request, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::catalog::MentorCatalog;
use crate::formatter::{
    format_template_content, get_performance_metrics, to_plain_text, validate_template,
    FormatOptions, ParsedTemplateContent, PerformanceMetrics, TemplateValidation,
};
use crate::generation::{
    ApprovalStatus, ContentService, GeneratedContent, GenerationError, GenerationRequest,
};
use crate::persona::{
    apply_style_edits, blend, GreetingSelector, PersonalityBlender, TemplatePicker, TraitOverride,
    TraitVector,
};
use crate::store::{ContentStore, StoreError};

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: impl std::fmt::Display) -> ApiError {
    (status, Json(json!({ "error": message.to_string() })))
}

/// JSON body extractor whose rejections use the `{"error": ...}` shape.
struct ApiJson<T>(T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(api_error(rejection.status(), rejection.body_text())),
        }
    }
}

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<MentorCatalog>,
    pub blender: PersonalityBlender,
    pub greetings: Arc<GreetingSelector>,
    pub store: Arc<dyn ContentStore>,
    /// Present only when a generator is configured.
    pub content: Option<Arc<ContentService>>,
}

impl AppState {
    pub fn new(catalog: Arc<MentorCatalog>, store: Arc<dyn ContentStore>) -> Self {
        Self {
            blender: PersonalityBlender::new(catalog.clone()),
            greetings: Arc::new(GreetingSelector::random(catalog.clone())),
            catalog,
            store,
            content: None,
        }
    }

    pub fn with_greeting_picker(mut self, picker: Arc<dyn TemplatePicker>) -> Self {
        self.greetings = Arc::new(GreetingSelector::new(self.catalog.clone(), picker));
        self
    }

    pub fn with_content_service(mut self, service: Arc<ContentService>) -> Self {
        self.content = Some(service);
        self
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/format", post(format_handler))
        .route("/plain-text", post(plain_text_handler))
        .route("/validate", post(validate_handler))
        .route("/metrics", post(metrics_handler))
        .route("/blend", post(blend_handler))
        .route("/style", post(style_handler))
        .route("/greeting", post(greeting_handler))
        .route("/characters", get(list_characters_handler))
        .route("/characters/:id/quick-actions", get(quick_actions_handler))
        .route("/generate", post(generate_handler))
        .route("/content", get(list_content_handler))
        .route("/content/:id", get(get_content_handler))
        .route("/content/:id/approval", post(approval_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health: liveness probe.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "mentorkit",
        "generation_enabled": state.content.is_some(),
    }))
}

// ---------------------------------------------------------------------------
// Formatter
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FormatRequest {
    content: String,
    #[serde(default)]
    options: FormatOptions,
}

#[derive(Debug, Serialize)]
struct FormatResponse {
    #[serde(flatten)]
    parsed: ParsedTemplateContent,
    estimated_read_time_minutes: u32,
}

async fn format_handler(ApiJson(req): ApiJson<FormatRequest>) -> Json<FormatResponse> {
    let parsed = format_template_content(&req.content, &req.options);
    let estimated_read_time_minutes = parsed.estimated_read_time_minutes();
    Json(FormatResponse {
        parsed,
        estimated_read_time_minutes,
    })
}

#[derive(Debug, Deserialize)]
struct PlainTextRequest {
    markup: String,
}

async fn plain_text_handler(ApiJson(req): ApiJson<PlainTextRequest>) -> Json<Value> {
    Json(json!({ "text": to_plain_text(&req.markup) }))
}

#[derive(Debug, Deserialize)]
struct ContentBody {
    content: String,
}

async fn validate_handler(ApiJson(req): ApiJson<ContentBody>) -> Json<TemplateValidation> {
    Json(validate_template(&req.content))
}

async fn metrics_handler(ApiJson(req): ApiJson<ContentBody>) -> Json<PerformanceMetrics> {
    Json(get_performance_metrics(&req.content))
}

// ---------------------------------------------------------------------------
// Persona
// ---------------------------------------------------------------------------

/// Explicit vectors win over catalog lookups by id.
#[derive(Debug, Default, Deserialize)]
struct BlendRequest {
    #[serde(default)]
    base: Option<TraitVector>,
    #[serde(default)]
    character_id: Option<String>,
    #[serde(default)]
    tone_id: Option<String>,
    #[serde(default)]
    character_override: Option<TraitOverride>,
    #[serde(default)]
    context_modifier: Option<TraitOverride>,
}

impl BlendRequest {
    fn resolve(&self, state: &AppState) -> TraitVector {
        let base = self.base.unwrap_or_else(|| state.blender.base());
        let character_override = self.character_override.or_else(|| {
            self.character_id
                .as_deref()
                .and_then(|id| state.catalog.character(id))
                .map(|c| c.overrides)
        });
        let context_modifier = self.context_modifier.or_else(|| {
            self.tone_id
                .as_deref()
                .and_then(|id| state.catalog.tone(id))
                .map(|t| t.modifier)
        });
        blend(&base, character_override.as_ref(), context_modifier.as_ref())
    }
}

async fn blend_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BlendRequest>,
) -> Json<TraitVector> {
    Json(req.resolve(&state))
}

#[derive(Debug, Deserialize)]
struct StyleRequest {
    text: String,
    #[serde(default)]
    traits: Option<TraitVector>,
    #[serde(default)]
    character_id: Option<String>,
    #[serde(default)]
    tone_id: Option<String>,
}

async fn style_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<StyleRequest>,
) -> Json<Value> {
    let traits = match req.traits {
        Some(t) => t.clamped(),
        None => state
            .blender
            .resolve(req.character_id.as_deref(), req.tone_id.as_deref()),
    };
    Json(json!({
        "text": apply_style_edits(&req.text, &traits),
        "traits": traits,
    }))
}

#[derive(Debug, Default, Deserialize)]
struct GreetingRequest {
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    character_id: Option<String>,
    #[serde(default)]
    lesson_topic: Option<String>,
    #[serde(default)]
    is_returning_user: bool,
}

async fn greeting_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<GreetingRequest>,
) -> Json<Value> {
    let greeting = state.greetings.select_greeting(
        req.user_name.as_deref(),
        req.character_id.as_deref(),
        req.lesson_topic.as_deref(),
        req.is_returning_user,
    );
    Json(json!({ "greeting": greeting }))
}

async fn list_characters_handler(State(state): State<AppState>) -> Json<Value> {
    let characters: Vec<Value> = state
        .catalog
        .characters
        .iter()
        .map(|c| {
            json!({
                "id": c.id,
                "name": c.name,
                "description": c.description,
                "tone": c.tone,
                "focus_areas": c.focus_areas,
                "traits": state.blender.resolve(Some(c.id.as_str()), None),
                "quick_actions": state.catalog.quick_actions(Some(c.id.as_str())),
            })
        })
        .collect();
    Json(json!({ "characters": characters }))
}

async fn quick_actions_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Value> {
    Json(json!({
        "character_id": id,
        "known_character": state.catalog.character(&id).is_some(),
        "quick_actions": state.catalog.quick_actions(Some(id.as_str())),
    }))
}

// ---------------------------------------------------------------------------
// Generation and stored content
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GenerateBody {
    #[serde(flatten)]
    request: GenerationRequest,
    #[serde(default)]
    user_id: Option<String>,
}

fn generation_status(err: &GenerationError) -> StatusCode {
    match err {
        GenerationError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        GenerationError::UnknownCharacter(_) => StatusCode::NOT_FOUND,
        GenerationError::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
        GenerationError::Http(_)
        | GenerationError::Api { .. }
        | GenerationError::MalformedResponse(_)
        | GenerationError::RetriesExhausted { .. } => StatusCode::BAD_GATEWAY,
        GenerationError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn store_error(err: StoreError) -> ApiError {
    let status = match err {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, err)
}

async fn generate_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GenerateBody>,
) -> Result<(StatusCode, Json<GeneratedContent>), ApiError> {
    let service = state.content.as_ref().ok_or_else(|| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Content generation is not configured",
        )
    })?;

    match service.generate(&body.request, body.user_id).await {
        Ok(content) => {
            tracing::info!(
                id = %content.id,
                character = %content.character_id,
                content_type = %content.content_type,
                "Generated content"
            );
            Ok((StatusCode::CREATED, Json(content)))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Content generation failed");
            Err(api_error(generation_status(&e), e))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ContentQuery {
    #[serde(default)]
    character_id: Option<String>,
}

async fn list_content_handler(
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> Result<Json<Vec<GeneratedContent>>, ApiError> {
    state
        .store
        .list(query.character_id.as_deref())
        .map(Json)
        .map_err(store_error)
}

async fn get_content_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GeneratedContent>, ApiError> {
    match state.store.get(&id).map_err(store_error)? {
        Some(content) => Ok(Json(content)),
        None => Err(store_error(StoreError::NotFound(id))),
    }
}

#[derive(Debug, Deserialize)]
struct ApprovalRequest {
    status: ApprovalStatus,
}

async fn approval_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ApprovalRequest>,
) -> Result<Json<GeneratedContent>, ApiError> {
    let updated = state
        .store
        .set_approval(&id, req.status)
        .map_err(store_error)?;
    tracing::info!(id = %id, status = %req.status, "Approval status updated");
    Ok(Json(updated))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
