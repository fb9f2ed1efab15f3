//! Route definitions for the Botsmith API.
//!
//! Provides HTTP endpoints for blueprint generation, playground chat,
//! embed snippets, stateless chat, and health checks.

use crate::blueprint::{create_bot_blueprint, BlueprintRequest};
use crate::playground::chat_with_bot;
use crate::snippets::{build_snippet, Snippet, SnippetLanguage};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use botsmith_common::error::Error;
use botsmith_common::Settings;
use botsmith_gateway::FallbackInvoker;
use botsmith_store::{BotBlueprint, ConversationStore};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ConversationStore>,
    pub invoker: Arc<FallbackInvoker>,
    pub settings: Arc<Settings>,
}

/// Error wrapper mapping the service error to an HTTP response.
///
/// The body shape `{"detail": "..."}` is what the frontend expects.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(%status, error = %self.0, "Request failed");
        }
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

/// Chat message body, shared by the stateless and playground endpoints.
#[derive(Debug, Deserialize)]
pub struct ChatMessageBody {
    pub content: String,
}

/// Chat reply body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Deserialize)]
pub struct SnippetQuery {
    #[serde(default = "default_lang")]
    pub lang: String,
}

fn default_lang() -> String {
    "py".to_string()
}

fn session_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-session-id")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
}

/// Build the full API router over the shared state.
pub fn api_routes(state: AppState) -> Router {
    let v1 = Router::new()
        .route("/ping", get(ping))
        .route("/chat", post(stateless_chat))
        .route("/bots/blueprint", post(post_blueprint))
        .route("/bots/:bot_id/playground", post(post_playground))
        .route("/bots/:bot_id/snippet", get(get_snippet));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", v1)
        .with_state(state)
}

/// Lightweight liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "message": "pong" }))
}

/// Accept a single message and return a generated reply. Stateless: no
/// conversation history is kept.
async fn stateless_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatMessageBody>,
) -> Result<Json<ChatReply>, ApiError> {
    let content = body.content.trim();
    if content.is_empty() {
        return Err(Error::InvalidInput("content must not be empty".to_string()).into());
    }

    let generated = state
        .invoker
        .generate(&content.into())
        .await
        .map_err(Error::from)?;
    Ok(Json(ChatReply {
        reply: generated.text,
    }))
}

/// Turn interview answers into a stored bot blueprint.
///
/// An `X-Session-ID` header, when present, binds that session to the new
/// bot immediately.
async fn post_blueprint(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<BlueprintRequest>,
) -> Result<Json<BotBlueprint>, ApiError> {
    let session_id = session_header(&headers);
    let blueprint = create_bot_blueprint(
        &state.store,
        &state.invoker,
        request,
        session_id.as_deref(),
    )
    .await?;
    Ok(Json(blueprint))
}

/// Chat with a bot in the playground, maintaining per-session history.
async fn post_playground(
    State(state): State<AppState>,
    Path(bot_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<ChatMessageBody>,
) -> Result<Json<ChatReply>, ApiError> {
    let session_id = session_header(&headers).unwrap_or_else(|| "default".to_string());
    let reply = chat_with_bot(
        &state.store,
        &state.invoker,
        &bot_id,
        &session_id,
        &body.content,
    )
    .await?;
    Ok(Json(ChatReply { reply }))
}

/// Copy-paste embed snippet for a bot, in Python or JavaScript.
async fn get_snippet(
    State(state): State<AppState>,
    Path(bot_id): Path<String>,
    Query(query): Query<SnippetQuery>,
) -> Result<Json<Snippet>, ApiError> {
    let language: SnippetLanguage = query.lang.parse()?;
    let blueprint = state
        .store
        .get_blueprint(&bot_id)
        .ok_or_else(|| Error::NotFound(format!("Bot with id {bot_id} was not found")))?;

    let model = state
        .settings
        .preferred_models()
        .into_iter()
        .next()
        .unwrap_or_else(|| state.settings.gemini_model.clone());
    Ok(Json(build_snippet(&blueprint, language, &model)))
}
