//! HTTP routes.
//!
//! Every error body is a JSON object with an `error` field. The chat
//! route additionally contains panics and timeouts from the layers below
//! and answers them with a persona-safe apology.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::{get, post},
};
use futures::FutureExt;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info, warn};

use catalog::{CatalogItem, ItemId};
use intent::{ChatConfig, FALLBACK_REPLY_TEXT, Turn};

use crate::detail_view::DetailView;
use crate::orchestrator::ChatResponse;
use crate::state::AppState;

type AppStateArc = Arc<AppState>;

/// Status plus `{ "error": ... }` body
pub type ApiError = (StatusCode, Json<Value>);

type ApiResult<T> = Result<Json<T>, ApiError>;

pub const LAZY_LOGIN_REASON: &str = "LAZY_LOGIN_REQUIRED";

fn api_error(status: StatusCode, message: &str) -> ApiError {
    (status, Json(json!({ "error": message })))
}

// ============================================================================
// Chat Routes
// ============================================================================

pub fn chat_routes() -> Router<AppStateArc> {
    Router::new().route("/chat", post(chat))
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default, alias = "chatHistory")]
    history: Vec<Turn>,
    #[serde(default, alias = "userConfig")]
    config: ChatConfig,
}

impl ChatRequest {
    /// Validate by hand so every rejection carries a JSON error body
    fn parse(body: &[u8]) -> Result<Self, ApiError> {
        let mut value: Value = serde_json::from_slice(body)
            .map_err(|_| api_error(StatusCode::BAD_REQUEST, "Request body must be a JSON object"))?;

        let has_message = value
            .get("message")
            .and_then(Value::as_str)
            .is_some_and(|message| !message.is_empty());
        if !has_message {
            return Err(api_error(StatusCode::BAD_REQUEST, "Message is required"));
        }

        // Explicit nulls mean "not provided"
        if let Some(object) = value.as_object_mut() {
            object.retain(|_, field| !field.is_null());
        }

        serde_json::from_value(value).map_err(|e| {
            warn!("Rejected chat request: {}", e);
            api_error(StatusCode::BAD_REQUEST, "Invalid history or config")
        })
    }
}

async fn chat(State(state): State<AppStateArc>, body: Bytes) -> ApiResult<ChatResponse> {
    let request = ChatRequest::parse(&body)?;
    info!(
        "Chat message received ({} history turns, persona {})",
        request.history.len(),
        request.config.persona.label()
    );

    let turn = AssertUnwindSafe(state.orchestrator.handle(&request.message, &request.history, &request.config))
        .catch_unwind();

    match tokio::time::timeout(state.request_timeout, turn).await {
        Ok(Ok(response)) => Ok(Json(response)),
        Ok(Err(_)) => {
            error!("Chat turn panicked");
            Err(chat_failure())
        }
        Err(_) => {
            error!("Chat turn timed out after {:?}", state.request_timeout);
            Err(chat_failure())
        }
    }
}

fn chat_failure() -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "채팅 처리 중 오류가 발생했습니다",
            "type": "reply",
            "text": FALLBACK_REPLY_TEXT,
        })),
    )
}

// ============================================================================
// Item Routes
// ============================================================================

pub fn item_routes() -> Router<AppStateArc> {
    Router::new().route("/item/:id", get(item_detail))
}

fn parse_item_id(raw: &str) -> Result<ItemId, ApiError> {
    raw.trim()
        .parse::<ItemId>()
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "Invalid item ID"))
}

async fn item_detail(State(state): State<AppStateArc>, Path(id): Path<String>) -> ApiResult<DetailView> {
    let id = parse_item_id(&id)?;

    match state.enricher.detail_view(id).await {
        Ok(Some(view)) => Ok(Json(view)),
        Ok(None) => {
            info!("Item {} not found in catalog", id);
            Err(api_error(StatusCode::NOT_FOUND, "Item not found"))
        }
        Err(e) => {
            warn!("Catalog lookup failed for item {}: {}", id, e);
            Err(api_error(StatusCode::NOT_FOUND, "Item not found"))
        }
    }
}

// ============================================================================
// Discovery Routes
// ============================================================================

pub fn discovery_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/discovery/trending", get(trending))
        .route("/discovery/upcoming", get(upcoming))
}

async fn trending(State(state): State<AppStateArc>) -> Json<Vec<CatalogItem>> {
    Json(state.discovery.trending().await)
}

async fn upcoming(State(state): State<AppStateArc>) -> Json<Vec<CatalogItem>> {
    Json(state.discovery.upcoming().await)
}

// ============================================================================
// Comment Routes
// ============================================================================

pub fn comment_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/comments", post(post_comment))
        .route("/comments/:id", get(list_comments))
}

/// Only the presence of a bearer token is checked; verifying it belongs
/// to the identity provider in front of this service.
fn require_bearer(headers: &HeaderMap) -> Result<(), ApiError> {
    let has_token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| !token.trim().is_empty());

    if has_token {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "로그인이 필요합니다.",
                "reason": LAZY_LOGIN_REASON,
            })),
        ))
    }
}

async fn post_comment(headers: HeaderMap, body: Bytes) -> ApiResult<Value> {
    require_bearer(&headers)?;

    let missing = || api_error(StatusCode::BAD_REQUEST, "movieId와 commentText가 필요합니다.");
    let value: Value = serde_json::from_slice(&body).map_err(|_| missing())?;

    let item_id = match value.get("movieId") {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| ItemId::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse::<ItemId>().ok(),
        _ => None,
    }
    .ok_or_else(missing)?;

    let comment = value
        .get("commentText")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or_else(missing)?;

    info!("Accepted comment for item {} ({} chars)", item_id, comment.chars().count());
    Ok(Json(json!({
        "success": true,
        "message": "후기가 등록되었습니다!",
    })))
}

async fn list_comments(headers: HeaderMap, Path(id): Path<String>) -> ApiResult<Vec<Value>> {
    require_bearer(&headers)?;
    let id = parse_item_id(&id)?;
    info!("Listing comments for item {}", id);
    Ok(Json(Vec::new()))
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/health", get(health))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
