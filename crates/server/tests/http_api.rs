//! In-process tests for the HTTP routes, driven through `tower::ServiceExt::oneshot`.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use cache_store::{ManualClock, MemoryCacheStore};
use catalog::InMemoryCatalog;
use genai_client::{GenAiError, GenerationRequest, TextGenerator};
use intent::FALLBACK_REPLY_TEXT;
use server::{AppConfig, AppState, Services, build_router};

/// Answers by request shape: classification (has a system instruction),
/// excerpt translation (JSON requested), or commentary
struct ShapedGenerator {
    classification: String,
    calls: AtomicUsize,
}

impl ShapedGenerator {
    fn new(classification: &str) -> Arc<Self> {
        Arc::new(Self {
            classification: classification.to_string(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TextGenerator for ShapedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenAiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if request.system_instruction.is_some() {
            Ok(self.classification.clone())
        } else if request.json_response {
            Ok(r#"["날카로운 풍자 미쳤음 🔥", "아직도 먹힌다 ⭐"]"#.to_string())
        } else {
            Ok("\"첫 번째 규칙은 말하지 않기 🤫\"".to_string())
        }
    }
}

/// Never answers in time
struct StalledGenerator;

#[async_trait]
impl TextGenerator for StalledGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenAiError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(GenAiError::EmptyResponse)
    }
}

struct PanickingGenerator;

#[async_trait]
impl TextGenerator for PanickingGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenAiError> {
        panic!("generator exploded");
    }
}

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../catalog/tests/fixtures/catalog.json")
}

fn app_with(generator: Arc<dyn TextGenerator>, request_timeout_secs: u64) -> Router {
    let catalog = InMemoryCatalog::load_from_file(&fixture_path()).unwrap();
    let mut config = AppConfig::default();
    config.server.request_timeout_secs = request_timeout_secs;

    let services = Services {
        catalog: Arc::new(catalog),
        classifier_model: generator.clone(),
        enrichment_model: generator,
        store: Arc::new(MemoryCacheStore::new()),
        clock: Arc::new(ManualClock::default()),
    };
    build_router(Arc::new(AppState::assemble(services, &config)))
}

fn app(generator: Arc<dyn TextGenerator>) -> Router {
    app_with(generator, 30)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

// ============================================================================
// Chat
// ============================================================================

#[tokio::test]
async fn test_chat_recommends_and_skips_seen_items() {
    let generator = ShapedGenerator::new(r#"{"type":"reply","text":"힘내!","keywords":[]}"#);
    let request = post_json(
        "/chat",
        json!({
            "message": "우울한데 추천해줘",
            "chatHistory": [],
            "userConfig": {"persona": "다정한 친구", "seen_list_tmdb_ids": [13]}
        }),
    );

    let (status, body) = send(app(generator.clone()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "recommendation");
    assert_eq!(body["keywords"], json!(["comedy", "feel-good"]));

    let recommendations = body["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0]["id"], 346698);
    assert_eq!(recommendations[0]["posterRef"], "/barbie.jpg");
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_chat_search_returns_single_item() {
    let generator = ShapedGenerator::new(
        r#"{"type":"search_result","text":"인셉션 찾았어!","keywords":["Inception"]}"#,
    );
    let (status, body) = send(
        app(generator),
        post_json("/chat", json!({"message": "인셉션 어때?"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "search_result");
    assert_eq!(body["recommendations"][0]["id"], 27205);
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_chat_reply_has_no_recommendations() {
    let generator = ShapedGenerator::new(r#"{"type":"reply","text":"나도 피자 좋아해 🍕","keywords":[]}"#);
    let (status, body) = send(app(generator), post_json("/chat", json!({"message": "피자 먹었어"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "reply");
    assert_eq!(body["text"], "나도 피자 좋아해 🍕");
    assert!(body.get("recommendations").is_none());
}

#[tokio::test]
async fn test_chat_requires_message() {
    let generator = ShapedGenerator::new("{}");
    let (status, body) = send(app(generator), post_json("/chat", json!({"chatHistory": []}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Message is required");
}

#[tokio::test]
async fn test_chat_panic_becomes_apology() {
    let (status, body) = send(
        app(Arc::new(PanickingGenerator)),
        post_json("/chat", json!({"message": "피자 먹었어"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["type"], "reply");
    assert_eq!(body["text"], FALLBACK_REPLY_TEXT);
}

#[tokio::test]
async fn test_chat_timeout_becomes_apology() {
    let (status, body) = send(
        app_with(Arc::new(StalledGenerator), 1),
        post_json("/chat", json!({"message": "피자 먹었어"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["text"], FALLBACK_REPLY_TEXT);
}

// ============================================================================
// Item Detail
// ============================================================================

#[tokio::test]
async fn test_item_detail_view() {
    let generator = ShapedGenerator::new("{}");
    let (status, body) = send(app(generator.clone()), get("/item/550")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Fight Club");
    assert_eq!(body["year"], "1999");
    assert_eq!(body["runtime"], "139분");
    assert_eq!(body["genre"], "드라마");
    assert_eq!(body["posterUrl"], "https://image.tmdb.org/t/p/w500/fight.jpg");
    assert_eq!(body["commentary"], "첫 번째 규칙은 말하지 않기 🤫");
    assert_eq!(body["platforms"][0]["name"], "Netflix");
    assert_eq!(body["cast"].as_array().unwrap().len(), 2);

    let excerpts = body["excerpts"].as_array().unwrap();
    assert_eq!(excerpts.len(), 3);
    assert_eq!(excerpts[0], "날카로운 풍자 미쳤음 🔥");
    assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_item_detail_errors() {
    let generator = ShapedGenerator::new("{}");
    let (status, body) = send(app(generator.clone()), get("/item/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid item ID");

    let (status, _) = send(app(generator), get("/item/424242")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Discovery, Comments, Health
// ============================================================================

#[tokio::test]
async fn test_discovery_lists() {
    let generator = ShapedGenerator::new("{}");
    let (status, body) = send(app(generator.clone()), get("/discovery/trending")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = body.as_array().unwrap().iter().map(|item| item["id"].clone()).collect();
    assert_eq!(ids, vec![json!(346698), json!(27205)]);

    let (status, body) = send(app(generator), get("/discovery/upcoming")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["title"], "Interstellar");
}

#[tokio::test]
async fn test_comments_require_bearer_token() {
    let generator = ShapedGenerator::new("{}");
    let request = post_json("/comments", json!({"movieId": 550, "commentText": "최고"}));
    let (status, body) = send(app(generator.clone()), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["reason"], "LAZY_LOGIN_REQUIRED");

    let (status, _) = send(app(generator), get("/comments/550")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_comments_with_token() {
    let generator = ShapedGenerator::new("{}");
    let authed = |builder: axum::http::request::Builder| builder.header(header::AUTHORIZATION, "Bearer t0ken");

    let request = authed(Request::post("/comments"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"movieId": 550, "commentText": "인생 영화"}).to_string()))
        .unwrap();
    let (status, body) = send(app(generator.clone()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let request = authed(Request::post("/comments"))
        .body(Body::from(json!({"movieId": 550}).to_string()))
        .unwrap();
    let (status, _) = send(app(generator.clone()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = authed(Request::get("/comments/550")).body(Body::empty()).unwrap();
    let (status, body) = send(app(generator.clone()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let request = authed(Request::get("/comments/abc")).body(Body::empty()).unwrap();
    let (status, _) = send(app(generator), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(app(ShapedGenerator::new("{}")), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
