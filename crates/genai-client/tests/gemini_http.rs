use genai_client::{ChatTurn, GeminiClient, GeminiConfig, GenAiError, GenerationRequest, TextGenerator};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::new(GeminiConfig {
        base_url: server.uri(),
        api_key: Some("secret".to_string()),
        model: "gemini-2.0-flash".to_string(),
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_generate_returns_first_text_part() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/gemini-2.0-flash:generateContent"))
        .and(header("x-goog-api-key", "secret"))
        .and(body_partial_json(json!({
            "generationConfig": { "temperature": 0.5 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": "{\"type\":\"reply\"}" }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = GenerationRequest::new("안녕")
        .with_history(vec![ChatTurn::user("hi"), ChatTurn::model("hello")])
        .with_temperature(0.5)
        .expect_json();
    let text = client_for(&server).generate(&request).await.unwrap();
    assert_eq!(text, "{\"type\":\"reply\"}");
}

#[tokio::test]
async fn test_api_error_carries_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "code": 429, "message": "quota exceeded", "status": "RESOURCE_EXHAUSTED" }
        })))
        .mount(&server)
        .await;

    let result = client_for(&server).generate(&GenerationRequest::new("hi")).await;
    match result {
        Err(GenAiError::Api { status, message }) => {
            assert_eq!(status, 429);
            assert_eq!(message, "quota exceeded");
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_no_candidates_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let result = client_for(&server).generate(&GenerationRequest::new("hi")).await;
    assert!(matches!(result, Err(GenAiError::EmptyResponse)));
}

#[tokio::test]
async fn test_transport_error_never_exposes_api_key() {
    let client = GeminiClient::new(GeminiConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        api_key: Some("secret".to_string()),
        ..Default::default()
    })
    .unwrap();

    let err = client.generate(&GenerationRequest::new("hi")).await.unwrap_err();
    assert!(matches!(err, GenAiError::Http(_)));
    assert!(!err.to_string().contains("secret"), "{}", err);
}
