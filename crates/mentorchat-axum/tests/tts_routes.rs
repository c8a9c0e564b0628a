//! Integration tests for `/api/tts`, `/health` and generated-audio serving.

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{FAKE_AUDIO, FakeProvider, ProviderMode, body_bytes, body_json, context};
use mentorchat_axum::{ChatUpstreamConfig, CorsConfig, create_router};

fn app(provider: std::sync::Arc<FakeProvider>, public_dir: &std::path::Path) -> Router {
    create_router(
        context(provider, public_dir, ChatUpstreamConfig::default()),
        &CorsConfig::AllowAll,
    )
}

fn post_tts(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/tts")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let tmp = tempfile::tempdir().unwrap();
    let response = app(FakeProvider::new(ProviderMode::Healthy), tmp.path())
        .oneshot(get("/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(&body_bytes(response).await[..], b"OK");
}

#[tokio::test]
async fn synthesize_returns_audio_url_and_serves_the_file() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = FakeProvider::new(ProviderMode::Healthy);
    let app = app(provider.clone(), tmp.path());

    let request = json!({"text": "Chai aur code", "persona": "hitesh"});
    let response = app.clone().oneshot(post_tts(&request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["text"], "Chai aur code");
    assert_eq!(body["persona"], "hitesh");
    assert_eq!(body["message"], "Speech generated successfully");
    let url = body["audioUrl"].as_str().unwrap().to_string();
    assert!(url.starts_with("/generated-audio/hitesh_"));
    assert!(url.ends_with(".mp3"));

    // Second request is a cache hit with the same URL.
    let again = body_json(app.clone().oneshot(post_tts(&request)).await.unwrap()).await;
    assert_eq!(again["audioUrl"], url.as_str());
    assert_eq!(provider.calls(), 1);

    let audio = app.oneshot(get(&url)).await.unwrap();
    assert_eq!(audio.status(), StatusCode::OK);
    assert_eq!(&body_bytes(audio).await[..], FAKE_AUDIO);
}

#[tokio::test]
async fn provider_failure_answers_200_with_fallback_voice() {
    let tmp = tempfile::tempdir().unwrap();
    let response = app(FakeProvider::new(ProviderMode::Failing), tmp.path())
        .oneshot(post_tts(&json!({"text": "Dekhiye", "persona": "piyush"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["audioUrl"].is_null());
    assert_eq!(
        body["voiceConfig"],
        json!({"rate": 0.95, "pitch": 1.1, "volume": 1.0, "voiceIndex": 1})
    );
    assert_eq!(body["message"], "Fallback to client-side synthesis");
    assert!(body["error"].as_str().unwrap().contains("Invalid API key"));
}

#[tokio::test]
async fn missing_fields_are_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = FakeProvider::new(ProviderMode::Healthy);
    let app = app(provider.clone(), tmp.path());

    for body in [
        json!({"persona": "hitesh"}),
        json!({"text": "", "persona": "hitesh"}),
        json!({"text": "Hello"}),
        json!({}),
    ] {
        let response = app.clone().oneshot(post_tts(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(
            body_json(response).await["error"],
            "Missing required fields: text and persona are required."
        );
    }
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn unknown_persona_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let response = app(FakeProvider::new(ProviderMode::Healthy), tmp.path())
        .oneshot(post_tts(&json!({"text": "Hello", "persona": "linus"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Invalid persona. Supported personas: hitesh, piyush"
    );
}

#[tokio::test]
async fn text_over_limit_is_rejected_without_provider_call() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = FakeProvider::new(ProviderMode::Healthy);
    let response = app(provider.clone(), tmp.path())
        .oneshot(post_tts(&json!({"text": "a".repeat(2501), "persona": "hitesh"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Text too long. Maximum 2500 characters allowed."
    );
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn missing_credentials_answer_500() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = FakeProvider::new(ProviderMode::Unconfigured);
    let app = app(provider.clone(), tmp.path());

    let response = app
        .clone()
        .oneshot(post_tts(&json!({"text": "Hello", "persona": "hitesh"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Speech provider API key not configured");
    assert_eq!(body["status"], 500);

    let status = app.oneshot(get("/api/tts")).await.unwrap();
    assert_eq!(status.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn status_lists_personas_and_model() {
    let tmp = tempfile::tempdir().unwrap();
    let response = app(FakeProvider::new(ProviderMode::Healthy), tmp.path())
        .oneshot(get("/api/tts"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "success": true,
            "availablePersonas": ["hitesh", "piyush"],
            "modelId": "eleven_multilingual_v2",
            "message": "TTS service is ready",
        })
    );
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let tmp = tempfile::tempdir().unwrap();
    let request = Request::builder()
        .method("POST")
        .uri("/api/tts")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app(FakeProvider::new(ProviderMode::Healthy), tmp.path())
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}
