//! HTTP contract tests for the generation routes, driven through the router
//! with a scripted in-process provider.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use garment_studio::api::create_app_router;
use garment_studio::generation::{
    GeneratedImage, GenerationOrchestrator, ImageGenerationParams, ImageProvider, ProviderError,
    RetryPolicy,
};
use http_body_util::BodyExt;
use hyper::{Request, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;
use tower::ServiceExt;

// ── Fake provider ──────────────────────────────────────────────

type Scripted = Result<String, ProviderError>;

struct FakeProvider {
    script: Mutex<VecDeque<Scripted>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeProvider {
    fn new(script: Vec<Scripted>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageProvider for FakeProvider {
    async fn generate(
        &self,
        params: &ImageGenerationParams,
    ) -> Result<GeneratedImage, ProviderError> {
        self.prompts.lock().unwrap().push(params.prompt.clone());
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(b64_json)) => Ok(GeneratedImage { b64_json }),
            Some(Err(e)) => Err(e),
            None => Err(ProviderError::InvalidResponse("script exhausted".into())),
        }
    }
}

fn api_error(status: u16, error_type: &str, code: &str, param: Option<&str>) -> ProviderError {
    ProviderError::Api {
        status,
        message: format!("upstream {status}"),
        error_type: Some(error_type.into()),
        code: Some(code.into()),
        param: param.map(str::to_string),
    }
}

// ── Helpers ────────────────────────────────────────────────────

fn app(provider: Arc<FakeProvider>) -> axum::Router {
    app_with_limit(provider, 50 * 1024 * 1024)
}

fn app_with_limit(provider: Arc<FakeProvider>, limit: usize) -> axum::Router {
    let orchestrator = Arc::new(GenerationOrchestrator::new(provider, RetryPolicy::default()));
    create_app_router(orchestrator, limit)
}

fn post_prompt(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/dalle")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(
        |_| json!({ "raw": String::from_utf8_lossy(&bytes).to_string() }),
    )
}

// ── Probes ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_root_probe() {
    let resp = app(FakeProvider::new(vec![]))
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({ "message": "Hello from DALL.E" }));
}

#[tokio::test]
async fn test_routes_probe() {
    let resp = app(FakeProvider::new(vec![]))
        .oneshot(
            Request::builder()
                .uri("/api/v1/dalle")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({ "message": "Hello from DALL.E ROUTES" })
    );
}

// ── Generation ─────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_generate_success() {
    let provider = FakeProvider::new(vec![Ok("iVBORw0KGgo=".into())]);
    let resp = app(provider.clone())
        .oneshot(post_prompt(json!({ "prompt": "a tiger logo" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({ "photo": "iVBORw0KGgo=" }));
    assert_eq!(provider.prompts(), vec!["a tiger logo".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_forbidden_then_success_retries_once() {
    let provider = FakeProvider::new(vec![
        Err(api_error(403, "invalid_request_error", "billing", None)),
        Ok("SECOND".into()),
    ]);
    let resp = app(provider.clone())
        .oneshot(post_prompt(json!({ "prompt": "stripes" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({ "photo": "SECOND" }));
    assert_eq!(provider.prompts().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_passes_details_through() {
    let provider = FakeProvider::new(vec![
        Err(api_error(429, "requests", "rate_limit_exceeded", None)),
        Err(api_error(429, "requests", "rate_limit_exceeded", Some("n"))),
    ]);
    let resp = app(provider.clone())
        .oneshot(post_prompt(json!({ "prompt": "stripes" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        body_json(resp).await,
        json!({
            "message": "Rate limit exceeded: Too many requests or quota exceeded",
            "error": { "type": "requests", "code": "rate_limit_exceeded", "param": "n" }
        })
    );
    assert_eq!(provider.prompts().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_content_policy_rejection() {
    let provider = FakeProvider::new(vec![
        Err(api_error(400, "invalid_request_error", "content_policy_violation", None)),
        Err(api_error(400, "invalid_request_error", "content_policy_violation", None)),
    ]);
    let resp = app(provider)
        .oneshot(post_prompt(json!({ "prompt": "something nasty" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(
        body["message"],
        "The prompt may violate content policies or contains invalid parameters"
    );
    assert_eq!(body["error"]["code"], "content_policy_violation");
    assert_eq!(body["error"]["param"], serde_json::Value::Null);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_failure_hides_internals() {
    let provider = FakeProvider::new(vec![
        Err(ProviderError::Timeout(Duration::from_secs(30))),
        Err(ProviderError::InvalidResponse("secret internal detail".into())),
    ]);
    let resp = app(provider)
        .oneshot(post_prompt(json!({ "prompt": "x" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(resp).await,
        json!({
            "message": "Something went wrong generating the image",
            "error": { "type": "unknown_error", "code": null, "param": null }
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_empty_and_missing_prompt_reach_provider() {
    let provider = FakeProvider::new(vec![Ok("A".into()), Ok("B".into())]);
    let router = app(provider.clone());

    let resp = router
        .clone()
        .oneshot(post_prompt(json!({ "prompt": "" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = router.oneshot(post_prompt(json!({}))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    assert_eq!(provider.prompts(), vec![String::new(), String::new()]);
}

fn invalid_request_body() -> serde_json::Value {
    json!({
        "message": "The prompt may violate content policies or contains invalid parameters",
        "error": { "type": "unknown_error", "code": null, "param": null }
    })
}

#[tokio::test(start_paused = true)]
async fn test_null_prompt_reaches_provider() {
    let provider = FakeProvider::new(vec![Ok("A".into())]);
    let resp = app(provider.clone())
        .oneshot(post_prompt(json!({ "prompt": null })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(provider.prompts(), vec![String::new()]);
}

#[tokio::test]
async fn test_malformed_bodies_use_error_envelope() {
    let provider = FakeProvider::new(vec![]);
    let router = app(provider.clone());

    let requests = vec![
        post_prompt(json!({ "prompt": 5 })),
        Request::builder()
            .method("POST")
            .uri("/api/v1/dalle")
            .header("content-type", "application/json")
            .body(Body::from("not json"))
            .unwrap(),
        Request::builder()
            .method("POST")
            .uri("/api/v1/dalle")
            .header("content-type", "text/plain")
            .body(Body::from(r#"{"prompt":"a cat"}"#))
            .unwrap(),
    ];

    for request in requests {
        let resp = router.clone().oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await, invalid_request_body());
    }
    assert!(provider.prompts().is_empty());
}

// ── Layers ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_body_limit() {
    let provider = FakeProvider::new(vec![Ok("A".into())]);
    let prompt = "x".repeat(4096);
    let resp = app_with_limit(provider.clone(), 1024)
        .oneshot(post_prompt(json!({ "prompt": prompt })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await, invalid_request_body());
    assert!(provider.prompts().is_empty());
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let resp = app(FakeProvider::new(vec![]))
        .oneshot(
            Request::builder()
                .uri("/api/v1/dalle")
                .header("origin", "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
