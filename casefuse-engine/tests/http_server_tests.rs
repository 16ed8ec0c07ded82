//! HTTP Server & Routing Integration Tests
//! Test File: http_server_tests.rs
//!
//! Drives the router in-process with tower::ServiceExt::oneshot.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use casefuse_engine::api::{validate_request_context, RequestContext};
use casefuse_engine::config::EngineConfig;
use casefuse_engine::{build_router, AppState, MultiSourceDataEngine};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app_state() -> AppState {
    let engine = MultiSourceDataEngine::new(EngineConfig::default()).unwrap();
    AppState::new(Arc::new(engine))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Percent-encode a JSON value for the `sources` query parameter
fn sources_query(sources: Value) -> String {
    urlencoding::encode(&sources.to_string()).into_owned()
}

fn sample_sources() -> Value {
    json!([
        {"id": "memo", "kind": "document-text", "displayName": "Memo", "rawContent": "community healing plan"},
        {"id": "notes", "type": "txt", "name": "Notes", "content": "community meeting"}
    ])
}

/// TC-HTTP-001: GET /health reports ok with version
#[tokio::test]
async fn tc_http_001_health() {
    let app = build_router(test_app_state());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "casefuse-engine");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["uptimeSeconds"].is_u64());
}

/// TC-HTTP-002: POST /process returns the full analysis in the envelope
#[tokio::test]
async fn tc_http_002_process_success() {
    // Given: two text sources sharing "community"
    let app = build_router(test_app_state());

    // When: POST /api/v1/multi-source/process
    let response = app
        .oneshot(post_json(
            "/api/v1/multi-source/process",
            json!({ "sources": sample_sources() }),
        ))
        .await
        .unwrap();

    // Then: 200 with analysis, echoed metrics and request id header
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["analysis"]["insights"].as_array().unwrap().len(), 1);
    assert_eq!(body["analysis"]["personaInsights"].as_array().unwrap().len(), 12);
    assert_eq!(body["analysis"]["recommendations"].as_array().unwrap().len(), 1);
    assert_eq!(body["metrics"]["sourceCount"], 2);
    assert!(body["message"].is_string());
    assert!(body["requestId"].is_string());
}

/// TC-HTTP-003: empty or missing sources → 400
#[tokio::test]
async fn tc_http_003_empty_sources_rejected() {
    for payload in [json!({ "sources": [] }), json!({})] {
        let app = build_router(test_app_state());
        let response = app
            .oneshot(post_json("/api/v1/multi-source/process", payload))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }
}

/// TC-HTTP-004: source missing its name → 400
#[tokio::test]
async fn tc_http_004_source_without_name_rejected() {
    let app = build_router(test_app_state());
    let response = app
        .oneshot(post_json(
            "/api/v1/multi-source/process",
            json!({ "sources": [{ "id": "a", "kind": "txt", "content": "x" }] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"]["message"].as_str().unwrap().contains("no name"));
}

/// TC-HTTP-005: body that is not JSON → 400 with structured error
#[tokio::test]
async fn tc_http_005_malformed_body_rejected() {
    let app = build_router(test_app_state());
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/multi-source/process")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

/// TC-HTTP-006: every source failing → 500 EMPTY_SOURCE_SET, recorded in /health
#[tokio::test]
async fn tc_http_006_all_sources_failed() {
    let state = test_app_state();
    let app = build_router(state.clone());

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/multi-source/process",
            json!({ "sources": [{ "id": "f", "kind": "fax", "name": "Fax" }] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "EMPTY_SOURCE_SET");

    let health = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let health = body_json(health).await;
    assert_eq!(health["status"], "degraded");
    assert!(health["lastError"].is_string());
}

/// TC-HTTP-007: unknown persona → 404
#[tokio::test]
async fn tc_http_007_unknown_persona() {
    // Given: a persona id outside the roster
    let app = build_router(test_app_state());

    // When: GET /api/v1/multi-source/personas/unknown-id
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/multi-source/personas/unknown-id")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Then: 404 naming the persona
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "PERSONA_NOT_FOUND");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("unknown-id"));
}

/// TC-HTTP-008: known persona returns its insight
#[tokio::test]
async fn tc_http_008_persona_insight() {
    let app = build_router(test_app_state());
    let uri = format!(
        "/api/v1/multi-source/personas/guardian?sources={}",
        sources_query(sample_sources())
    );

    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["personaInsight"]["personaId"], "guardian");
    assert_eq!(body["personaInsight"]["viewpoints"].as_array().unwrap().len(), 3);
}

/// TC-HTTP-009: known persona without sources → 400
#[tokio::test]
async fn tc_http_009_persona_without_sources() {
    let app = build_router(test_app_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/multi-source/personas/sage")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// TC-HTTP-010: recommendations route
#[tokio::test]
async fn tc_http_010_recommendations() {
    let app = build_router(test_app_state());
    let uri = format!(
        "/api/v1/multi-source/recommendations?sources={}",
        sources_query(sample_sources())
    );

    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let recommendations = body["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0]["id"], "recommendation-001");
    assert_eq!(recommendations[0]["actions"][0]["estimatedDuration"], "1 hour");
}

/// TC-HTTP-011: evolution summary is metrics only
#[tokio::test]
async fn tc_http_011_evolution_summary() {
    let app = build_router(test_app_state());
    let uri = format!(
        "/api/v1/multi-source/consciousness-evolution?sources={}",
        sources_query(sample_sources())
    );

    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["aggregateMetrics"]["insightCount"], 1);
    assert_eq!(
        body["aggregateWisdomGraph"]["connections"],
        json!(["memo", "notes"])
    );
    assert!(body.get("analysis").is_none());
}

/// Stores a context that lacks the `process` category
async fn attach_partial_context(mut request: Request<Body>, next: Next) -> Response {
    let mut context = RequestContext::new();
    context.categories.retain(|c| c != "process");
    request.extensions_mut().insert(context);
    next.run(request).await
}

/// TC-HTTP-012: context validation rejects incomplete or absent contexts
#[tokio::test]
async fn tc_http_012_request_context_validation() {
    // Given: a route behind validate_request_context with a partial context
    let partial = Router::new()
        .route("/guarded", get(|| async { "ok" }))
        .layer(middleware::from_fn(validate_request_context))
        .layer(middleware::from_fn(attach_partial_context));

    // When: the route is called
    let response = partial
        .oneshot(Request::builder().uri("/guarded").body(Body::empty()).unwrap())
        .await
        .unwrap();

    // Then: 400 naming the missing category
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["error"]["message"].as_str().unwrap().contains("process"));

    // No context attached at all is rejected the same way
    let bare = Router::new()
        .route("/guarded", get(|| async { "ok" }))
        .layer(middleware::from_fn(validate_request_context));
    let response = bare
        .oneshot(Request::builder().uri("/guarded").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
