use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use serde_json::json;
use task_api::{build_router, ApiState, IpRateLimiter};
use task_core::EventRow;
use task_kb::AnswerBank;
use task_llm::HttpGenerativeClient;
use task_observability::AppMetrics;
use task_records::{RecordStore, Store};
use task_router::QueryRouter;
use tower::ServiceExt;

const API_KEY: &str = "dev-task-key";

/// State over a fresh memory store with no generative credentials, so
/// Tier-2 always takes the apology path.
fn test_state(ingest_secret: Option<&str>, rate_limit_max: usize) -> ApiState {
    let store = Arc::new(Store::memory());
    let metrics = AppMetrics::shared();
    let router = Arc::new(QueryRouter::new(
        Arc::new(AnswerBank::builtin()),
        Arc::clone(&store),
        Arc::new(HttpGenerativeClient::new(None).expect("client should build")),
        metrics.clone(),
    ));

    ApiState {
        router,
        store,
        metrics,
        api_key: API_KEY.to_string(),
        limiter: IpRateLimiter::new(Duration::from_secs(60), rate_limit_max),
        ingest_secret: ingest_secret.map(str::to_string),
        generative_configured: false,
        sqlite_backed: false,
    }
}

fn test_app(ingest_secret: Option<&str>, rate_limit_max: usize) -> axum::Router {
    build_router(test_state(ingest_secret, rate_limit_max))
}

fn chat_request(payload: serde_json::Value, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/v1/chat")
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(payload.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_is_public_and_reports_metrics() {
    let app = test_app(None, 100);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = json_body(response).await;
    assert_eq!(parsed["status"], "ok");
    assert!(parsed["metrics"]["requests_total"].is_u64());
    assert_eq!(parsed["capabilities"]["generative"], false);
}

#[tokio::test]
async fn chat_requires_api_key() {
    let app = test_app(None, 100);

    let response = app
        .oneshot(chat_request(json!({ "text": "hello" }), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn canned_chat_answer_carries_source_and_topic() {
    let app = test_app(None, 100);

    let response = app
        .oneshot(chat_request(
            json!({ "text": "when is the next culinary class" }),
            Some(API_KEY),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = json_body(response).await;
    assert_eq!(parsed["source"], "canned");
    assert_eq!(parsed["topic"], "culinary");
    assert!(parsed["text"].as_str().unwrap().contains("Next start: 2025-10-08"));
}

#[tokio::test]
async fn sticky_topic_follow_up_over_http() {
    let app = test_app(None, 100);

    let response = app
        .oneshot(chat_request(
            json!({ "text": "cost?", "last_topic": "forklift" }),
            Some(API_KEY),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = json_body(response).await;
    assert_eq!(parsed["topic"], "forklift");
    assert!(parsed["text"].as_str().unwrap().contains("Cost: Free."));
}

#[tokio::test]
async fn unknown_query_without_credentials_yields_apology() {
    let app = test_app(None, 100);

    let response = app
        .oneshot(chat_request(
            json!({ "text": "zxqwv zebra parade" }),
            Some(API_KEY),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = json_body(response).await;
    assert_eq!(parsed["source"], "apology");
    assert!(parsed["text"].as_str().unwrap().contains("(609) 695-5456"));
}

#[tokio::test]
async fn jobs_ingest_is_guarded_and_rows_become_listable() {
    let app = test_app(Some("topsecret"), 100);

    let payload = json!({
        "jobs": [
            {
                "jobTitle": "Warehouse Associate",
                "employer": "Mercer Logistics",
                "city": "Ewing, NJ",
                "summary": "Day shift, forklift certification preferred.",
                "url": "https://example.org/apply"
            }
        ]
    });

    let unauthorized = Request::builder()
        .method("POST")
        .uri("/v1/jobs/ingest")
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from(payload.to_string()))
        .unwrap();
    let response = app.clone().oneshot(unauthorized).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let authorized = Request::builder()
        .method("POST")
        .uri("/v1/jobs/ingest")
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .header("x-ingest-secret", "topsecret")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let response = app.clone().oneshot(authorized).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let parsed = json_body(response).await;
    assert_eq!(parsed["saved"], 1);

    let listing = Request::builder()
        .uri("/v1/jobs?q=warehouse")
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(listing).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let parsed = json_body(response).await;
    assert_eq!(parsed["items"].as_array().unwrap().len(), 1);
    assert_eq!(parsed["items"][0]["title"], "Warehouse Associate");
}

#[tokio::test]
async fn events_listing_returns_upcoming_rows_only() {
    fn event(name: &str, date: Option<NaiveDate>) -> EventRow {
        EventRow {
            name: name.to_string(),
            description: String::new(),
            date,
            time: None,
            location: None,
            signup_link: None,
        }
    }

    let state = test_state(None, 100);
    state
        .store
        .upsert_events(vec![
            event("Winter Career Fair", NaiveDate::from_ymd_opt(2099, 12, 1)),
            event("Old Orientation", NaiveDate::from_ymd_opt(2000, 1, 1)),
            event("Walk-In Resume Help", None),
        ])
        .await
        .unwrap();
    let app = build_router(state);

    let request = Request::builder()
        .uri("/v1/events")
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = json_body(response).await;
    let items = parsed["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "Winter Career Fair");
    assert_eq!(items[1]["name"], "Walk-In Resume Help");
}

#[tokio::test]
async fn ingest_without_configured_secret_is_unavailable() {
    let app = test_app(None, 100);

    let request = Request::builder()
        .method("POST")
        .uri("/v1/jobs/ingest")
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .header("x-ingest-secret", "anything")
        .body(Body::from(json!({ "jobs": [] }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn chat_is_rate_limited_per_ip() {
    let app = test_app(None, 2);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(chat_request(json!({ "text": "sora" }), Some(API_KEY)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(chat_request(json!({ "text": "sora" }), Some(API_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}
