mod rate_limit;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Json, Query, State};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{body::Body, Router};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use task_core::{ChatInput, JobRow};
use task_kb::{verify_keyword_tables, AnswerBank};
use task_llm::HttpGenerativeClient;
use task_observability::AppMetrics;
use task_records::{RecordStore, Store};
use task_router::{QueryRouter, RouterConfig};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub use crate::rate_limit::IpRateLimiter;

const LIST_LIMIT: usize = 50;

#[derive(Clone)]
pub struct ApiState {
    pub router: Arc<QueryRouter<Store, HttpGenerativeClient>>,
    pub store: Arc<Store>,
    pub metrics: Arc<AppMetrics>,
    pub api_key: String,
    pub limiter: IpRateLimiter,
    pub ingest_secret: Option<String>,
    pub generative_configured: bool,
    pub sqlite_backed: bool,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    metrics: task_observability::MetricsSnapshot,
    capabilities: HealthCapabilities,
}

#[derive(Debug, Serialize)]
struct HealthCapabilities {
    generative: bool,
    sqlite: bool,
    job_ingest: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatRequest {
    text: String,
    #[serde(default)]
    last_topic: Option<String>,
    #[serde(default)]
    lang: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ListQuery {
    q: Option<String>,
}

/// Inbound job rows arrive from several scrapers with inconsistent field
/// names; aliases fold them onto one shape and rows without a title and
/// company are dropped.
#[derive(Debug, Clone, Deserialize)]
struct IngestJobItem {
    #[serde(default, alias = "jobTitle", alias = "position")]
    title: Option<String>,
    #[serde(default, alias = "employer")]
    company: Option<String>,
    #[serde(default, alias = "city")]
    location: Option<String>,
    #[serde(default, alias = "summary")]
    description: Option<String>,
    #[serde(default, alias = "applyLink", alias = "url", alias = "link")]
    apply_link: Option<String>,
    #[serde(default, alias = "postedAt", alias = "date")]
    posted_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct JobsIngestRequest {
    jobs: Vec<IngestJobItem>,
}

pub async fn build_app() -> Result<Router> {
    let metrics = AppMetrics::shared();

    let bank = match env::var("TASK_DATA_DIR") {
        Ok(dir) => {
            AnswerBank::from_data_dir(&dir).context("failed to load program data directory")?
        }
        Err(_) => AnswerBank::builtin(),
    };
    verify_keyword_tables(&bank)?;

    let store = if let Ok(database_url) = env::var("TASK_DATABASE_URL") {
        Store::sqlite(&database_url)
            .await
            .context("failed to open record database")?
    } else {
        Store::memory()
    };
    let sqlite_backed = matches!(store, Store::Sqlite(_));
    let store = Arc::new(store);

    let generative =
        HttpGenerativeClient::from_env().context("failed to build generative client")?;
    let generative_configured = generative.is_configured();

    let router = Arc::new(
        QueryRouter::new(
            Arc::new(bank),
            Arc::clone(&store),
            Arc::new(generative),
            metrics.clone(),
        )
        .with_config(RouterConfig::default()),
    );

    let api_key = env::var("TASK_API_KEY").unwrap_or_else(|_| "dev-task-key".to_string());
    let rate_limit_window = Duration::from_secs(env_u64("TASK_RATE_LIMIT_WINDOW_SECONDS", 60));
    let rate_limit_max = env_u64("TASK_RATE_LIMIT_MAX", 80) as usize;
    let ingest_secret = env::var("TASK_INGEST_SECRET")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    let state = ApiState {
        router,
        store,
        metrics,
        api_key,
        limiter: IpRateLimiter::new(rate_limit_window, rate_limit_max),
        ingest_secret,
        generative_configured,
        sqlite_backed,
    };

    Ok(build_router(state))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/chat", post(chat))
        .route("/v1/trainings", get(trainings_list))
        .route("/v1/jobs", get(jobs_list))
        .route("/v1/resources", get(resources_list))
        .route("/v1/events", get(events_list))
        .route("/v1/jobs/ingest", post(jobs_ingest))
        .layer(build_cors_layer())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: Utc::now().to_rfc3339(),
        metrics: state.metrics.snapshot(),
        capabilities: HealthCapabilities {
            generative: state.generative_configured,
            sqlite: state.sqlite_backed,
            job_ingest: state.ingest_secret.is_some(),
        },
    };
    (StatusCode::OK, Json(payload))
}

async fn chat(State(state): State<ApiState>, Json(request): Json<ChatRequest>) -> Response {
    let input = ChatInput {
        text: request.text,
        last_topic: request.last_topic,
        lang: request.lang,
    };

    match state.router.handle(input).await {
        Ok(answer) => (StatusCode::OK, Json(answer)).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "chat turn failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "chat_failed",
                    "message": "could not answer this message"
                })),
            )
                .into_response()
        }
    }
}

fn list_terms(q: Option<String>) -> Vec<String> {
    q.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(|value| vec![value])
        .unwrap_or_default()
}

fn store_unavailable(err: impl std::fmt::Display) -> Response {
    tracing::warn!(error = %err, "record listing failed");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(serde_json::json!({
            "error": "store_unavailable"
        })),
    )
        .into_response()
}

async fn trainings_list(
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> Response {
    match state
        .store
        .search_trainings(&list_terms(query.q), LIST_LIMIT)
        .await
    {
        Ok(rows) => (StatusCode::OK, Json(serde_json::json!({ "items": rows }))).into_response(),
        Err(err) => store_unavailable(err),
    }
}

async fn jobs_list(State(state): State<ApiState>, Query(query): Query<ListQuery>) -> Response {
    match state
        .store
        .search_jobs(&list_terms(query.q), LIST_LIMIT)
        .await
    {
        Ok(rows) => (StatusCode::OK, Json(serde_json::json!({ "items": rows }))).into_response(),
        Err(err) => store_unavailable(err),
    }
}

async fn resources_list(
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> Response {
    match state
        .store
        .search_resources(&list_terms(query.q), LIST_LIMIT)
        .await
    {
        Ok(rows) => (StatusCode::OK, Json(serde_json::json!({ "items": rows }))).into_response(),
        Err(err) => store_unavailable(err),
    }
}

/// Upcoming TASK and community events. No `q` filter; the set is small and
/// past-dated rows are excluded server side.
async fn events_list(State(state): State<ApiState>) -> Response {
    match state
        .store
        .list_upcoming_events(Utc::now().date_naive(), LIST_LIMIT)
        .await
    {
        Ok(rows) => (StatusCode::OK, Json(serde_json::json!({ "items": rows }))).into_response(),
        Err(err) => store_unavailable(err),
    }
}

async fn jobs_ingest(
    State(state): State<ApiState>,
    headers: axum::http::HeaderMap,
    Json(request): Json<JobsIngestRequest>,
) -> Response {
    let Some(expected) = state.ingest_secret.as_deref() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "error": "ingest_unavailable",
                "message": "job ingest is not configured"
            })),
        )
            .into_response();
    };

    let provided = headers
        .get("x-ingest-secret")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if provided != expected {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": "unauthorized",
                "message": "missing or invalid x-ingest-secret"
            })),
        )
            .into_response();
    }

    let total = request.jobs.len();
    let rows: Vec<JobRow> = request.jobs.into_iter().filter_map(normalize_job).collect();
    let skipped = total - rows.len();

    match state.store.upsert_jobs(rows).await {
        Ok(saved) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "saved": saved,
                "skipped": skipped
            })),
        )
            .into_response(),
        Err(err) => store_unavailable(err),
    }
}

fn normalize_job(item: IngestJobItem) -> Option<JobRow> {
    let title = item.title.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
    let company = item
        .company
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())?;

    Some(JobRow {
        title: title.to_string(),
        company: company.to_string(),
        location: item
            .location
            .as_deref()
            .map(str::trim)
            .unwrap_or("Trenton, NJ")
            .to_string(),
        description: item
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        apply_link: item
            .apply_link
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty()),
        posted_at: item.posted_at.as_deref().and_then(parse_posted_at),
    })
}

fn parse_posted_at(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value.trim()) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| Utc.from_utc_datetime(&at))
}

fn build_cors_layer() -> CorsLayer {
    let origins = env::var("TASK_ALLOWED_ORIGINS")
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();
    let origins = if origins.is_empty() {
        vec![HeaderValue::from_static("http://localhost:5500")]
    } else {
        origins
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-api-key"),
            header::HeaderName::from_static("x-ingest-secret"),
        ])
}

fn is_public_endpoint(path: &str) -> bool {
    matches!(path, "/health")
}

async fn api_key_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if request.method() == Method::OPTIONS || is_public_endpoint(path.as_str()) {
        return next.run(request).await;
    }

    let header_key = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if header_key == state.api_key {
        return next.run(request).await;
    }

    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "unauthorized",
            "message": "missing or invalid x-api-key"
        })),
    )
        .into_response()
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    if is_public_endpoint(path.as_str()) {
        return next.run(request).await;
    }

    let ip = request_ip(&request);
    if !state.limiter.allow(&ip) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({
                "error": "rate_limited",
                "message": "rate limit exceeded for this IP"
            })),
        )
            .into_response();
    }

    next.run(request).await
}

fn request_ip(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(',')
                .next()
                .unwrap_or("unknown")
                .trim()
                .to_string()
        })
        .unwrap_or_else(|| "local".to_string())
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingest_rows_normalize_field_aliases() {
        let raw = serde_json::json!({
            "jobs": [
                {
                    "jobTitle": " Line Cook ",
                    "employer": "Trenton Diner",
                    "city": "Trenton, NJ",
                    "summary": "Prep and line work.",
                    "url": "https://example.org/apply",
                    "date": "2025-08-01"
                },
                { "company": "No Title Inc" }
            ]
        });
        let request: JobsIngestRequest = serde_json::from_value(raw).unwrap();

        let rows: Vec<JobRow> = request.jobs.into_iter().filter_map(normalize_job).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Line Cook");
        assert_eq!(rows[0].company, "Trenton Diner");
        assert_eq!(rows[0].apply_link.as_deref(), Some("https://example.org/apply"));
        assert!(rows[0].posted_at.is_some());
    }

    #[test]
    fn posted_at_accepts_rfc3339_and_plain_dates() {
        assert!(parse_posted_at("2025-08-01T12:00:00Z").is_some());
        assert!(parse_posted_at("2025-08-01").is_some());
        assert!(parse_posted_at("last tuesday").is_none());
    }

    #[test]
    fn missing_location_defaults_to_trenton() {
        let row = normalize_job(IngestJobItem {
            title: Some("Dishwasher".to_string()),
            company: Some("Cafe".to_string()),
            location: None,
            description: None,
            apply_link: None,
            posted_at: None,
        })
        .unwrap();
        assert_eq!(row.location, "Trenton, NJ");
    }
}
