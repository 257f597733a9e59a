use anyhow::Result;
use task_api::build_app;
use task_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("task_api");

    let bind = std::env::var("TASK_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let app = build_app().await?;

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(bind = %bind, "task concierge api started");

    axum::serve(listener, app).await?;
    Ok(())
}
