use datastore::InMemoryRepository;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("MOCK_LISTEN").unwrap_or_else(|_| "127.0.0.1:8787".into());
    let api_key = std::env::var("MOCK_API_KEY").ok();

    // Seed a small schedule around the current time
    let repo = Arc::new(InMemoryRepository::with_dummy_data(chrono::Utc::now()));
    let app = mock_server::app(repo, api_key.clone());

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(
        "Mock upstream listening on http://{} (api key {})",
        listener.local_addr()?,
        if api_key.is_some() { "required" } else { "not checked" }
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
