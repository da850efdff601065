use anyhow::{Context, Result};
use tracing::info;

use locale_site::api::{fallback, ContentClient, ContentFetcher};
use locale_site::config::Config;
use locale_site::server::{build_app, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("locale_site=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;

    // Refuse to start with incomplete bundled content
    fallback::verify_all().context("Bundled fallback content failed verification")?;

    let fetcher = ContentFetcher::new(ContentClient::from_config(&config)?);

    info!(
        "Starting site ({}), content source {} with {}ms timeout",
        config.environment,
        fetcher.client().base_url(),
        fetcher.client().timeout().as_millis()
    );

    let port = config.port;
    let app = build_app(AppState::new(config, fetcher));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
