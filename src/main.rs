use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rust_inquiry_api::app;
use rust_inquiry_api::config::Config;
use rust_inquiry_api::handlers::AppState;
use rust_inquiry_api::notion_client::NotionClient;
use rust_inquiry_api::obs::TracingObserver;
use rust_inquiry_api::services::RecordStore;

/// Main entry point for the application.
///
/// Initializes tracing, loads configuration, builds the Notion client and serves the
/// inquiry routes behind CORS and per-IP rate limiting.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_inquiry_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // A missing credential leaves the service up; save requests then answer with a
    // configuration error instead of the process refusing to start.
    let store: Option<Arc<dyn RecordStore>> = match config.notion_api_key.clone() {
        Some(api_key) => {
            let client = NotionClient::new(
                config.notion_base_url.clone(),
                api_key,
                config.notion_version.clone(),
            )?;
            tracing::info!("✓ Notion client initialized: {}", config.notion_base_url);
            Some(Arc::new(client) as Arc<dyn RecordStore>)
        }
        None => None,
    };

    let port = config.port;
    let app_state = Arc::new(AppState::new(config, store, Arc::new(TracingObserver)));

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    let inquiry_routes = app::inquiry_routes().layer(ServiceBuilder::new().layer(GovernorLayer {
        config: governor_conf,
    }));

    // Health check bypasses rate limiting
    let app = app::build_router(app_state, inquiry_routes);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
