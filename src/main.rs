use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use flowcast_service::api::{create_router, AppState};
use flowcast_service::buoy::FeedParser;
use flowcast_service::config::Config;
use flowcast_service::fetcher::BuoyFeedFetcher;
use flowcast_service::services::{BuoyService, RiskService};
use flowcast_service::session::InMemorySessionStore;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with environment filter support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,flowcast_service=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    info!("Starting flowcast service with config: {:?}", config);

    let parser = if config.normalize_sentinels {
        info!("NDBC sentinel values will be read as missing");
        FeedParser::with_sentinel_normalization()
    } else {
        FeedParser::new()
    };
    let fetcher = BuoyFeedFetcher::new(config.ndbc_base_url.clone());

    let app_state = AppState {
        buoy_service: BuoyService::new(fetcher, parser),
        risk_service: RiskService::new(
            config.odo_model_path.clone(),
            config.multi_output_model_path.clone(),
        ),
        sessions: Arc::new(InMemorySessionStore::new()),
    };
    let app = create_router(app_state).layer(TraceLayer::new_for_http());

    let addr = config.server_addr();
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
