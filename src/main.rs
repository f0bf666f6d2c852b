//! Concierge bot service
//!
//! Binds the chat transport webhook to the conversation runtime.

use concierge::ai::{GeminiClient, LoggingService};
use concierge::api::{create_router, AppState};
use concierge::config::Config;
use concierge::db::Database;
use concierge::runtime::{DatabaseStore, Dispatcher};
use concierge::transport::HttpResponder;
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::{cors::{Any, CorsLayer}, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "concierge=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = Config::from_env();

    // Ensure database directory exists
    if let Some(parent) = PathBuf::from(&config.db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path, "Opening store");
    let db = Database::open(&config.db_path)?;

    // AI collaborator
    let api_key = config.gemini_api_key.clone().unwrap_or_default();
    if api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY not set; AI calls will fail and flows will degrade");
    }
    let ai = LoggingService::new(GeminiClient::new(api_key));

    // Outbound transport
    let token = config.transport_token.clone().unwrap_or_default();
    if token.is_empty() {
        tracing::warn!("CONCIERGE_TRANSPORT_TOKEN not set; outbound sends will be rejected");
    }
    let responder = HttpResponder::new(&config.transport_base_url, &token);

    let dispatcher = Dispatcher::new(DatabaseStore::new(db), ai, responder);
    let state = AppState::new(dispatcher);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Concierge listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
