//! SpillCam Relay
//!
//! Main entry point for the relay server.

use spillcam_relay::{
    state::{AppConfig, AppState},
    web_api,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spillcam_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting SpillCam Relay v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::default();
    tracing::info!(
        host = %config.host,
        port = config.port,
        spill_frame_dir = %config.spill_frame_dir.display(),
        jpeg_quality = config.jpeg_quality,
        stream_interval_ms = config.stream_interval.as_millis() as u64,
        max_upload_bytes = config.max_upload_bytes,
        "Configuration loaded"
    );

    if config.camera_password.is_default() {
        tracing::warn!("CAMERA_PASSWORD not set, using the built-in default secret");
    }

    let state = AppState::new(config).await?;
    tracing::info!(
        spill_frame_dir = %state.alerts.archive().dir().display(),
        "FrameStore and SpillAlertService initialized"
    );

    let app = web_api::create_router(state.clone())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
