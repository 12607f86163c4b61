//! Pomodoro Player - entry point

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use pomodoro_player::{
    api::create_router,
    config::Config,
    state::AppState,
    tasks::countdown_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("pomodoro_player={},tower_http=info", config.log_level()))
        .init();

    info!("Starting pomodoro-player v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, work={}m{}s, notifications={:?}, sound={}",
        config.host, config.port, config.minutes, config.seconds, config.notifications, !config.no_sound
    );
    if config.api_key.is_none() {
        warn!("No YouTube API key configured; only single videos can be loaded");
    }

    let state = Arc::new(AppState::from_config(&config)?);

    // Start the countdown background task
    let timer_state = Arc::clone(&state);
    tokio::spawn(async move {
        countdown_task(timer_state).await;
    });

    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/start|pause|toggle|reset, PUT /timer/duration");
    info!("  POST /playlist/load, /playlist/select/:index, /playlist/next, /playlist/prev");
    info!("  PUT  /playlist/mode");
    info!("  GET  /player, POST /player/ready|ended|error");
    info!("  GET  /status, GET /health, DELETE /alerts");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
