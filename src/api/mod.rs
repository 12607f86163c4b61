//! HTTP API module
//! 
//! The widget's controls as JSON endpoints, plus the player event callbacks.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer/start", post(timer_start_handler))
        .route("/timer/pause", post(timer_pause_handler))
        .route("/timer/toggle", post(timer_toggle_handler))
        .route("/timer/reset", post(timer_reset_handler))
        .route("/timer/duration", put(timer_duration_handler))
        .route("/playlist/load", post(playlist_load_handler))
        .route("/playlist/select/:index", post(playlist_select_handler))
        .route("/playlist/next", post(playlist_next_handler))
        .route("/playlist/prev", post(playlist_prev_handler))
        .route("/playlist/mode", put(playlist_mode_handler))
        .route("/player", get(player_command_handler))
        .route("/player/ready", post(player_ready_handler))
        .route("/player/ended", post(player_ended_handler))
        .route("/player/error", post(player_error_handler))
        .route("/alerts", delete(dismiss_alerts_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
