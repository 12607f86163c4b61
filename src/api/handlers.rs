//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::Local;
use tracing::{error, info};

use crate::{
    services::{Playback, PlayerCommand},
    state::AppState,
};
use super::responses::{
    ApiError, DismissResponse, DurationRequest, HealthResponse, LoadRequest, ModeRequest,
    PlayerErrorRequest, PlaylistResponse, StatusResponse, TimerResponse,
};

type TimerResult = Result<Json<TimerResponse>, ApiError>;
type PlaylistResult = Result<Json<PlaylistResponse>, ApiError>;

/// Handle POST /timer/start
pub async fn timer_start_handler(State(state): State<Arc<AppState>>) -> TimerResult {
    let timer = state.start_timer()?;
    info!("Timer start endpoint called");
    Ok(Json(TimerResponse::new("Timer started", timer)))
}

/// Handle POST /timer/pause
pub async fn timer_pause_handler(State(state): State<Arc<AppState>>) -> TimerResult {
    let timer = state.pause_timer()?;
    info!("Timer pause endpoint called");
    Ok(Json(TimerResponse::new("Timer paused", timer)))
}

/// Handle POST /timer/toggle - the start/pause button
pub async fn timer_toggle_handler(State(state): State<Arc<AppState>>) -> TimerResult {
    let timer = state.toggle_timer()?;
    let message = if timer.running { "Timer started" } else { "Timer paused" };
    Ok(Json(TimerResponse::new(message, timer)))
}

/// Handle POST /timer/reset
pub async fn timer_reset_handler(State(state): State<Arc<AppState>>) -> TimerResult {
    let timer = state.reset_timer()?;
    info!("Timer reset endpoint called");
    Ok(Json(TimerResponse::new("Timer reset", timer)))
}

/// Handle PUT /timer/duration
pub async fn timer_duration_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DurationRequest>,
) -> TimerResult {
    let timer = state.set_timer_duration(request.minutes, request.seconds)?;
    Ok(Json(TimerResponse::new(
        format!("Duration set to {}", timer.remaining),
        timer,
    )))
}

/// Handle POST /playlist/load
pub async fn playlist_load_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoadRequest>,
) -> PlaylistResult {
    match state.load_source(&request.url).await {
        Ok(playlist) => {
            info!("Loaded {} entries from {}", playlist.entries.len(), request.url);
            Ok(Json(PlaylistResponse::new(
                format!("Loaded {} videos", playlist.entries.len()),
                playlist,
            )))
        }
        Err(e) => {
            error!("Failed to load {}: {}", request.url, e);
            Err(e.into())
        }
    }
}

/// Handle POST /playlist/select/:index
pub async fn playlist_select_handler(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> PlaylistResult {
    let playlist = state.select(index)?;
    Ok(Json(PlaylistResponse::new(format!("Playing entry {}", index), playlist)))
}

/// Handle POST /playlist/next
pub async fn playlist_next_handler(State(state): State<Arc<AppState>>) -> PlaylistResult {
    let playlist = state.next()?;
    Ok(Json(PlaylistResponse::new("Next video", playlist)))
}

/// Handle POST /playlist/prev
pub async fn playlist_prev_handler(State(state): State<Arc<AppState>>) -> PlaylistResult {
    let playlist = state.prev()?;
    Ok(Json(PlaylistResponse::new("Previous video", playlist)))
}

/// Handle PUT /playlist/mode
pub async fn playlist_mode_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ModeRequest>,
) -> PlaylistResult {
    let playlist = state.set_mode(request.mode)?;
    Ok(Json(PlaylistResponse::new(
        format!("Play mode set to {:?}", request.mode),
        playlist,
    )))
}

/// Handle GET /player - latest command for the embedded player
pub async fn player_command_handler(State(state): State<Arc<AppState>>) -> Json<PlayerCommand> {
    Json(state.player.current_command())
}

/// Handle POST /player/ready
pub async fn player_ready_handler(State(state): State<Arc<AppState>>) -> PlaylistResult {
    let playlist = state.player_ready()?;
    Ok(Json(PlaylistResponse::new("Player ready", playlist)))
}

/// Handle POST /player/ended
pub async fn player_ended_handler(State(state): State<Arc<AppState>>) -> PlaylistResult {
    let playlist = state.player_ended()?;
    Ok(Json(PlaylistResponse::new("Video ended", playlist)))
}

/// Handle POST /player/error
pub async fn player_error_handler(
    State(state): State<Arc<AppState>>,
    request: Option<Json<PlayerErrorRequest>>,
) -> PlaylistResult {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let playlist = state.player_error(request.detail.as_deref())?;
    Ok(Json(PlaylistResponse::new("Video failed, skipped", playlist)))
}

/// Handle DELETE /alerts
pub async fn dismiss_alerts_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DismissResponse>, ApiError> {
    let dismissed = state.ui.dismiss_alerts()?;
    Ok(Json(DismissResponse { dismissed }))
}

/// Handle GET /status - Return the whole widget state
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ApiError> {
    let timer = state.get_timer_state()?;
    let playlist = state.get_playlist_state()?;
    let alerts = state.ui.alerts()?;
    let (last_action, last_action_time) = state.get_last_action();
    let now = Local::now();

    Ok(Json(StatusResponse {
        timer,
        playlist,
        playing: state.player.is_playing(),
        alerts,
        title: state.ui.title(),
        date: now.format("%Y-%m-%d").to_string(),
        time: now.format("%H:%M:%S").to_string(),
        notification_permission: state.notifier.permission(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
