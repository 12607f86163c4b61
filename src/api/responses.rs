//! API request and response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    services::Permission,
    state::{Alert, PlayMode, PlaylistSnapshot, TimerSnapshot},
};

/// Response for timer endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl TimerResponse {
    pub fn new(message: impl Into<String>, timer: TimerSnapshot) -> Self {
        Self {
            status: if timer.running { "running" } else { "stopped" }.to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            timer,
        }
    }
}

/// Response for playlist and player endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub playlist: PlaylistSnapshot,
}

impl PlaylistResponse {
    pub fn new(message: impl Into<String>, playlist: PlaylistSnapshot) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            playlist,
        }
    }
}

/// Full widget state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub playlist: PlaylistSnapshot,
    pub playing: bool,
    pub alerts: Vec<Alert>,
    pub title: String,
    pub date: String,
    pub time: String,
    pub notification_permission: Permission,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DismissResponse {
    pub dismissed: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DurationRequest {
    #[serde(default)]
    pub minutes: u64,
    #[serde(default)]
    pub seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadRequest {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModeRequest {
    pub mode: PlayMode,
}

/// Optional body of `/player/error`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerErrorRequest {
    pub detail: Option<String>,
}

/// Error body returned for failed requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// `AppError` rendered as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self(error)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self.0 {
            AppError::Source(_) | AppError::Timer(_) | AppError::Playlist(_) => StatusCode::BAD_REQUEST,
            AppError::Fetch(_) => StatusCode::BAD_GATEWAY,
            AppError::Lock(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            status: "error".to_string(),
            message: self.0.to_string(),
            timestamp: Utc::now(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
