//! User-facing messages and the page title

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::error::{AppError, NotifyError};

pub const BASE_TITLE: &str = "Pomodoro Player";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// A user action failed
    Error,
    /// Something was skipped but playback continues
    Warning,
    /// The countdown finished
    Completion,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

/// Alerts waiting to be dismissed plus the current title text
#[derive(Debug)]
pub struct UiState {
    alerts: Mutex<Vec<Alert>>,
    title: Mutex<String>,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            alerts: Mutex::new(Vec::new()),
            title: Mutex::new(BASE_TITLE.to_string()),
        }
    }

    pub fn raise_alert(&self, kind: AlertKind, message: impl Into<String>) -> Result<(), AppError> {
        let message = message.into();
        match kind {
            AlertKind::Error => warn!("Alert: {}", message),
            _ => debug!("Alert ({:?}): {}", kind, message),
        }
        self.alerts
            .lock()
            .map_err(|_| AppError::Lock("alerts"))?
            .push(Alert {
                kind,
                message,
                raised_at: Utc::now(),
            });
        Ok(())
    }

    pub fn alerts(&self) -> Result<Vec<Alert>, AppError> {
        self.alerts
            .lock()
            .map(|alerts| alerts.clone())
            .map_err(|_| AppError::Lock("alerts"))
    }

    /// Drop all alerts, returning how many were pending
    pub fn dismiss_alerts(&self) -> Result<usize, AppError> {
        let mut alerts = self.alerts.lock().map_err(|_| AppError::Lock("alerts"))?;
        let count = alerts.len();
        alerts.clear();
        Ok(count)
    }

    pub fn title(&self) -> String {
        self.title
            .lock()
            .map(|t| t.clone())
            .unwrap_or_else(|_| BASE_TITLE.to_string())
    }

    fn set_title(&self, text: &str) {
        if let Ok(mut title) = self.title.lock() {
            *title = text.to_string();
        }
    }

    /// Alternate the title with `text` once per second for `duration`, then restore it
    pub fn flash_title(self: &Arc<Self>, text: &str, duration: Duration) -> Result<(), NotifyError> {
        let handle = Handle::try_current().map_err(|_| NotifyError::Unsupported("title flashing without a runtime"))?;
        let ui = Arc::clone(self);
        let text = text.to_string();
        let flips = duration.as_secs().max(1);

        handle.spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            for flip in 0..flips {
                interval.tick().await;
                ui.set_title(if flip % 2 == 0 { text.as_str() } else { BASE_TITLE });
            }
            interval.tick().await;
            ui.set_title(BASE_TITLE);
        });
        Ok(())
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}
