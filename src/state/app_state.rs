//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{
    AlertKind, Countdown, PlayMode, Playlist, PlaylistEntry, PlaylistSnapshot, TickOutcome,
    TimerSnapshot, UiState,
};
use crate::{
    config::Config,
    error::AppError,
    services::{
        notifier::{DesktopNotifications, COMPLETION_BODY, COMPLETION_SUMMARY},
        parse_source, MediaSource, NotificationBackend, Notifier, NotifyReport, Playback,
        RemotePlayer, YoutubeClient,
    },
};

/// Title given to an entry loaded from a single-video URL
pub const SINGLE_VIDEO_TITLE: &str = "🎵 Single video";
const UNPLAYABLE_WARNING: &str = "⚠️ This video cannot be played, skipping to the next one";

/// Main application state shared by the HTTP handlers and the countdown task
#[derive(Debug)]
pub struct AppState {
    pub timer: Mutex<Countdown>,
    pub playlist: Mutex<Playlist>,
    pub ui: Arc<UiState>,
    pub player: Arc<RemotePlayer>,
    pub notifier: Notifier,
    pub youtube: YoutubeClient,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Running flag of the countdown, watched by the tick task
    pub running_tx: watch::Sender<bool>,
    /// Keep the receiver alive to prevent channel closure
    pub _running_rx: watch::Receiver<bool>,
}

impl AppState {
    pub fn new(
        port: u16,
        host: String,
        work_seconds: u64,
        youtube: YoutubeClient,
        backend: Arc<dyn NotificationBackend>,
        sound: bool,
    ) -> Self {
        let (running_tx, running_rx) = watch::channel(false);
        let player = Arc::new(RemotePlayer::new());
        let playback: Arc<dyn Playback> = player.clone();
        let ui = Arc::new(UiState::new());

        Self {
            timer: Mutex::new(Countdown::new(work_seconds, Arc::clone(&playback))),
            playlist: Mutex::new(Playlist::new(playback)),
            notifier: Notifier::standard(backend, Arc::clone(&ui), sound),
            ui,
            player,
            youtube,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            running_tx,
            _running_rx: running_rx,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Ok(Self::new(
            config.port,
            config.host.clone(),
            config.work_seconds()?,
            YoutubeClient::new(config.api_base.clone(), config.api_key.clone()),
            Arc::new(DesktopNotifications::new(config.notifications)),
            !config.no_sound,
        ))
    }

    fn lock_timer(&self) -> Result<MutexGuard<'_, Countdown>, AppError> {
        self.timer.lock().map_err(|_| AppError::Lock("timer"))
    }

    fn lock_playlist(&self) -> Result<MutexGuard<'_, Playlist>, AppError> {
        self.playlist.lock().map_err(|_| AppError::Lock("playlist"))
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Surface a failed user action as an error alert and hand the error back
    fn surface(&self, error: AppError) -> AppError {
        if let Err(e) = self.ui.raise_alert(AlertKind::Error, error.to_string()) {
            warn!("Failed to record alert: {}", e);
        }
        error
    }

    /// Apply a timer mutation and publish the resulting running flag
    fn update_timer<F>(&self, action: &str, updater: F) -> Result<TimerSnapshot, AppError>
    where
        F: FnOnce(&mut Countdown) -> Result<(), AppError>,
    {
        let mut timer = self.lock_timer()?;
        let result = updater(&mut *timer);
        let snapshot = timer.snapshot();
        drop(timer); // Release the lock early

        self.running_tx.send_replace(snapshot.running);
        result.map_err(|e| self.surface(e))?;
        self.record_action(action);
        Ok(snapshot)
    }

    pub fn start_timer(&self) -> Result<TimerSnapshot, AppError> {
        self.update_timer("timer-start", |t| Ok(t.start()?))
    }

    pub fn pause_timer(&self) -> Result<TimerSnapshot, AppError> {
        self.update_timer("timer-pause", |t| {
            t.pause();
            Ok(())
        })
    }

    pub fn toggle_timer(&self) -> Result<TimerSnapshot, AppError> {
        self.update_timer("timer-toggle", |t| Ok(t.toggle()?))
    }

    pub fn reset_timer(&self) -> Result<TimerSnapshot, AppError> {
        self.update_timer("timer-reset", |t| {
            t.reset();
            Ok(())
        })
    }

    pub fn set_timer_duration(&self, minutes: u64, seconds: u64) -> Result<TimerSnapshot, AppError> {
        self.update_timer("timer-duration", |t| Ok(t.set_duration(minutes, seconds)?))
    }

    /// Advance the countdown by one second
    pub fn tick(&self) -> Result<TickOutcome, AppError> {
        let mut timer = self.lock_timer()?;
        let outcome = timer.tick();
        let running = timer.is_running();
        drop(timer);

        if let TickOutcome::Completed { .. } = outcome {
            self.running_tx.send_replace(running);
        }
        Ok(outcome)
    }

    /// Fire the completion notification and its fallbacks
    pub fn notify_completion(&self) -> NotifyReport {
        self.notifier.notify(COMPLETION_SUMMARY, COMPLETION_BODY)
    }

    /// Release the notification lock taken by the expiry with this generation
    pub fn release_notify_lock(&self, generation: u64) -> Result<bool, AppError> {
        let released = self.lock_timer()?.release_notify_lock(generation);
        if released {
            debug!("Notification lock {} released", generation);
        }
        Ok(released)
    }

    pub fn get_timer_state(&self) -> Result<TimerSnapshot, AppError> {
        Ok(self.lock_timer()?.snapshot())
    }

    /// Load a video or a whole playlist from a pasted URL.
    ///
    /// The playlist is replaced only when every page was fetched.
    pub async fn load_source(&self, url: &str) -> Result<PlaylistSnapshot, AppError> {
        let source = parse_source(url).map_err(|e| self.surface(e.into()))?;
        info!("Loading {:?}", source);

        let entries = match source {
            MediaSource::Video(id) => vec![PlaylistEntry::new(id, SINGLE_VIDEO_TITLE)],
            MediaSource::Playlist(id) => self
                .youtube
                .fetch_playlist(&id)
                .await
                .map_err(|e| self.surface(e.into()))?,
        };

        let mut playlist = self.lock_playlist()?;
        playlist.replace(entries);
        let snapshot = playlist.snapshot();
        drop(playlist);

        self.record_action("playlist-load");
        Ok(snapshot)
    }

    pub fn select(&self, index: usize) -> Result<PlaylistSnapshot, AppError> {
        let mut playlist = self.lock_playlist()?;
        let selected = playlist.select(index).map(|_| ());
        let snapshot = playlist.snapshot();
        drop(playlist);

        selected.map_err(|e| self.surface(e.into()))?;
        self.record_action("playlist-select");
        Ok(snapshot)
    }

    pub fn next(&self) -> Result<PlaylistSnapshot, AppError> {
        let mut playlist = self.lock_playlist()?;
        playlist.advance();
        let snapshot = playlist.snapshot();
        drop(playlist);
        self.record_action("playlist-next");
        Ok(snapshot)
    }

    pub fn prev(&self) -> Result<PlaylistSnapshot, AppError> {
        let mut playlist = self.lock_playlist()?;
        playlist.retreat();
        let snapshot = playlist.snapshot();
        drop(playlist);
        self.record_action("playlist-prev");
        Ok(snapshot)
    }

    pub fn set_mode(&self, mode: PlayMode) -> Result<PlaylistSnapshot, AppError> {
        let mut playlist = self.lock_playlist()?;
        playlist.set_mode(mode);
        let snapshot = playlist.snapshot();
        drop(playlist);
        self.record_action("playlist-mode");
        Ok(snapshot)
    }

    pub fn get_playlist_state(&self) -> Result<PlaylistSnapshot, AppError> {
        Ok(self.lock_playlist()?.snapshot())
    }

    /// Player (re)connected: send it whatever should be playing
    pub fn player_ready(&self) -> Result<PlaylistSnapshot, AppError> {
        let playlist = self.lock_playlist()?;
        match playlist.reload_current() {
            Some(entry) => info!("Player ready, resuming {}", entry.id),
            None => info!("Player ready, nothing selected"),
        }
        Ok(playlist.snapshot())
    }

    /// Current video finished
    pub fn player_ended(&self) -> Result<PlaylistSnapshot, AppError> {
        debug!("Player reported end of video");
        self.next()
    }

    /// Current video failed to play: warn and skip it
    pub fn player_error(&self, detail: Option<&str>) -> Result<PlaylistSnapshot, AppError> {
        let message = match detail {
            Some(detail) if !detail.is_empty() => format!("{} ({})", UNPLAYABLE_WARNING, detail),
            _ => UNPLAYABLE_WARNING.to_string(),
        };
        self.ui.raise_alert(AlertKind::Warning, message)?;
        self.next()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
