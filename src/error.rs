//! Error types shared across the crate

use thiserror::Error;

/// A submitted URL did not carry a video or playlist identifier
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("could not find a video or playlist id in '{0}'")]
    Unrecognized(String),
}

/// Failures while listing playlist members
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no YouTube API key configured (use --api-key or YOUTUBE_API_KEY)")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Api(String),
    #[error("listing API answered with HTTP {0}")]
    Status(u16),
    #[error("playlist '{0}' has no videos")]
    EmptyPlaylist(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("timer duration must be greater than zero")]
    ZeroDuration,
    #[error("timer duration is too large")]
    DurationTooLarge,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaylistError {
    #[error("index {index} is out of range for a playlist of {len} entries")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Failures of a single notification step; never fatal
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification backend: {0}")]
    Backend(String),
    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Top-level error returned by `AppState` operations
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("failed to load playlist: {0}")]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Timer(#[from] TimerError),
    #[error(transparent)]
    Playlist(#[from] PlaylistError),
    #[error("failed to lock {0} state")]
    Lock(&'static str),
}
