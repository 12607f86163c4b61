//! State management module
//! 
//! The countdown, the playlist and the user-facing messages, tied together by `AppState`.

pub mod app_state;
pub mod playlist_state;
pub mod timer_state;
pub mod ui_state;

// Re-export main types
pub use app_state::AppState;
pub use playlist_state::{PlayMode, Playlist, PlaylistEntry, PlaylistSnapshot};
pub use timer_state::{Countdown, TickOutcome, TimerSnapshot};
pub use ui_state::{Alert, AlertKind, UiState};
