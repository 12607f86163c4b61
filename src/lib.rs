//! Pomodoro Player - a countdown timer driving a YouTube playlist player
//! 
//! The timer pauses playback and notifies the user when a pomodoro ends;
//! the playlist controller loads, traverses and skips videos. Both are
//! exposed over a small HTTP API that an embedded player page follows.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::AppError;
pub use state::AppState;
pub use utils::signals::shutdown_signal;
