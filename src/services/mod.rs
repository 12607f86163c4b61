//! Collaborators of the core state
//! 
//! Playback commands, completion notifications and the YouTube listing client.

pub mod notifier;
pub mod playback;
pub mod youtube;

// Re-export main types
pub use notifier::{NotificationBackend, Notifier, NotifyReport, Permission};
pub use playback::{Playback, PlayerAction, PlayerCommand, RemotePlayer};
pub use youtube::{parse_source, MediaSource, YoutubeClient};
