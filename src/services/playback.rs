//! Playback interface shared by the timer and the playlist

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

/// Narrow command surface of an embedded video player
pub trait Playback: Send + Sync {
    /// Load a video by its external id and start playing it
    fn load_by_id(&self, id: &str);
    /// Pause whatever is playing
    fn pause(&self);
    /// Shared "is playing" flag
    fn is_playing(&self) -> bool;
}

/// Command published to remote player clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum PlayerAction {
    Idle,
    Load { video_id: String },
    Pause,
}

/// Latest command with a sequence number so clients can detect repeats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerCommand {
    pub seq: u64,
    #[serde(flatten)]
    pub action: PlayerAction,
    pub issued_at: DateTime<Utc>,
}

impl PlayerCommand {
    fn idle() -> Self {
        Self {
            seq: 0,
            action: PlayerAction::Idle,
            issued_at: Utc::now(),
        }
    }
}

/// Player living in another process (a browser tab with the embed),
/// following the commands published on a watch channel
#[derive(Debug)]
pub struct RemotePlayer {
    playing: AtomicBool,
    command_tx: watch::Sender<PlayerCommand>,
    /// Keep the receiver alive to prevent channel closure
    _command_rx: watch::Receiver<PlayerCommand>,
}

impl RemotePlayer {
    pub fn new() -> Self {
        let (command_tx, command_rx) = watch::channel(PlayerCommand::idle());
        Self {
            playing: AtomicBool::new(false),
            command_tx,
            _command_rx: command_rx,
        }
    }

    /// Most recent command issued to the player
    pub fn current_command(&self) -> PlayerCommand {
        self.command_tx.borrow().clone()
    }

    fn publish(&self, action: PlayerAction) {
        self.command_tx.send_modify(|cmd| {
            cmd.seq += 1;
            cmd.action = action;
            cmd.issued_at = Utc::now();
        });
    }
}

impl Default for RemotePlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Playback for RemotePlayer {
    fn load_by_id(&self, id: &str) {
        debug!("Player: load {}", id);
        self.playing.store(true, Ordering::SeqCst);
        self.publish(PlayerAction::Load {
            video_id: id.to_string(),
        });
    }

    fn pause(&self) {
        debug!("Player: pause");
        self.playing.store(false, Ordering::SeqCst);
        self.publish(PlayerAction::Pause);
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_sequenced() {
        let player = RemotePlayer::new();
        assert_eq!(player.current_command().action, PlayerAction::Idle);
        assert!(!player.is_playing());

        player.load_by_id("abc");
        let cmd = player.current_command();
        assert_eq!(cmd.seq, 1);
        assert_eq!(
            cmd.action,
            PlayerAction::Load {
                video_id: "abc".to_string()
            }
        );
        assert!(player.is_playing());

        player.pause();
        assert_eq!(player.current_command().seq, 2);
        assert_eq!(player.current_command().action, PlayerAction::Pause);
        assert!(!player.is_playing());
    }

    #[test]
    fn command_serializes_flat() {
        let player = RemotePlayer::new();
        player.load_by_id("xyz");
        let json = serde_json::to_value(player.current_command()).unwrap();
        assert_eq!(json["command"], "load");
        assert_eq!(json["video_id"], "xyz");
        assert_eq!(json["seq"], 1);
    }
}
