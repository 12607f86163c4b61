//! Countdown timer state and transitions

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{error::TimerError, services::Playback};

/// Result of a single one-second tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer is not running
    Idle,
    /// Still counting, with the seconds left
    Counting(u64),
    /// Countdown reached zero. `notify` carries the lock generation when the
    /// caller must fire the notification, `None` while an earlier one holds the lock
    Completed { notify: Option<u64> },
}

/// Pomodoro countdown driving playback pause on expiry
pub struct Countdown {
    configured_seconds: u64,
    remaining_seconds: u64,
    running: bool,
    completed: u64,
    notify_locked: bool,
    notify_generation: u64,
    playback: Arc<dyn Playback>,
}

/// Serializable view of the countdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub configured_seconds: u64,
    pub remaining_seconds: u64,
    pub remaining: String,
    pub running: bool,
    pub completed: u64,
}

impl Countdown {
    pub fn new(configured_seconds: u64, playback: Arc<dyn Playback>) -> Self {
        Self {
            configured_seconds,
            remaining_seconds: configured_seconds,
            running: false,
            completed: 0,
            notify_locked: false,
            notify_generation: 0,
            playback,
        }
    }

    pub fn configured_seconds(&self) -> u64 {
        self.configured_seconds
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of completed countdowns since start
    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn is_notify_locked(&self) -> bool {
        self.notify_locked
    }

    pub fn start(&mut self) -> Result<(), TimerError> {
        if self.running {
            return Ok(());
        }
        if self.remaining_seconds == 0 {
            if self.configured_seconds == 0 {
                return Err(TimerError::ZeroDuration);
            }
            self.remaining_seconds = self.configured_seconds;
        }
        self.running = true;
        info!("Timer started with {} remaining", format_clock(self.remaining_seconds));
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.running {
            self.running = false;
            info!("Timer paused at {}", format_clock(self.remaining_seconds));
        }
    }

    /// Start when stopped, pause when running
    pub fn toggle(&mut self) -> Result<(), TimerError> {
        if self.running {
            self.pause();
            Ok(())
        } else {
            self.start()
        }
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.remaining_seconds = self.configured_seconds;
        self.notify_locked = false;
        self.playback.pause();
        info!("Timer reset to {}", format_clock(self.configured_seconds));
    }

    /// Change the work duration.
    ///
    /// A stopped timer is re-armed to the new value. A running timer keeps
    /// counting but never exceeds the new duration; zero stops it.
    ///
    /// Durations that do not fit in `u64` seconds are rejected and leave the
    /// timer untouched.
    pub fn set_duration(&mut self, minutes: u64, seconds: u64) -> Result<(), TimerError> {
        self.configured_seconds = duration_seconds(minutes, seconds)?;
        if self.configured_seconds == 0 {
            self.running = false;
            self.remaining_seconds = 0;
        } else if self.running {
            self.remaining_seconds = self.remaining_seconds.min(self.configured_seconds);
        } else {
            self.remaining_seconds = self.configured_seconds;
        }
        debug!("Timer duration set to {}s", self.configured_seconds);
        Ok(())
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }
        if self.remaining_seconds > 1 {
            self.remaining_seconds -= 1;
            return TickOutcome::Counting(self.remaining_seconds);
        }

        self.running = false;
        self.playback.pause();
        self.completed += 1;
        self.remaining_seconds = self.configured_seconds;

        let notify = if self.notify_locked {
            None
        } else {
            self.notify_locked = true;
            self.notify_generation += 1;
            Some(self.notify_generation)
        };
        info!("Countdown complete (#{})", self.completed);
        TickOutcome::Completed { notify }
    }

    /// Release the lock taken by the expiry that returned `generation`.
    ///
    /// A release for an older generation is ignored, so a delayed release
    /// cannot free a lock taken after a reset.
    pub fn release_notify_lock(&mut self, generation: u64) -> bool {
        if self.notify_locked && self.notify_generation == generation {
            self.notify_locked = false;
            true
        } else {
            debug!(
                "Ignoring stale notification lock release ({} != {})",
                generation, self.notify_generation
            );
            false
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            configured_seconds: self.configured_seconds,
            remaining_seconds: self.remaining_seconds,
            remaining: format_clock(self.remaining_seconds),
            running: self.running,
            completed: self.completed,
        }
    }
}

impl fmt::Debug for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Countdown")
            .field("configured_seconds", &self.configured_seconds)
            .field("remaining_seconds", &self.remaining_seconds)
            .field("running", &self.running)
            .field("completed", &self.completed)
            .field("notify_locked", &self.notify_locked)
            .field("notify_generation", &self.notify_generation)
            .finish()
    }
}

/// Format seconds as `MM:SS`
/// Total seconds for a `minutes:seconds` pair, rejecting overflow
pub fn duration_seconds(minutes: u64, seconds: u64) -> Result<u64, TimerError> {
    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or(TimerError::DurationTooLarge)
}

pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
