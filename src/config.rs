//! Configuration and CLI argument handling

use clap::Parser;

use crate::{
    error::TimerError,
    services::{youtube::DEFAULT_API_BASE, Permission},
    state::timer_state::duration_seconds,
};

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "pomodoro-player")]
#[command(about = "A pomodoro timer that drives a YouTube playlist player")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Work duration, minutes part
    #[arg(short, long, default_value = "25")]
    pub minutes: u64,

    /// Work duration, seconds part
    #[arg(short, long, default_value = "0")]
    pub seconds: u64,

    /// YouTube Data API key used to list playlists
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the YouTube Data API
    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Initial system notification permission
    #[arg(long, value_enum, default_value = "default")]
    pub notifications: Permission,

    /// Disable the audible cue when notifications are unavailable
    #[arg(long)]
    pub no_sound: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Configured work duration in seconds
    pub fn work_seconds(&self) -> Result<u64, TimerError> {
        duration_seconds(self.minutes, self.seconds)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
