//! Playlist entries, current position and traversal

use std::{fmt, sync::Arc};

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{error::PlaylistError, services::Playback};

/// One video in the playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub id: String,
    pub title: String,
}

impl PlaylistEntry {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// How `advance` picks the next entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    #[default]
    Sequential,
    Random,
}

pub struct Playlist {
    entries: Vec<PlaylistEntry>,
    current: Option<usize>,
    mode: PlayMode,
    rng: StdRng,
    playback: Arc<dyn Playback>,
}

/// Serializable view of the playlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistSnapshot {
    pub entries: Vec<PlaylistEntry>,
    pub current_index: Option<usize>,
    pub current: Option<PlaylistEntry>,
    pub mode: PlayMode,
}

impl Playlist {
    pub fn new(playback: Arc<dyn Playback>) -> Self {
        Self::with_rng(playback, StdRng::from_entropy())
    }

    /// Playlist with a caller-provided random source
    pub fn with_rng(playback: Arc<dyn Playback>, rng: StdRng) -> Self {
        Self {
            entries: Vec::new(),
            current: None,
            mode: PlayMode::default(),
            rng,
            playback,
        }
    }

    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&PlaylistEntry> {
        self.current.and_then(|i| self.entries.get(i))
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PlayMode) {
        info!("Play mode set to {:?}", mode);
        self.mode = mode;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace all entries and start playing the first one.
    /// An empty list clears the selection.
    pub fn replace(&mut self, entries: Vec<PlaylistEntry>) {
        info!("Playlist replaced with {} entries", entries.len());
        self.entries = entries;
        self.current = None;
        if !self.entries.is_empty() {
            // Index 0 is in range for a non-empty list
            let _ = self.select(0);
        }
    }

    pub fn select(&mut self, index: usize) -> Result<&PlaylistEntry, PlaylistError> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get(index)
            .ok_or(PlaylistError::IndexOutOfRange { index, len })?;
        debug!("Selecting entry {} ({})", index, entry.id);
        self.playback.load_by_id(&entry.id);
        self.current = Some(index);
        Ok(entry)
    }

    /// Move to the next entry; sequential wraps, random may repeat the current one
    pub fn advance(&mut self) -> Option<&PlaylistEntry> {
        let len = self.entries.len();
        if len == 0 {
            return None;
        }
        let next = match self.mode {
            PlayMode::Sequential => self.current.map_or(0, |i| (i + 1) % len),
            PlayMode::Random => self.rng.gen_range(0..len),
        };
        self.select(next).ok()
    }

    pub fn retreat(&mut self) -> Option<&PlaylistEntry> {
        let len = self.entries.len();
        if len == 0 {
            return None;
        }
        let prev = self.current.map_or(len - 1, |i| (i + len - 1) % len);
        self.select(prev).ok()
    }

    /// Re-send the current entry to playback
    pub fn reload_current(&self) -> Option<&PlaylistEntry> {
        let entry = self.current()?;
        self.playback.load_by_id(&entry.id);
        Some(entry)
    }

    pub fn snapshot(&self) -> PlaylistSnapshot {
        PlaylistSnapshot {
            entries: self.entries.clone(),
            current_index: self.current,
            current: self.current().cloned(),
            mode: self.mode,
        }
    }
}

impl fmt::Debug for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Playlist")
            .field("entries", &self.entries.len())
            .field("current", &self.current)
            .field("mode", &self.mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPlayback {
        loaded: Mutex<Vec<String>>,
    }

    impl Playback for RecordingPlayback {
        fn load_by_id(&self, id: &str) {
            self.loaded.lock().unwrap().push(id.to_string());
        }
        fn pause(&self) {}
        fn is_playing(&self) -> bool {
            false
        }
    }

    fn entries(n: usize) -> Vec<PlaylistEntry> {
        (0..n)
            .map(|i| PlaylistEntry::new(format!("vid{}", i), format!("Video {}", i)))
            .collect()
    }

    fn playlist(n: usize) -> (Playlist, Arc<RecordingPlayback>) {
        let playback = Arc::new(RecordingPlayback::default());
        let mut list = Playlist::with_rng(playback.clone(), StdRng::seed_from_u64(7));
        list.replace(entries(n));
        (list, playback)
    }

    #[test]
    fn replace_selects_first_entry() {
        let (list, playback) = playlist(3);
        assert_eq!(list.current_index(), Some(0));
        assert_eq!(*playback.loaded.lock().unwrap(), vec!["vid0"]);
    }

    #[test]
    fn sequential_advance_cycles() {
        let n = 4;
        let (mut list, _) = playlist(n);
        let mut visited = vec![list.current_index().unwrap()];
        for _ in 0..n {
            list.advance();
            visited.push(list.current_index().unwrap());
        }
        assert_eq!(visited, vec![0, 1, 2, 3, 0]);
    }

    #[test]
    fn retreat_then_advance_is_identity() {
        let n = 5;
        let (mut list, _) = playlist(n);
        for start in 0..n {
            list.select(start).unwrap();
            list.retreat();
            list.advance();
            assert_eq!(list.current_index(), Some(start));
        }
    }

    #[test]
    fn retreat_wraps_from_first() {
        let (mut list, playback) = playlist(3);
        list.set_mode(PlayMode::Random);
        let entry = list.retreat().cloned();
        assert_eq!(entry.map(|e| e.id), Some("vid2".to_string()));
        assert_eq!(playback.loaded.lock().unwrap().last().unwrap(), "vid2");
    }

    #[test]
    fn random_advance_stays_in_range() {
        let (mut list, _) = playlist(6);
        list.set_mode(PlayMode::Random);
        for _ in 0..200 {
            list.advance();
            assert!(list.current_index().unwrap() < 6);
        }
    }

    #[test]
    fn random_advance_may_repeat_single_entry() {
        let (mut list, playback) = playlist(1);
        list.set_mode(PlayMode::Random);
        list.advance();
        assert_eq!(list.current_index(), Some(0));
        assert_eq!(playback.loaded.lock().unwrap().len(), 2);
    }

    #[test]
    fn empty_playlist_ignores_navigation() {
        let (mut list, playback) = playlist(0);
        assert!(list.advance().is_none());
        assert!(list.retreat().is_none());
        assert_eq!(list.current_index(), None);
        assert!(playback.loaded.lock().unwrap().is_empty());
    }

    #[test]
    fn select_out_of_range_is_rejected() {
        let (mut list, _) = playlist(2);
        list.select(1).unwrap();
        assert_eq!(
            list.select(2).unwrap_err(),
            PlaylistError::IndexOutOfRange { index: 2, len: 2 }
        );
        assert_eq!(list.current_index(), Some(1));
    }

    #[test]
    fn mode_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&PlayMode::Random).unwrap(), "\"random\"");
        let mode: PlayMode = serde_json::from_str("\"sequential\"").unwrap();
        assert_eq!(mode, PlayMode::Sequential);
    }
}
