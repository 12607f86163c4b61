//! YouTube URL parsing and playlist listing

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::{
    error::{FetchError, SourceError},
    state::PlaylistEntry,
};

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const PAGE_SIZE: u32 = 50;

static LIST_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"list=([\w-]+)").expect("list pattern is valid"));
static VIDEO_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v=([\w-]+)").expect("video pattern is valid"));

/// What a submitted URL points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    Playlist(String),
    Video(String),
}

/// Extract a playlist or video id; `list` wins over `v`
pub fn parse_source(input: &str) -> Result<MediaSource, SourceError> {
    let input = input.trim();
    let source = match Url::parse(input) {
        Ok(url) => {
            let param = |name: &str| {
                url.query_pairs()
                    .find(|(key, value)| key == name && !value.is_empty())
                    .map(|(_, value)| value.into_owned())
            };
            param("list")
                .map(MediaSource::Playlist)
                .or_else(|| param("v").map(MediaSource::Video))
        }
        Err(_) => scan_source(input),
    };
    source.ok_or_else(|| SourceError::Unrecognized(input.to_string()))
}

/// Pattern scan for text that is not a well-formed URL
fn scan_source(input: &str) -> Option<MediaSource> {
    let capture = |pattern: &Regex| {
        pattern
            .captures(input)?
            .get(1)
            .map(|m| m.as_str().to_string())
    };
    capture(&*LIST_PATTERN)
        .map(MediaSource::Playlist)
        .or_else(|| capture(&*VIDEO_PATTERN).map(MediaSource::Video))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next_page_token: Option<String>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: String,
}

/// Client for the playlistItems listing endpoint
#[derive(Debug, Clone)]
pub struct YoutubeClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl YoutubeClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    /// Fetch every page of a playlist. Any failure discards what was collected.
    pub async fn fetch_playlist(&self, playlist_id: &str) -> Result<Vec<PlaylistEntry>, FetchError> {
        let api_key = self.api_key.as_deref().ok_or(FetchError::MissingApiKey)?;
        let url = format!("{}/playlistItems", self.base_url);
        let page_size = PAGE_SIZE.to_string();

        let mut entries = Vec::new();
        let mut page_token = String::new();
        let mut pages = 0u32;

        loop {
            let response = self
                .client
                .get(&url)
                .query(&[
                    ("part", "snippet"),
                    ("maxResults", page_size.as_str()),
                    ("pageToken", page_token.as_str()),
                    ("playlistId", playlist_id),
                    ("key", api_key),
                ])
                .send()
                .await?;
            let status = response.status();
            let body = response.text().await?;

            let page: PageResponse = match serde_json::from_str(&body) {
                Ok(page) => page,
                Err(_) if !status.is_success() => return Err(FetchError::Status(status.as_u16())),
                Err(e) => return Err(FetchError::Api(format!("malformed listing response: {}", e))),
            };
            if let Some(error) = page.error {
                return Err(FetchError::Api(error.message));
            }
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }

            pages += 1;
            debug!("Playlist {} page {}: {} items", playlist_id, pages, page.items.len());
            entries.extend(
                page.items
                    .into_iter()
                    .map(|item| PlaylistEntry::new(item.snippet.resource_id.video_id, item.snippet.title)),
            );

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = token,
                None => break,
            }
        }

        if entries.is_empty() {
            return Err(FetchError::EmptyPlaylist(playlist_id.to_string()));
        }
        info!("Fetched {} entries for playlist {} in {} pages", entries.len(), playlist_id, pages);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_listing_stub;

    #[test]
    fn list_takes_precedence_over_v() {
        assert_eq!(
            parse_source("https://www.youtube.com/watch?v=abc123&list=PLxyz").unwrap(),
            MediaSource::Playlist("PLxyz".to_string())
        );
    }

    #[test]
    fn single_video_url() {
        assert_eq!(
            parse_source("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap(),
            MediaSource::Video("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn scan_patterns_compile() {
        assert!(LIST_PATTERN.is_match("list=PL1"));
        assert!(VIDEO_PATTERN.is_match("v=abc"));
        assert_eq!(scan_source("no ids here"), None);
    }

    #[test]
    fn bare_text_falls_back_to_scan() {
        assert_eq!(
            parse_source("youtube.com/watch?v=a-b_c&list=PL-1_2").unwrap(),
            MediaSource::Playlist("PL-1_2".to_string())
        );
        assert_eq!(
            parse_source("watch?v=a-b_c").unwrap(),
            MediaSource::Video("a-b_c".to_string())
        );
    }

    #[test]
    fn missing_id_is_unrecognized() {
        assert!(matches!(
            parse_source("https://www.youtube.com/"),
            Err(SourceError::Unrecognized(_))
        ));
        assert!(parse_source("not a url").is_err());
        assert!(parse_source("https://www.youtube.com/watch?v=").is_err());
    }

    #[tokio::test]
    async fn fetches_all_pages_in_order() {
        let base = spawn_listing_stub(3, None).await;
        let client = YoutubeClient::new(base, Some("key".to_string()));
        let entries = client.fetch_playlist("PLxyz").await.unwrap();
        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["p1a", "p1b", "p2a", "p2b", "p3a", "p3b"]);
        assert_eq!(entries[2].title, "Page 2 video a");
    }

    #[tokio::test]
    async fn api_error_aborts_fetch() {
        let base = spawn_listing_stub(3, Some(2)).await;
        let client = YoutubeClient::new(base, Some("key".to_string()));
        match client.fetch_playlist("PLxyz").await {
            Err(FetchError::Api(message)) => assert_eq!(message, "quota exceeded"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_key_is_reported() {
        let client = YoutubeClient::new("http://127.0.0.1:1", None);
        assert!(matches!(
            client.fetch_playlist("PLxyz").await,
            Err(FetchError::MissingApiKey)
        ));
    }
}
