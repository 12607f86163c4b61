//! Helpers shared by unit tests

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{extract::Query, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use tokio::net::TcpListener;

use crate::{
    error::NotifyError,
    services::notifier::{NotificationBackend, Permission},
};

/// Serve a fake playlistItems endpoint with `pages` pages of two videos each.
/// `fail_page` answers that page with an API error body.
pub async fn spawn_listing_stub(pages: u32, fail_page: Option<u32>) -> String {
    let handler = move |Query(params): Query<HashMap<String, String>>| async move {
        let token = params.get("pageToken").cloned().unwrap_or_default();
        let page: u32 = token.strip_prefix("page").and_then(|n| n.parse().ok()).unwrap_or(1);

        if fail_page == Some(page) {
            return (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": { "code": 403, "message": "quota exceeded" } })),
            )
                .into_response();
        }

        let items: Vec<_> = ["a", "b"]
            .iter()
            .map(|suffix| {
                json!({
                    "snippet": {
                        "title": format!("Page {} video {}", page, suffix),
                        "resourceId": { "kind": "youtube#video", "videoId": format!("p{}{}", page, suffix) }
                    }
                })
            })
            .collect();
        let mut body = json!({ "items": items });
        if page < pages {
            body["nextPageToken"] = json!(format!("page{}", page + 1));
        }
        Json(body).into_response()
    };

    let app = Router::new().route("/playlistItems", get(handler));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Notification backend double with a scripted permission answer
#[derive(Debug)]
pub struct FakeBackend {
    pub permission: Mutex<Permission>,
    pub on_request: Permission,
    pub fail_show: bool,
    pub requests: Mutex<u32>,
    pub shown: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new(permission: Permission) -> Arc<Self> {
        Self::scripted(permission, permission, false)
    }

    pub fn scripted(permission: Permission, on_request: Permission, fail_show: bool) -> Arc<Self> {
        Arc::new(Self {
            permission: Mutex::new(permission),
            on_request,
            fail_show,
            requests: Mutex::new(0),
            shown: Mutex::new(Vec::new()),
        })
    }
}

impl NotificationBackend for FakeBackend {
    fn permission(&self) -> Permission {
        *self.permission.lock().unwrap()
    }

    fn request_permission(&self) -> Permission {
        *self.requests.lock().unwrap() += 1;
        *self.permission.lock().unwrap() = self.on_request;
        self.on_request
    }

    fn show(&self, summary: &str, _body: &str) -> Result<(), NotifyError> {
        if self.fail_show {
            return Err(NotifyError::Backend("no notification daemon".to_string()));
        }
        self.shown.lock().unwrap().push(summary.to_string());
        Ok(())
    }
}
