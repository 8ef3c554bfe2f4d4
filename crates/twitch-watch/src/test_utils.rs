//! Scripted [`TwitchClient`] and fixtures shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::Notify;

use crate::client::TwitchClient;
use crate::config::DROPS_ENABLED_TAG;
use crate::error::{Result, WatchError};
use crate::gql::GqlOperation;

pub const SCRIPT_URL: &str =
    "https://static.twitchcdn.net/config/settings.0123456789abcdef0123456789abcdef.js";
pub const SPADE_URL: &str = "https://video-edge-c2a2b5.pdx01.abs.hls.ttvnw.net/v1/segment/spade.ts";

pub fn channel_page() -> String {
    format!(r#"<html><head><script src="{SCRIPT_URL}" crossorigin="anonymous"></script></head></html>"#)
}

pub fn settings_script() -> String {
    format!(r#"window.__twilightSettings = {{"environment":"production","spade_url": "{SPADE_URL}","sentry":false}}"#)
}

pub fn live_response(channel_id: u64, broadcast_id: u64, drops: bool) -> Value {
    let tags = if drops {
        json!([{ "id": DROPS_ENABLED_TAG, "localizedName": "DropsEnabled" }])
    } else {
        json!([])
    };
    json!({
        "data": {
            "user": {
                "id": channel_id.to_string(),
                "login": "foo",
                "stream": {
                    "id": broadcast_id.to_string(),
                    "viewersCount": 100,
                    "tags": tags,
                },
                "broadcastSettings": {
                    "title": "live now",
                    "game": { "id": "509658", "name": "just chatting", "displayName": "Just Chatting" },
                },
            }
        }
    })
}

pub fn offline_response(channel_id: u64) -> Value {
    json!({
        "data": {
            "user": {
                "id": channel_id.to_string(),
                "login": "foo",
                "stream": null,
                "broadcastSettings": { "title": "", "game": null },
            }
        }
    })
}

pub fn missing_user_response() -> Value {
    json!({ "data": { "user": null } })
}

/// In-memory client. GraphQL answers are consumed in order, the last one repeats.
#[derive(Default)]
pub struct MockClient {
    user_id: u64,
    pages: Mutex<HashMap<String, String>>,
    fetched: Mutex<Vec<String>>,
    gql_responses: Mutex<VecDeque<Option<Value>>>,
    gql_calls: Mutex<Vec<GqlOperation>>,
    gql_gate: Option<Arc<Notify>>,
    fetch_gate: Option<Arc<Notify>>,
    post_status: Mutex<Option<u16>>,
    posted: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl MockClient {
    pub fn new(user_id: u64) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    pub fn with_page(self, url: &str, body: &str) -> Self {
        self.pages.lock().insert(url.to_string(), body.to_string());
        self
    }

    pub fn with_spade_pages(self, channel_url: &str) -> Self {
        self.with_page(channel_url, &channel_page())
            .with_page(SCRIPT_URL, &settings_script())
    }

    pub fn with_gql(self, response: Option<Value>) -> Self {
        self.push_gql(response);
        self
    }

    /// Every GraphQL call waits for a `notify_one` on the returned handle.
    pub fn with_gql_gate(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gql_gate = Some(gate.clone());
        (self, gate)
    }

    /// Every page fetch waits for a `notify_one` on the returned handle.
    pub fn with_fetch_gate(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.fetch_gate = Some(gate.clone());
        (self, gate)
    }

    pub fn with_post_status(self, status: u16) -> Self {
        *self.post_status.lock() = Some(status);
        self
    }

    pub fn push_gql(&self, response: Option<Value>) {
        self.gql_responses.lock().push_back(response);
    }

    /// Replaces all queued GraphQL answers with `response`.
    pub fn set_gql(&self, response: Option<Value>) {
        let mut responses = self.gql_responses.lock();
        responses.clear();
        responses.push_back(response);
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().clone()
    }

    pub fn gql_calls(&self) -> Vec<GqlOperation> {
        self.gql_calls.lock().clone()
    }

    pub fn posted(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.posted.lock().clone()
    }

    fn next_gql(&self) -> Result<Option<Value>> {
        let mut responses = self.gql_responses.lock();
        match responses.len() {
            0 => Err(WatchError::client("connection refused")),
            1 => Ok(responses[0].clone()),
            _ => Ok(responses.pop_front().flatten()),
        }
    }
}

#[async_trait]
impl TwitchClient for MockClient {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.fetched.lock().push(url.to_string());
        if let Some(gate) = &self.fetch_gate {
            gate.notified().await;
        }
        self.pages
            .lock()
            .get(url)
            .cloned()
            .ok_or_else(|| WatchError::client(format!("404 for {url}")))
    }

    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<u16> {
        let form = form
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.posted.lock().push((url.to_string(), form));
        Ok(self.post_status.lock().unwrap_or(204))
    }

    async fn gql(&self, operation: &GqlOperation) -> Result<Option<Value>> {
        self.gql_calls.lock().push(operation.clone());
        if let Some(gate) = &self.gql_gate {
            gate.notified().await;
        }
        self.next_gql()
    }

    fn user_id(&self) -> u64 {
        self.user_id
    }
}
