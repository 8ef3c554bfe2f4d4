//! Runtime configuration for channel tracking.
//!
//! Every field has a default matching the live platform, so an empty
//! JSON object (or `WatchConfig::default()`) is a working configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://www.twitch.tv";
pub const DEFAULT_GQL_URL: &str = "https://gql.twitch.tv/gql";
pub const DEFAULT_CLIENT_ID: &str = "kimne78kx3ncx6brgo4mv6wki5h1ko";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";
/// Tag id the platform attaches to streams with drops enabled.
pub const DROPS_ENABLED_TAG: &str = "c2542d6d-cd10-4532-919b-3d19f30a768b";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Public site root, channel pages live at `{base_url}/{name}`
    pub base_url: String,
    /// GraphQL endpoint
    pub gql_url: String,
    pub client_id: String,
    pub user_agent: String,
    /// OAuth token sent as `Authorization: OAuth <token>`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_token: Option<String>,
    /// Grace period between a stream-up notification and the confirming poll (default: 120)
    pub online_delay_secs: u64,
    pub drops_enabled_tag: String,
    /// Page size of directory listings (default: 30)
    pub directory_limit: u32,
    /// Per-request timeout of the bundled HTTP client (default: 30)
    pub request_timeout_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            gql_url: DEFAULT_GQL_URL.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            oauth_token: None,
            online_delay_secs: 120,
            drops_enabled_tag: DROPS_ENABLED_TAG.to_string(),
            directory_limit: 30,
            request_timeout_secs: 30,
        }
    }
}

impl WatchConfig {
    pub fn online_delay(&self) -> Duration {
        Duration::from_secs(self.online_delay_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn channel_url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), name)
    }
}
