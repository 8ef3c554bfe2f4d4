//! The HTTP and GraphQL capability channels depend on.

use std::sync::OnceLock;

use async_trait::async_trait;
use rand::RngExt;
use reqwest::Client;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::WatchConfig;
use crate::error::{Result, WatchError};
use crate::gql::GqlOperation;

/// Transport used by [`Channel`](crate::Channel).
///
/// Errors are returned as-is to the caller of the channel operation;
/// implementations decide on timeouts and retries.
#[async_trait]
pub trait TwitchClient: Send + Sync {
    /// GET `url` and return the decoded body.
    async fn fetch_text(&self, url: &str) -> Result<String>;

    /// POST `form` url-encoded to `url`, returning the response status.
    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<u16>;

    /// Run a persisted GraphQL operation.
    ///
    /// `Ok(None)` means the platform answered without usable data.
    async fn gql(&self, operation: &GqlOperation) -> Result<Option<Value>>;

    /// Id of the logged-in viewer.
    fn user_id(&self) -> u64;
}

pub fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}

fn device_id() -> String {
    // random device id of 16 digits
    format!(
        "{}",
        rand::rng().random_range(1000000000000000i64..9999999999999999i64)
    )
}

pub(crate) fn platform_headers(config: &WatchConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let insert = |headers: &mut HeaderMap, name: HeaderName, value: &str| -> Result<()> {
        let value = HeaderValue::from_str(value)
            .map_err(|e| WatchError::client(format!("invalid {name} header: {e}")))?;
        headers.insert(name, value);
        Ok(())
    };

    insert(&mut headers, header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")?;
    insert(&mut headers, header::REFERER, &config.base_url)?;
    insert(&mut headers, HeaderName::from_static("client-id"), &config.client_id)?;
    insert(&mut headers, HeaderName::from_static("device-id"), &device_id())?;
    if let Some(token) = config.oauth_token.as_deref() {
        insert(&mut headers, header::AUTHORIZATION, &format!("OAuth {token}"))?;
    }
    Ok(headers)
}

/// Maps a GraphQL response body to the [`TwitchClient::gql`] contract.
///
/// A `null` body or an `errors` list without `data` yields `Ok(None)`;
/// partial errors next to data are logged and the body is kept.
pub(crate) fn parse_gql_body(operation: &str, body: &str) -> Result<Option<Value>> {
    let value: Value = serde_json::from_str(body)?;
    if value.is_null() {
        return Ok(None);
    }
    let has_data = value.get("data").is_some_and(|d| !d.is_null());
    if let Some(errors) = value.get("errors").filter(|e| !e.is_null()) {
        if !has_data {
            warn!(operation, "gql request failed: {}", errors);
            return Ok(None);
        }
        debug!(operation, "gql partial errors: {}", errors);
    }
    Ok(Some(value))
}

/// [`TwitchClient`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTwitchClient {
    client: Client,
    gql_url: String,
    user_id: u64,
}

impl HttpTwitchClient {
    pub fn new(config: &WatchConfig, user_id: u64) -> Result<Self> {
        install_rustls_provider();
        let client = Client::builder()
            .default_headers(platform_headers(config)?)
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_client(client, config, user_id))
    }

    /// Wraps an existing client; platform headers are the caller's responsibility.
    pub fn with_client(client: Client, config: &WatchConfig, user_id: u64) -> Self {
        Self {
            client,
            gql_url: config.gql_url.clone(),
            user_id,
        }
    }
}

#[async_trait]
impl TwitchClient for HttpTwitchClient {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<u16> {
        debug!("POST {}", url);
        let response = self.client.post(url).form(form).send().await?;
        Ok(response.status().as_u16())
    }

    async fn gql(&self, operation: &GqlOperation) -> Result<Option<Value>> {
        let response = self
            .client
            .post(&self.gql_url)
            .json(&operation.to_request())
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        debug!(operation = operation.name, "gql body: {}", body);
        parse_gql_body(operation.name, &body)
    }

    fn user_id(&self) -> u64 {
        self.user_id
    }
}
