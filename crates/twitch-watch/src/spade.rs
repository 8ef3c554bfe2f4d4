//! Discovery of the private telemetry ("spade") endpoint.
//!
//! The endpoint is not exposed by any API. It is found by walking
//! channel page (HTML) -> settings script (JavaScript) -> spade URL.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::client::TwitchClient;
use crate::error::{ExtractionError, ExtractionStep, Result};

static SETTINGS_SCRIPT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)src="(https://[\w.\-]+/config/settings\.[0-9a-f]{32}\.js)""#).unwrap()
});

static SPADE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)"spade_url": ?"(https://video-edge-[.\w\-/]+\.ts)""#).unwrap()
});

#[inline]
fn capture_group_1<'a>(re: &Regex, input: &'a str) -> Option<&'a str> {
    re.captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Finds the versioned settings script referenced by a channel page.
pub fn extract_script_url(html: &str) -> std::result::Result<&str, ExtractionError> {
    capture_group_1(&SETTINGS_SCRIPT_REGEX, html)
        .ok_or_else(|| ExtractionError::new(ExtractionStep::SettingsScript))
}

/// Finds the `spade_url` assignment inside a settings script.
pub fn extract_spade_url(script: &str) -> std::result::Result<&str, ExtractionError> {
    capture_group_1(&SPADE_URL_REGEX, script)
        .ok_or_else(|| ExtractionError::new(ExtractionStep::SpadeUrl))
}

/// Runs both scrape stages against `channel_url`.
pub async fn discover_spade_url(client: &dyn TwitchClient, channel_url: &str) -> Result<String> {
    let html = client.fetch_text(channel_url).await?;
    let script_url = extract_script_url(&html)?;
    debug!("settings script: {}", script_url);

    let script = client.fetch_text(script_url).await?;
    let spade_url = extract_spade_url(&script)?;
    debug!("spade url: {}", spade_url);
    Ok(spade_url.to_string())
}
