//! Bulk discovery of live channels through a game directory.

use std::sync::Arc;

use tracing::debug;

use crate::channel::Channel;
use crate::client::TwitchClient;
use crate::config::WatchConfig;
use crate::error::Result;
use crate::gql;
use crate::models::DirectoryResponse;

/// Lists the live, drops-enabled channels of the game `slug`.
///
/// Every returned channel is already online; no per-channel query is made.
pub async fn fetch_live_channels(
    client: Arc<dyn TwitchClient>,
    config: Arc<WatchConfig>,
    slug: &str,
) -> Result<Vec<Channel>> {
    let operation = gql::game_directory(slug, config.directory_limit, &config.drops_enabled_tag);
    let Some(value) = client.gql(&operation).await? else {
        return Ok(Vec::new());
    };
    let response: DirectoryResponse = serde_json::from_value(value)?;

    let edges = response
        .data
        .and_then(|d| d.game)
        .and_then(|g| g.streams)
        .map(|s| s.edges)
        .unwrap_or_default();
    debug!(game = slug, count = edges.len(), "directory listing");

    Ok(edges
        .iter()
        .map(|edge| Channel::from_directory(client.clone(), config.clone(), &edge.node))
        .collect())
}
