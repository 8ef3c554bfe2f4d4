//! Persisted GraphQL operations used by the channel tracker.

use serde_json::{Map, Value, json};

/// A named, versioned persisted query plus its variables.
#[derive(Debug, Clone, PartialEq)]
pub struct GqlOperation {
    pub name: &'static str,
    pub sha256_hash: &'static str,
    pub variables: Value,
}

impl GqlOperation {
    pub fn new(name: &'static str, sha256_hash: &'static str) -> Self {
        Self {
            name,
            sha256_hash,
            variables: Value::Object(Map::new()),
        }
    }

    /// Shallow-merges `variables` over the current ones, `variables` wins.
    pub fn with_variables(mut self, variables: Value) -> Self {
        match (&mut self.variables, variables) {
            (Value::Object(base), Value::Object(overlay)) => base.extend(overlay),
            (slot, other) => *slot = other,
        }
        self
    }

    /// Builds the persisted-query request object posted to the GraphQL endpoint.
    pub fn to_request(&self) -> Value {
        json!({
            "operationName": self.name,
            "extensions": {
                "persistedQuery": {
                    "version": 1,
                    "sha256Hash": self.sha256_hash,
                }
            },
            "variables": self.variables,
        })
    }
}

/// Live stream status and broadcast settings of a single channel.
pub fn get_stream_info(channel: &str) -> GqlOperation {
    GqlOperation::new(
        "VideoPlayerStreamInfoOverlayChannel",
        "a5f2e34d626a9f4f5c0204f910bab2194948a9502089be558bb6e779a9e1b3d2",
    )
    .with_variables(json!({ "channel": channel }))
}

/// Live channels of a game directory, restricted to drops-enabled streams.
pub fn game_directory(slug: &str, limit: u32, drops_tag: &str) -> GqlOperation {
    GqlOperation::new(
        "DirectoryPage_Game",
        "df4bb6cc45055237bfaf3ead608bbafb79815c7100b6ee126719fac3762ddf8b",
    )
    .with_variables(json!({
        "limit": limit,
        "slug": slug,
        "imageWidth": 50,
        "options": {
            "includeRestricted": ["SUB_ONLY_LIVE"],
            "sort": "VIEWER_COUNT",
            "recommendationsContext": { "platform": "web" },
            "requestID": "JIRA-VXP-2397",
            "freeformTags": null,
            "tags": [drops_tag],
        },
        "sortTypeIsRecency": false,
    }))
}
