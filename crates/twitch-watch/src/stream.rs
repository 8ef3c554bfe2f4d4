//! Snapshot of one observed live session.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{DirectoryStream, GameNode, StreamInfoUser, has_tag};

/// The category a broadcaster is streaming under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Game {
    pub id: u64,
    pub name: String,
    pub slug: Option<String>,
}

impl From<&GameNode> for Game {
    fn from(node: &GameNode) -> Self {
        let name = node
            .display_name
            .clone()
            .or_else(|| node.name.clone())
            .unwrap_or_default();
        Self {
            id: node.id,
            name,
            slug: node.slug.clone(),
        }
    }
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// An immutable live-session snapshot.
///
/// A `Stream` only exists for a channel that was live at `observed_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stream {
    pub broadcast_id: u64,
    pub viewer_count: u64,
    pub drops_enabled: bool,
    pub game: Option<Game>,
    pub title: String,
    pub observed_at: DateTime<Utc>,
}

impl Stream {
    /// Builds a snapshot from a polled stream-info user.
    ///
    /// Returns `None` when the user has no live stream.
    pub fn from_stream_info(user: &StreamInfoUser, drops_tag: &str) -> Option<Self> {
        let stream = user.stream.as_ref()?;
        let settings = user.broadcast_settings.as_ref();
        Some(Self {
            broadcast_id: stream.id,
            viewer_count: stream.viewers_count,
            drops_enabled: has_tag(stream.tags.as_deref(), drops_tag),
            game: settings.and_then(|s| s.game.as_ref()).map(Game::from),
            title: settings
                .and_then(|s| s.title.clone())
                .unwrap_or_default(),
            observed_at: Utc::now(),
        })
    }

    /// Builds a snapshot from a directory listing entry.
    pub fn from_directory(entry: &DirectoryStream, drops_tag: &str) -> Self {
        Self {
            broadcast_id: entry.id,
            viewer_count: entry.viewers_count,
            drops_enabled: has_tag(entry.tags.as_deref(), drops_tag),
            game: entry.game.as_ref().map(Game::from),
            title: entry.title.clone().unwrap_or_default(),
            observed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DROPS_ENABLED_TAG;
    use serde_json::{Value, json};

    fn stream_info_user(tags: Value, game: Value) -> StreamInfoUser {
        serde_json::from_value(json!({
            "id": "123",
            "login": "foo",
            "stream": { "id": "456", "viewersCount": 42, "tags": tags },
            "broadcastSettings": { "title": "hello", "game": game },
        }))
        .unwrap()
    }

    fn directory_entry(tags: Value) -> DirectoryStream {
        serde_json::from_value(json!({
            "id": 456,
            "viewersCount": 7,
            "title": "dir",
            "tags": tags,
            "game": { "id": "9", "name": "rust", "displayName": "Rust" },
            "broadcaster": { "id": "123", "login": "foo", "displayName": "Foo" },
        }))
        .unwrap()
    }

    #[test]
    fn test_from_stream_info() {
        let before = Utc::now();
        let user = stream_info_user(
            json!([{ "id": "other" }, { "id": DROPS_ENABLED_TAG }]),
            json!({ "id": "9", "name": "rust", "displayName": "Rust", "slug": "rust" }),
        );
        let stream = Stream::from_stream_info(&user, DROPS_ENABLED_TAG).unwrap();
        assert_eq!(stream.broadcast_id, 456);
        assert_eq!(stream.viewer_count, 42);
        assert!(stream.drops_enabled);
        assert_eq!(stream.title, "hello");
        let game = stream.game.unwrap();
        assert_eq!(game.id, 9);
        assert_eq!(game.name, "Rust");
        assert_eq!(game.slug.as_deref(), Some("rust"));
        assert!(stream.observed_at >= before);
    }

    #[test]
    fn test_from_stream_info_without_drops_or_game() {
        let user = stream_info_user(json!([{ "id": "other" }]), Value::Null);
        let stream = Stream::from_stream_info(&user, DROPS_ENABLED_TAG).unwrap();
        assert!(!stream.drops_enabled);
        assert!(stream.game.is_none());

        let user = stream_info_user(Value::Null, Value::Null);
        let stream = Stream::from_stream_info(&user, DROPS_ENABLED_TAG).unwrap();
        assert!(!stream.drops_enabled);
    }

    #[test]
    fn test_from_stream_info_offline() {
        let user: StreamInfoUser =
            serde_json::from_value(json!({ "id": "123", "stream": null })).unwrap();
        assert!(Stream::from_stream_info(&user, DROPS_ENABLED_TAG).is_none());
    }

    #[test]
    fn test_from_directory() {
        let stream = Stream::from_directory(
            &directory_entry(json!([{ "id": DROPS_ENABLED_TAG }])),
            DROPS_ENABLED_TAG,
        );
        assert_eq!(stream.broadcast_id, 456);
        assert_eq!(stream.viewer_count, 7);
        assert!(stream.drops_enabled);
        assert_eq!(stream.title, "dir");
        assert_eq!(stream.game.map(|g| g.name), Some("Rust".to_string()));

        let stream = Stream::from_directory(&directory_entry(json!([])), DROPS_ENABLED_TAG);
        assert!(!stream.drops_enabled);
    }
}
