//! Wire shapes of the GraphQL responses the tracker consumes.
//!
//! Ids come back as strings in some operations and as numbers in others;
//! [`deserialize_id`] coerces both into `u64`.

use serde::{Deserialize, Deserializer};

/// `GetStreamInfo` response envelope.
#[derive(Debug, Deserialize)]
pub struct StreamInfoResponse {
    pub data: Option<StreamInfoData>,
}

#[derive(Debug, Deserialize)]
pub struct StreamInfoData {
    /// `None` when no such channel exists.
    pub user: Option<StreamInfoUser>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamInfoUser {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: u64,
    #[serde(default)]
    pub stream: Option<StreamNode>,
    #[serde(default)]
    pub broadcast_settings: Option<BroadcastSettings>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamNode {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: u64,
    #[serde(default)]
    pub viewers_count: u64,
    #[serde(default)]
    pub tags: Option<Vec<Tag>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastSettings {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub game: Option<GameNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameNode {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    pub id: String,
}

/// `GameDirectory` response envelope.
#[derive(Debug, Deserialize)]
pub struct DirectoryResponse {
    pub data: Option<DirectoryData>,
}

#[derive(Debug, Deserialize)]
pub struct DirectoryData {
    pub game: Option<DirectoryGame>,
}

#[derive(Debug, Deserialize)]
pub struct DirectoryGame {
    #[serde(default)]
    pub streams: Option<DirectoryConnection>,
}

#[derive(Debug, Deserialize)]
pub struct DirectoryConnection {
    #[serde(default)]
    pub edges: Vec<DirectoryEdge>,
}

#[derive(Debug, Deserialize)]
pub struct DirectoryEdge {
    pub node: DirectoryStream,
}

/// One live stream as listed by a game directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryStream {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: u64,
    #[serde(default)]
    pub viewers_count: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<Tag>>,
    #[serde(default)]
    pub game: Option<GameNode>,
    pub broadcaster: Broadcaster,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Broadcaster {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: u64,
    #[serde(default)]
    pub login: Option<String>,
    pub display_name: String,
}

impl Broadcaster {
    /// Channel name used for urls and queries; the login when present.
    pub fn channel_name(&self) -> &str {
        self.login.as_deref().unwrap_or(&self.display_name)
    }
}

pub(crate) fn has_tag(tags: Option<&[Tag]>, tag_id: &str) -> bool {
    tags.is_some_and(|tags| tags.iter().any(|tag| tag.id == tag_id))
}

/// Accepts a non-negative integer or a string holding one.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = u64;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("an integer id or a string containing one")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u64::try_from(v).map_err(|_| E::custom(format!("negative id: {v}")))
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            v.trim()
                .parse::<u64>()
                .map_err(|_| E::custom(format!("invalid id: {v:?}")))
        }
    }

    deserializer.deserialize_any(IdVisitor)
}
