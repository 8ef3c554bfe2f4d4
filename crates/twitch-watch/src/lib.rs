//! # twitch-watch
//!
//! Live-status tracking of Twitch channels and `minute-watched` presence
//! pings for the ones that are online.
//!
//! ## Core Types
//!
//! - [`Channel`] - Per-channel state machine (offline / pending online / online)
//! - [`Stream`] - Immutable snapshot of a live session
//! - [`TwitchClient`] - HTTP and GraphQL capability channels run on
//! - [`HttpTwitchClient`] - `reqwest` implementation of [`TwitchClient`]
//!
//! ## Lifecycle
//!
//! An external event source calls [`Channel::set_online`] and
//! [`Channel::set_offline`] on stream-up / stream-down notifications. A
//! scheduler calls [`Channel::send_watch_tick`] about once a minute and
//! [`Channel::reconcile`] whenever it needs authoritative status.

pub mod channel;
pub mod client;
pub mod config;
pub mod directory;
pub mod error;
pub mod gql;
pub mod models;
pub mod spade;
pub mod stream;
pub mod watch;

#[cfg(test)]
mod test_utils;

pub use channel::{Channel, ChannelStatus, PendingConfirmation};
pub use client::{HttpTwitchClient, TwitchClient};
pub use config::WatchConfig;
pub use directory::fetch_live_channels;
pub use error::{ExtractionError, ExtractionStep, Result, WatchError};
pub use gql::GqlOperation;
pub use stream::{Game, Stream};
pub use watch::{WatchEvent, decode_payload, encode_payload};
