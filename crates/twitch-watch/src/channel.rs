//! Channel live-status state machine.
//!
//! A channel is `Offline`, `PendingOnline` (a stream-up notification was
//! received and a confirming poll is scheduled) or `Online` (a polled
//! stream snapshot is held). The stream-up notification arrives before the
//! stream is queryable, so it is only trusted once a delayed
//! [`Channel::reconcile`] confirms it. A stream-down notification is
//! trusted immediately.

use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::TwitchClient;
use crate::config::WatchConfig;
use crate::error::{Result, WatchError};
use crate::gql;
use crate::models::{DirectoryStream, StreamInfoResponse, StreamInfoUser};
use crate::spade;
use crate::stream::Stream;
use crate::watch::{WatchEvent, encode_payload};

/// Observable channel status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelStatus {
    Offline,
    PendingOnline,
    Online,
}

impl ChannelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offline => "OFFLINE",
            Self::PendingOnline => "PENDING_ONLINE",
            Self::Online => "ONLINE",
        }
    }
}

impl std::fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to a scheduled online confirmation.
#[derive(Debug)]
pub struct PendingConfirmation {
    handle: JoinHandle<()>,
}

impl PendingConfirmation {
    /// Cancels the confirmation. No-op if it already finished.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Result of one `GetStreamInfo` poll.
#[derive(Debug)]
enum Observation {
    /// The query came back empty; nothing is known.
    NoAnswer,
    NoSuchChannel,
    User(StreamInfoUser),
}

async fn observe(client: &dyn TwitchClient, name: &str) -> Result<Observation> {
    let Some(value) = client.gql(&gql::get_stream_info(name)).await? else {
        return Ok(Observation::NoAnswer);
    };
    let response: StreamInfoResponse = serde_json::from_value(value)?;
    let data = response
        .data
        .ok_or_else(|| WatchError::gql("GetStreamInfo response without data"))?;
    Ok(match data.user {
        Some(user) => Observation::User(user),
        None => Observation::NoSuchChannel,
    })
}

#[derive(Debug, Default)]
struct ChannelState {
    id: u64,
    initialized: bool,
    stream: Option<Stream>,
    spade_url: Option<String>,
    pending: Option<PendingConfirmation>,
    /// Bumped whenever a pending confirmation is superseded.
    generation: u64,
}

impl ChannelState {
    fn has_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| !p.is_finished())
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
        self.generation += 1;
    }

    fn apply(&mut self, observation: Observation, drops_tag: &str) -> Option<Stream> {
        match observation {
            Observation::NoAnswer => return self.stream.clone(),
            Observation::NoSuchChannel => {
                self.stream = None;
            }
            Observation::User(user) => {
                self.id = user.id;
                self.stream = Stream::from_stream_info(&user, drops_tag);
            }
        }
        self.initialized = true;
        if self.stream.is_some() && self.pending.is_some() {
            self.cancel_pending();
        }
        self.stream.clone()
    }
}

struct ChannelInner {
    client: Arc<dyn TwitchClient>,
    config: Arc<WatchConfig>,
    name: String,
    url: String,
    state: Mutex<ChannelState>,
}

impl ChannelInner {
    fn apply(&self, observation: Observation) -> Option<Stream> {
        if matches!(observation, Observation::NoAnswer) {
            warn!(channel = %self.name, "empty stream info response, keeping cached state");
        }
        self.state
            .lock()
            .apply(observation, &self.config.drops_enabled_tag)
    }

    fn finish_confirmation(&self, generation: u64, result: Result<Observation>) {
        let mut state = self.state.lock();
        if state.generation != generation {
            debug!(channel = %self.name, "dropping superseded online confirmation");
            return;
        }
        state.pending = None;
        match result {
            Ok(observation) => {
                let stream = state.apply(observation, &self.config.drops_enabled_tag);
                match stream {
                    Some(stream) => info!(
                        channel = %self.name,
                        broadcast_id = stream.broadcast_id,
                        "channel went online"
                    ),
                    None => debug!(channel = %self.name, "stream-up not confirmed"),
                }
            }
            Err(e) => warn!(channel = %self.name, error = %e, "online confirmation failed"),
        }
    }

    async fn confirm_online(inner: Weak<ChannelInner>, generation: u64, delay: Duration) {
        tokio::time::sleep(delay).await;
        // Only a weak reference is held while waiting, so dropping the channel stops us.
        let Some((client, name)) = inner
            .upgrade()
            .map(|inner| (inner.client.clone(), inner.name.clone()))
        else {
            return;
        };
        let result = observe(client.as_ref(), &name).await;
        if let Some(inner) = inner.upgrade() {
            inner.finish_confirmation(generation, result);
        }
    }
}

impl Drop for ChannelInner {
    fn drop(&mut self) {
        if let Some(pending) = self.state.get_mut().pending.take() {
            pending.cancel();
        }
    }
}

/// A tracked channel.
///
/// Cloning yields another handle to the same channel. Dropping the last
/// handle cancels a pending online confirmation.
///
/// Channels compare equal by platform id. Two channels that have not been
/// reconciled yet (id `0`) compare by name instead.
#[derive(Clone)]
pub struct Channel {
    inner: Arc<ChannelInner>,
}

impl Channel {
    /// Allocates an uninitialized channel; call [`Channel::initialize`] before relying on its id.
    pub fn new(
        client: Arc<dyn TwitchClient>,
        config: Arc<WatchConfig>,
        name: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let url = config.channel_url(&name);
        Self {
            inner: Arc::new(ChannelInner {
                client,
                config,
                name,
                url,
                state: Mutex::new(ChannelState::default()),
            }),
        }
    }

    /// Allocates and initializes a channel.
    pub async fn connect(
        client: Arc<dyn TwitchClient>,
        config: Arc<WatchConfig>,
        name: impl Into<String>,
    ) -> Result<Self> {
        let channel = Self::new(client, config, name);
        channel.initialize().await?;
        Ok(channel)
    }

    /// Builds a channel from a directory listing entry, which already carries the live stream.
    pub fn from_directory(
        client: Arc<dyn TwitchClient>,
        config: Arc<WatchConfig>,
        entry: &DirectoryStream,
    ) -> Self {
        let channel = Self::new(client, config, entry.broadcaster.channel_name());
        {
            let mut state = channel.inner.state.lock();
            state.id = entry.broadcaster.id;
            state.stream = Some(Stream::from_directory(
                entry,
                &channel.inner.config.drops_enabled_tag,
            ));
            state.initialized = true;
        }
        channel
    }

    /// Runs the first reconciliation.
    pub async fn initialize(&self) -> Result<Option<Stream>> {
        self.reconcile().await
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.state.lock().initialized
    }

    pub fn id(&self) -> u64 {
        self.inner.state.lock().id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn stream(&self) -> Option<Stream> {
        self.inner.state.lock().stream.clone()
    }

    pub fn spade_url(&self) -> Option<String> {
        self.inner.state.lock().spade_url.clone()
    }

    pub fn online(&self) -> bool {
        self.inner.state.lock().stream.is_some()
    }

    pub fn pending_online(&self) -> bool {
        self.inner.state.lock().has_pending()
    }

    pub fn status(&self) -> ChannelStatus {
        let state = self.inner.state.lock();
        if state.stream.is_some() {
            ChannelStatus::Online
        } else if state.has_pending() {
            ChannelStatus::PendingOnline
        } else {
            ChannelStatus::Offline
        }
    }

    /// Polls the authoritative stream state and replaces the cached one.
    pub async fn reconcile(&self) -> Result<Option<Stream>> {
        debug!(channel = %self.inner.name, "reconciling stream state");
        let observation = observe(self.inner.client.as_ref(), &self.inner.name).await?;
        Ok(self.inner.apply(observation))
    }

    /// Re-fetches the stream state and reports whether the channel is live.
    pub async fn is_live(&self) -> Result<bool> {
        self.reconcile().await?;
        Ok(self.online())
    }

    /// Handles a stream-up notification.
    ///
    /// Schedules a reconciliation after the configured online delay, unless
    /// the channel is already online or a confirmation is already pending.
    /// Must be called from within a Tokio runtime.
    pub fn set_online(&self) {
        let mut state = self.inner.state.lock();
        if state.stream.is_some() || state.has_pending() {
            return;
        }
        state.generation += 1;
        let generation = state.generation;
        let delay = self.inner.config.online_delay();
        debug!(channel = %self.inner.name, ?delay, "stream-up received, confirming later");

        let handle = tokio::spawn(ChannelInner::confirm_online(
            Arc::downgrade(&self.inner),
            generation,
            delay,
        ));
        state.pending = Some(PendingConfirmation { handle });
    }

    /// Handles a stream-down notification. Takes effect immediately.
    pub fn set_offline(&self) {
        let mut state = self.inner.state.lock();
        state.cancel_pending();
        state.stream = None;
        debug!(channel = %self.inner.name, "stream-down received");
    }

    /// Returns the cached spade URL, scraping it on first use.
    pub async fn resolve_spade_url(&self) -> Result<String> {
        if let Some(url) = self.spade_url() {
            return Ok(url);
        }
        let url = spade::discover_spade_url(self.inner.client.as_ref(), &self.inner.url).await?;
        Ok(self
            .inner
            .state
            .lock()
            .spade_url
            .get_or_insert(url)
            .clone())
    }

    /// Sends one `minute-watched` event for the current stream.
    ///
    /// Returns `Ok(None)` without any I/O when the channel is offline,
    /// otherwise whether the endpoint accepted the event (HTTP 204).
    pub async fn send_watch_tick(&self) -> Result<Option<bool>> {
        if !self.online() {
            return Ok(None);
        }
        let spade_url = self.resolve_spade_url().await?;

        // Discovery may have raced a stream-down; report the stream as it is now.
        let (channel_id, broadcast_id) = {
            let state = self.inner.state.lock();
            let Some(stream) = state.stream.as_ref() else {
                debug!(channel = %self.inner.name, "went offline during spade discovery");
                return Ok(None);
            };
            (state.id, stream.broadcast_id)
        };

        let event =
            WatchEvent::minute_watched(channel_id, broadcast_id, self.inner.client.user_id());
        let payload = encode_payload(&[event])?;
        debug!(channel = %self.inner.name, "Sending minute-watched");
        let status = self
            .inner
            .client
            .post_form(&spade_url, &[("data", payload.as_str())])
            .await?;
        Ok(Some(status == 204))
    }
}

impl PartialEq for Channel {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.id(), other.id());
        if a == 0 && b == 0 {
            self.inner.name == other.inner.name
        } else {
            a == b
        }
    }
}

impl Eq for Channel {}

impl Hash for Channel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("id", &self.id())
            .field("name", &self.inner.name)
            .field("status", &self.status())
            .finish()
    }
}
