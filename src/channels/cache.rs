use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{flatten_channels, ChannelEntry, ChannelSource};
use crate::error::UpstreamError;

/// Entries younger than this are served without touching upstream.
pub const DEFAULT_FRESH_FOR: Duration = Duration::from_secs(5 * 60);

/// Entries older than this are never served; callers wait for a refresh.
pub const DEFAULT_EXPIRE_AFTER: Duration = Duration::from_secs(10 * 60);

/// Single shared cache entry for the flattened channel directory.
///
/// Fresh entries are returned as-is. Stale entries (between `fresh_for` and
/// `expire_after`) are returned while one background refresh runs. Missing or
/// expired entries make callers wait for a refresh. At most one upstream fetch
/// is in flight at a time; callers that queued behind it take its result.
#[derive(Clone)]
pub struct ChannelDirectory {
    inner: Arc<Inner>,
}

struct Inner {
    source: Arc<dyn ChannelSource>,
    fresh_for: Duration,
    expire_after: Duration,
    state: RwLock<State>,
    refresh: Mutex<()>,
}

#[derive(Default)]
struct State {
    entry: Option<Entry>,
    /// Bumped after every completed fetch, successful or not.
    generation: u64,
    last_error: Option<String>,
}

#[derive(Clone)]
struct Entry {
    channels: Vec<ChannelEntry>,
    fetched_at: Instant,
}

impl ChannelDirectory {
    pub fn new(source: Arc<dyn ChannelSource>) -> Self {
        Self::with_windows(source, DEFAULT_FRESH_FOR, DEFAULT_EXPIRE_AFTER)
    }

    pub fn with_windows(
        source: Arc<dyn ChannelSource>,
        fresh_for: Duration,
        expire_after: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                fresh_for,
                expire_after: expire_after.max(fresh_for),
                state: RwLock::new(State::default()),
                refresh: Mutex::new(()),
            }),
        }
    }

    /// The flattened channel list, refreshed according to the cache windows.
    pub async fn get(&self) -> Result<Vec<ChannelEntry>, UpstreamError> {
        let cached = self.inner.state.read().entry.clone();
        if let Some(entry) = cached {
            let age = entry.fetched_at.elapsed();
            if age < self.inner.fresh_for {
                return Ok(entry.channels);
            }
            if age < self.inner.expire_after {
                self.spawn_background_refresh();
                return Ok(entry.channels);
            }
        }
        self.inner.refresh_shared().await
    }

    fn spawn_background_refresh(&self) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            // a refresh is already running; its result will land in the cache
            let Ok(_guard) = inner.refresh.try_lock() else {
                return;
            };
            if inner.is_fresh() {
                return;
            }
            if let Err(e) = inner.fetch_and_store().await {
                tracing::warn!("background channel refresh failed, serving stale list: {e}");
            }
        });
    }
}

impl Inner {
    fn is_fresh(&self) -> bool {
        self.state
            .read()
            .entry
            .as_ref()
            .is_some_and(|e| e.fetched_at.elapsed() < self.fresh_for)
    }

    /// Wait for the refresh lock. If another caller completed a fetch while we
    /// waited, share its outcome instead of fetching again.
    async fn refresh_shared(&self) -> Result<Vec<ChannelEntry>, UpstreamError> {
        let seen = self.state.read().generation;
        let _guard = self.refresh.lock().await;
        {
            let state = self.state.read();
            if state.generation != seen {
                if let Some(err) = &state.last_error {
                    return Err(UpstreamError::Unavailable(err.clone()));
                }
                if let Some(entry) = &state.entry {
                    return Ok(entry.channels.clone());
                }
            }
        }
        self.fetch_and_store().await
    }

    /// Callers must hold the refresh lock.
    async fn fetch_and_store(&self) -> Result<Vec<ChannelEntry>, UpstreamError> {
        let result = self.source.fetch_channels().await;
        let mut state = self.state.write();
        state.generation += 1;
        match result {
            Ok(raw) => {
                let channels = flatten_channels(&raw);
                tracing::debug!(channels = channels.len(), "channel directory refreshed");
                state.entry = Some(Entry {
                    channels: channels.clone(),
                    fetched_at: Instant::now(),
                });
                state.last_error = None;
                Ok(channels)
            }
            Err(e) => {
                state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
