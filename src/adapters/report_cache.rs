//! Report Cache
//!
//! Memoizes fetched (report, graph) pairs per token with a bounded freshness
//! window, and collapses concurrent fetches for the same key into a single
//! provider call. Waiters share the in-flight fetch through a watch channel;
//! the fetch itself runs on a spawned task, so a cancelled waiter never
//! cancels a fetch other callers are waiting on.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::{watch, Mutex};

use crate::domain::{RawRiskReport, TokenGraph};
use crate::ports::{ProviderError, TokenDataProvider};

/// Default freshness window for cached snapshots (5 minutes)
pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(300);
/// Default bound on a single provider fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
/// Default max cache entries
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CacheError {
    /// Transient failure surfaced to the caller; never cached, so a later
    /// request refetches.
    #[error("fetch for {token} failed: {source}")]
    FetchFailed {
        token: String,
        #[source]
        source: ProviderError,
    },
}

/// A memoized fetch result: the raw report and holder graph for one token.
#[derive(Debug, Clone)]
pub struct CachedSnapshot {
    pub report: Arc<RawRiskReport>,
    pub graph: Arc<TokenGraph>,
    pub fetched_at: Instant,
}

impl CachedSnapshot {
    fn is_fresh(&self, window: Duration) -> bool {
        self.fetched_at.elapsed() < window
    }
}

type FetchResult = Result<CachedSnapshot, CacheError>;

/// One cache slot: either a memoized snapshot or a fetch in flight that
/// late arrivals subscribe to.
enum Slot {
    Ready(CachedSnapshot),
    InFlight(watch::Receiver<Option<FetchResult>>),
}

/// Cache tuning knobs.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// How long a snapshot stays fresh before the next access refetches
    pub freshness_window: Duration,
    /// Upper bound on one combined report+graph fetch
    pub fetch_timeout: Duration,
    /// Maximum entries before cleanup and oldest-entry eviction
    pub max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            freshness_window: DEFAULT_FRESHNESS_WINDOW,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub total_entries: usize,
    pub fresh_entries: usize,
    pub in_flight: usize,
}

/// Deduplicating, memoizing front for the token data provider.
#[derive(Clone)]
pub struct ReportCache {
    provider: Arc<dyn TokenDataProvider>,
    slots: Arc<Mutex<HashMap<String, Slot>>>,
    settings: CacheSettings,
}

impl ReportCache {
    pub fn new(provider: Arc<dyn TokenDataProvider>) -> Self {
        Self::with_settings(provider, CacheSettings::default())
    }

    pub fn with_settings(provider: Arc<dyn TokenDataProvider>, settings: CacheSettings) -> Self {
        Self {
            provider,
            slots: Arc::new(Mutex::new(HashMap::new())),
            settings,
        }
    }

    /// Return the fresh snapshot for a token, fetching it at most once no
    /// matter how many callers arrive concurrently.
    ///
    /// A fresh entry is returned as-is. An expired or missing entry starts
    /// one fetch; callers arriving while it is in flight wait on that fetch
    /// instead of issuing their own. Failures surface as `FetchFailed` and
    /// leave no cache entry behind.
    pub async fn get_or_fetch(&self, token: &str) -> FetchResult {
        let rx = {
            let mut slots = self.slots.lock().await;
            match slots.get(token) {
                Some(Slot::Ready(snapshot))
                    if snapshot.is_fresh(self.settings.freshness_window) =>
                {
                    tracing::debug!(%token, "cache hit");
                    return Ok(snapshot.clone());
                }
                Some(Slot::InFlight(rx)) => {
                    tracing::debug!(%token, "joining in-flight fetch");
                    rx.clone()
                }
                _ => {
                    self.enforce_capacity(&mut slots);
                    let (tx, rx) = watch::channel(None);
                    slots.insert(token.to_string(), Slot::InFlight(rx.clone()));
                    self.spawn_fetch(token.to_string(), tx);
                    rx
                }
            }
        };

        match Self::await_fetch(rx).await {
            Some(result) => result,
            // Sender dropped without publishing a result; report as a
            // transient failure rather than hang.
            None => Err(CacheError::FetchFailed {
                token: token.to_string(),
                source: ProviderError::Network("fetch task aborted".to_string()),
            }),
        }
    }

    /// Drop a token's cached snapshot, forcing the next access to refetch.
    pub async fn invalidate(&self, token: &str) {
        let mut slots = self.slots.lock().await;
        if matches!(slots.get(token), Some(Slot::Ready(_))) {
            slots.remove(token);
        }
    }

    /// Current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let slots = self.slots.lock().await;
        let mut fresh = 0;
        let mut in_flight = 0;
        for slot in slots.values() {
            match slot {
                Slot::Ready(s) if s.is_fresh(self.settings.freshness_window) => fresh += 1,
                Slot::Ready(_) => {}
                Slot::InFlight(_) => in_flight += 1,
            }
        }
        CacheStats {
            total_entries: slots.len(),
            fresh_entries: fresh,
            in_flight,
        }
    }

    /// Wait for the shared fetch to publish its result.
    async fn await_fetch(mut rx: watch::Receiver<Option<FetchResult>>) -> Option<FetchResult> {
        loop {
            if let Some(result) = (*rx.borrow()).clone() {
                return Some(result);
            }
            if rx.changed().await.is_err() {
                return (*rx.borrow()).clone();
            }
        }
    }

    /// Run the provider fetch on its own task. The task completes and
    /// populates the cache even when every waiter has gone away.
    fn spawn_fetch(&self, token: String, tx: watch::Sender<Option<FetchResult>>) {
        let provider = Arc::clone(&self.provider);
        let slots = Arc::clone(&self.slots);
        let timeout = self.settings.fetch_timeout;

        tokio::spawn(async move {
            let result = Self::run_fetch(provider, &token, timeout).await;

            let mut slots = slots.lock().await;
            match &result {
                Ok(snapshot) => {
                    slots.insert(token.clone(), Slot::Ready(snapshot.clone()));
                }
                Err(error) => {
                    tracing::warn!(%token, %error, "fetch failed, not caching");
                    slots.remove(&token);
                }
            }
            drop(slots);

            let _ = tx.send(Some(result));
        });
    }

    /// Fetch report and graph concurrently under one timeout.
    async fn run_fetch(
        provider: Arc<dyn TokenDataProvider>,
        token: &str,
        timeout: Duration,
    ) -> FetchResult {
        let fetch = async {
            tokio::try_join!(provider.fetch_report(token), provider.fetch_graph(token))
        };

        match tokio::time::timeout(timeout, fetch).await {
            Ok(Ok((report, graph))) => {
                tracing::info!(%token, signals = report.signals.len(), edges = graph.edges.len(), "fetched token data");
                Ok(CachedSnapshot {
                    report: Arc::new(report),
                    graph: Arc::new(graph),
                    fetched_at: Instant::now(),
                })
            }
            Ok(Err(source)) => Err(CacheError::FetchFailed {
                token: token.to_string(),
                source,
            }),
            Err(_) => Err(CacheError::FetchFailed {
                token: token.to_string(),
                source: ProviderError::Timeout(timeout),
            }),
        }
    }

    /// Drop expired entries; if still at capacity, evict the oldest ready
    /// entry. In-flight slots are never evicted.
    fn enforce_capacity(&self, slots: &mut HashMap<String, Slot>) {
        if slots.len() < self.settings.max_entries {
            return;
        }

        let window = self.settings.freshness_window;
        slots.retain(|_, slot| match slot {
            Slot::Ready(snapshot) => snapshot.is_fresh(window),
            Slot::InFlight(_) => true,
        });

        if slots.len() >= self.settings.max_entries {
            let oldest = slots
                .iter()
                .filter_map(|(key, slot)| match slot {
                    Slot::Ready(snapshot) => Some((key.clone(), snapshot.fetched_at)),
                    Slot::InFlight(_) => None,
                })
                .min_by_key(|(_, fetched_at)| *fetched_at)
                .map(|(key, _)| key);
            if let Some(key) = oldest {
                slots.remove(&key);
            }
        }
    }
}
