//! The exchange rate service.
//!
//! Owns the active [`RateTable`] and the status the UI renders. Lookups are
//! synchronous reads of whatever table is active; refreshing fetches from the
//! configured [`RateSource`] and swaps the table in one step. Only the most
//! recently started fetch may change state: each fetch carries a generation
//! number and its outcome is dropped if a newer fetch has started since.

use crate::core::defaults::default_rates;
use crate::core::rates::RateTable;
use crate::core::source::RateSource;
use crate::local_cache::LocalCache;
use crate::providers::normalize;
use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const STATUS_CHANNEL_CAPACITY: usize = 16;

pub const ONLINE_STATUS: &str = "Showing the latest exchange rates.";
pub const OFFLINE_STATUS: &str = "Offline mode: showing saved exchange rates.";

/// Where the active table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSource {
    Live,
    Cached,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready(TableSource),
}

/// Snapshot of everything the UI observes.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceStatus {
    pub phase: Phase,
    /// Origin of the table lookups currently read from, also while loading.
    pub table_source: TableSource,
    pub is_loading: bool,
    pub is_offline: bool,
    pub error_message: Option<String>,
    pub last_updated: DateTime<Utc>,
}

impl ServiceStatus {
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        now - self.last_updated > max_age
    }

    pub fn info_message(&self) -> &'static str {
        if self.is_offline {
            OFFLINE_STATUS
        } else {
            ONLINE_STATUS
        }
    }
}

struct State {
    table: RateTable,
    status: ServiceStatus,
}

pub struct RateService {
    source: Arc<dyn RateSource>,
    cache: LocalCache,
    state: RwLock<State>,
    generation: AtomicU64,
    /// Serializes cache access; holds the generation of the last saved table.
    saved_generation: Mutex<u64>,
    events: broadcast::Sender<ServiceStatus>,
}

impl RateService {
    /// Loads the cached table, or the defaults when nothing is cached. No
    /// fetch is made; call [`RateService::start`] for that.
    pub async fn new(source: Arc<dyn RateSource>, cache: LocalCache) -> Self {
        let (events, _receiver) = broadcast::channel(STATUS_CHANNEL_CAPACITY);
        let service = Self {
            source,
            cache,
            state: RwLock::new(State {
                table: default_rates(),
                status: ServiceStatus {
                    phase: Phase::Idle,
                    table_source: TableSource::Default,
                    is_loading: false,
                    is_offline: false,
                    error_message: None,
                    last_updated: Utc::now(),
                },
            }),
            generation: AtomicU64::new(0),
            saved_generation: Mutex::new(0),
            events,
        };

        let (table, table_source, last_updated) = service.fallback_table().await;
        info!(?table_source, "Loaded {} startup rates", table.len());
        service.update(|state| {
            state.table = table;
            state.status.phase = Phase::Ready(table_source);
            state.status.table_source = table_source;
            state.status.last_updated = last_updated;
        });
        service
    }

    /// Kicks off the startup fetch in the background.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        self.spawn_refresh()
    }

    pub fn spawn_refresh(self: &Arc<Self>) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move { service.refresh_rates().await })
    }

    /// Fetches, normalizes and installs a fresh table. Never fails: on error
    /// the cached or default table stays active and the status says why.
    pub async fn refresh_rates(&self) {
        let generation = self.begin_fetch();
        let outcome = self.source.fetch().await;

        if !self.is_current(generation) {
            debug!(generation, "Discarding result of superseded fetch");
            return;
        }

        match outcome {
            Ok(payload) => {
                let table = normalize(&payload.records);
                let now = Utc::now();
                let applied = self.apply(generation, |state| {
                    state.table = table.clone();
                    state.status.phase = Phase::Ready(TableSource::Live);
                    state.status.table_source = TableSource::Live;
                    state.status.last_updated = now;
                });
                if !applied {
                    return;
                }
                info!(
                    records = payload.records.len(),
                    "Installed {} live rates",
                    table.len()
                );
                self.save(generation, &table, now).await;
            }
            Err(error) => {
                warn!(%error, offline = error.is_offline(), "Exchange rate fetch failed");
                let (table, table_source, last_updated) = self.fallback_table().await;
                let message = error.user_message().to_string();
                let offline = error.is_offline();
                self.apply(generation, |state| {
                    state.table = table;
                    state.status.phase = Phase::Ready(table_source);
                    state.status.table_source = table_source;
                    state.status.last_updated = last_updated;
                    state.status.error_message = Some(message);
                    state.status.is_offline = offline;
                });
            }
        }
    }

    pub fn get_rate(&self, from: &str, to: &str) -> f64 {
        self.read().table.get_rate(from, to)
    }

    pub fn convert(&self, amount: f64, from: &str, to: &str) -> f64 {
        self.read().table.convert(amount, from, to)
    }

    pub fn table(&self) -> RateTable {
        self.read().table.clone()
    }

    pub fn status(&self) -> ServiceStatus {
        self.read().status.clone()
    }

    /// Receives a status snapshot after every state transition.
    pub fn subscribe(&self) -> broadcast::Receiver<ServiceStatus> {
        self.events.subscribe()
    }

    fn begin_fetch(&self) -> u64 {
        let mut state = self.write();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        state.status.phase = Phase::Loading;
        state.status.is_loading = true;
        state.status.is_offline = false;
        state.status.error_message = None;
        let snapshot = state.status.clone();
        drop(state);

        debug!(generation, "Fetching exchange rates");
        self.publish(snapshot);
        generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Applies `f` and ends the loading phase, unless a newer fetch started.
    fn apply(&self, generation: u64, f: impl FnOnce(&mut State)) -> bool {
        let mut state = self.write();
        if !self.is_current(generation) {
            debug!(generation, "Discarding result of superseded fetch");
            return false;
        }
        f(&mut *state);
        state.status.is_loading = false;
        let snapshot = state.status.clone();
        drop(state);

        self.publish(snapshot);
        true
    }

    fn update(&self, f: impl FnOnce(&mut State)) {
        let mut state = self.write();
        f(&mut *state);
        let snapshot = state.status.clone();
        drop(state);
        self.publish(snapshot);
    }

    /// Persists a live table unless a newer fetch already saved one.
    async fn save(&self, generation: u64, table: &RateTable, saved_at: DateTime<Utc>) {
        let mut saved_generation = self.saved_generation.lock().await;
        if *saved_generation > generation {
            debug!(generation, "Skipping save of superseded rates");
            return;
        }
        *saved_generation = generation;
        if let Err(e) = self.cache.save(table, saved_at).await {
            warn!(error = %e, "Failed to save rates to local cache");
        }
    }

    async fn fallback_table(&self) -> (RateTable, TableSource, DateTime<Utc>) {
        let _saving = self.saved_generation.lock().await;
        match self.cache.load().await {
            Some(entry) => (entry.table, TableSource::Cached, entry.saved_at),
            None => (default_rates(), TableSource::Default, Utc::now()),
        }
    }

    fn publish(&self, status: ServiceStatus) {
        // No subscribers is fine.
        let _ = self.events.send(status);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
