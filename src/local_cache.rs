//! Last-known-good rate table, persisted across restarts.

use crate::core::cache::{KeyValueCollection, Store};
use crate::core::rates::RateTable;
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

pub const COLLECTION_NAME: &str = "exchange_rates";
const RATES_KEY: &[u8] = b"saved_exchange_rates";
const LAST_UPDATED_KEY: &[u8] = b"saved_last_updated";

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub table: RateTable,
    pub saved_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct LocalCache {
    collection: Arc<dyn KeyValueCollection>,
}

impl LocalCache {
    pub fn new(collection: Arc<dyn KeyValueCollection>) -> Self {
        Self { collection }
    }

    /// Opens the cache collection in `store`, on disk when the store supports it.
    pub fn from_store(store: &dyn Store, persist: bool) -> Result<Self> {
        let collection = store
            .get_collection(COLLECTION_NAME, persist, true)
            .ok_or_else(|| anyhow!("Failed to open collection: {}", COLLECTION_NAME))?;
        Ok(Self::new(collection))
    }

    /// Replaces the saved table and timestamp together.
    pub async fn save(&self, table: &RateTable, saved_at: DateTime<Utc>) -> Result<()> {
        let rates = serde_json::to_vec(table).context("Failed to encode rate table")?;
        let timestamp = saved_at.to_rfc3339().into_bytes();
        self.collection
            .put_all(vec![
                (RATES_KEY.to_vec(), rates),
                (LAST_UPDATED_KEY.to_vec(), timestamp),
            ])
            .await?;
        debug!("Saved {} rates to local cache", table.len());
        Ok(())
    }

    pub async fn load(&self) -> Option<CacheEntry> {
        let bytes = self.collection.get(RATES_KEY).await?;
        let table: RateTable = match serde_json::from_slice(&bytes) {
            Ok(table) => table,
            Err(e) => {
                warn!("Ignoring unreadable cached rates: {}", e);
                return None;
            }
        };

        let saved_at = self
            .collection
            .get(LAST_UPDATED_KEY)
            .await
            .and_then(|raw| String::from_utf8(raw).ok())
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| {
                debug!("Cached rates have no readable timestamp, using now");
                Utc::now()
            });

        Some(CacheEntry { table, saved_at })
    }

    pub async fn exists(&self) -> bool {
        self.load().await.is_some()
    }
}
