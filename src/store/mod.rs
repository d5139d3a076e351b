pub mod disk;
pub mod memory;

use crate::core::cache::{KeyValueCollection, Store};
use anyhow::{Context, Result};
use disk::DiskCollection;
use fjall::{Keyspace, PartitionCreateOptions};
use memory::MemoryCollection;
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, RwLock},
};
use tracing::debug;

/// A thread-safe key-value store that can hold multiple collections.
///
/// Persistent collections live in a fjall keyspace on disk; in-memory ones
/// vanish with the process.
pub struct KeyValueStore {
    collections: RwLock<HashMap<String, Arc<dyn KeyValueCollection>>>,
    keyspace: Arc<Keyspace>,
}

impl KeyValueStore {
    pub fn open(data_path: &Path) -> Result<Self> {
        let cache_dir = data_path.join("cache");
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create directory: {}", cache_dir.display()))?;
        let keyspace = fjall::Config::new(&cache_dir)
            .open()
            .with_context(|| format!("Failed to open store at {}", cache_dir.display()))?;
        debug!("Opened key-value store at {}", cache_dir.display());

        Ok(Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: Arc::new(keyspace),
        })
    }

    fn create_collection(&self, name: &str, persist: bool) -> Option<Arc<dyn KeyValueCollection>> {
        if !persist {
            return Some(Arc::new(MemoryCollection::new()));
        }
        match self
            .keyspace
            .open_partition(name, PartitionCreateOptions::default())
        {
            Ok(partition) => Some(Arc::new(DiskCollection::new(
                Arc::clone(&self.keyspace),
                partition,
            ))),
            Err(e) => {
                debug!("Failed to open partition {}: {}", name, e);
                None
            }
        }
    }
}

impl Store for KeyValueStore {
    fn get_collection(
        &self,
        name: &str,
        persist: bool,
        create_if_missing: bool,
    ) -> Option<Arc<dyn KeyValueCollection>> {
        if let Ok(collections) = self.collections.read()
            && let Some(collection) = collections.get(name)
        {
            return Some(Arc::clone(collection));
        }
        if !create_if_missing {
            return None;
        }

        let mut collections = self.collections.write().ok()?;
        if let Some(collection) = collections.get(name) {
            return Some(Arc::clone(collection));
        }
        let collection = self.create_collection(name, persist)?;
        collections.insert(name.to_string(), Arc::clone(&collection));
        Some(collection)
    }
}
