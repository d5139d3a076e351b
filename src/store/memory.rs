use crate::core::cache::KeyValueCollection;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// Process-local collection. Contents vanish with the process.
#[derive(Default)]
pub struct MemoryCollection {
    inner: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueCollection for MemoryCollection {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        let entries = self.inner.lock().await;
        let value = entries.get(key).cloned();
        if value.is_some() {
            debug!("Cache HIT for key: {}", String::from_utf8_lossy(key));
        } else {
            debug!("Cache MISS for key: {}", String::from_utf8_lossy(key));
        }
        value
    }

    async fn put_all(&self, batch: Vec<(Vec<u8>, Vec<u8>)>) -> Result<()> {
        let mut entries = self.inner.lock().await;
        for (key, value) in batch {
            debug!("Cache PUT for key: {}", String::from_utf8_lossy(&key));
            entries.insert(key, value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_get_put() {
        let collection = MemoryCollection::new();

        assert!(collection.get(b"key1").await.is_none());

        collection
            .put_all(vec![
                (b"key1".to_vec(), b"one".to_vec()),
                (b"key2".to_vec(), b"two".to_vec()),
            ])
            .await
            .unwrap();

        assert_eq!(collection.get(b"key1").await, Some(b"one".to_vec()));
        assert_eq!(collection.get(b"key2").await, Some(b"two".to_vec()));
        assert!(collection.get(b"key3").await.is_none());
    }

    #[tokio::test]
    async fn test_memory_overwrite() {
        let collection = MemoryCollection::new();
        collection
            .put_all(vec![(b"key".to_vec(), b"old".to_vec())])
            .await
            .unwrap();
        collection
            .put_all(vec![(b"key".to_vec(), b"new".to_vec())])
            .await
            .unwrap();
        assert_eq!(collection.get(b"key").await, Some(b"new".to_vec()));
    }
}
