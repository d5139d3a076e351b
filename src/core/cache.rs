//! Key-value persistence abstractions

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A named bag of byte keys and values.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Writes every entry or none of them.
    async fn put_all(&self, entries: Vec<(Vec<u8>, Vec<u8>)>) -> Result<()>;
}

pub trait Store: Send + Sync {
    fn get_collection(
        &self,
        name: &str,
        persist: bool,
        create_if_missing: bool,
    ) -> Option<Arc<dyn KeyValueCollection>>;
}
