//! Key-value persistence abstraction

use anyhow::Result;
use async_trait::async_trait;

/// A string-keyed store holding serialized records.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}
