use crate::core::store::KeyValueStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION_NAME: &str = "marketplace";

/// Store backed by a single fjall partition on disk.
pub struct DiskStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create store directory: {}", path.display()))?;

        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open store at {}", path.display()))?;
        let partition =
            keyspace.open_partition(PARTITION_NAME, PartitionCreateOptions::default())?;
        debug!("Opened store at {}", path.display());

        Ok(Self {
            keyspace,
            partition,
        })
    }

    fn persist(&self) -> Result<()> {
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to persist store")
    }
}

#[async_trait]
impl KeyValueStore for DiskStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self.partition.get(key)? {
            Some(bytes) => {
                debug!("Store HIT for key: {}", key);
                let value = String::from_utf8(bytes.to_vec())
                    .with_context(|| format!("Stored value for {key} is not UTF-8"))?;
                Ok(Some(value))
            }
            None => {
                debug!("Store MISS for key: {}", key);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.partition.insert(key, value)?;
        debug!("Store SET for key: {}", key);
        self.persist()
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.partition.remove(key)?;
        debug!("Store REMOVE for key: {}", key);
        self.persist()
    }
}
