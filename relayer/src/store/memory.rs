//! An in-memory deposit store, used by every unit test in this crate
//! instead of touching the filesystem — mirrors the teacher's
//! `storage::in_memory::Store::new_shared()` used throughout
//! `block_observer.rs`'s test module.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::model::DepositRecord;
use crate::store::{DepositRead, DepositWrite};

/// An in-memory, process-local deposit store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<String, DepositRecord>>>,
}

impl MemoryStore {
    /// Construct an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DepositRead for MemoryStore {
    async fn get(&self, id: &str) -> Result<Option<DepositRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<DepositRecord>> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}

#[async_trait]
impl DepositWrite for MemoryStore {
    async fn put(&self, record: DepositRecord) -> Result<()> {
        self.records.write().await.insert(record.id.clone(), record);
        Ok(())
    }

    async fn put_if_absent(&self, record: DepositRecord) -> Result<bool> {
        let mut guard = self.records.write().await;
        if guard.contains_key(&record.id) {
            return Ok(false);
        }
        guard.insert(record.id.clone(), record);
        Ok(true)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.records.write().await.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DepositStatus;
    use crate::testing::dummy;

    #[tokio::test]
    async fn put_if_absent_is_idempotent() {
        let store = MemoryStore::new();
        let mut rng = rand::thread_rng();
        let record = dummy::deposit_record(&mut rng, DepositStatus::Queued);

        assert!(store.put_if_absent(record.clone()).await.unwrap());
        assert!(!store.put_if_absent(record.clone()).await.unwrap());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_by_status_filters() {
        let store = MemoryStore::new();
        let mut rng = rand::thread_rng();
        let queued = dummy::deposit_record(&mut rng, DepositStatus::Queued);
        let finalized = dummy::deposit_record(&mut rng, DepositStatus::Finalized);

        store.put(queued.clone()).await.unwrap();
        store.put(finalized.clone()).await.unwrap();

        let result = store.list_by_status(DepositStatus::Finalized).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, finalized.id);
    }
}
