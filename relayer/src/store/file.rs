//! The reference deposit store: one `<id>.json` file per record under a
//! configured directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::model::DepositRecord;
use crate::store::{DepositRead, DepositWrite};

/// A filesystem-backed deposit store. The data directory is created on
/// demand. A single in-process mutex serializes writes so that
/// `put_if_absent` can be implemented as a read-then-write without losing
/// the "only one winner" guarantee against concurrent callers in this
/// process (cross-process concurrent writers are explicitly undefined,
/// see the concurrency model).
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Construct a store rooted at `dir`, the `JSON_PATH` configuration
    /// value. The directory is not created until first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    async fn read_record(path: &Path) -> Result<Option<DepositRecord>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let record = serde_json::from_slice(&bytes).map_err(|source| Error::StoreCorrupt {
                    path: path.to_path_buf(),
                    source,
                })?;
                Ok(Some(record))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::StoreIo(err)),
        }
    }
}

#[async_trait]
impl DepositRead for FileStore {
    async fn get(&self, id: &str) -> Result<Option<DepositRecord>> {
        Self::read_record(&self.path_for(id)).await
    }

    async fn list(&self) -> Result<Vec<DepositRecord>> {
        let mut out = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(out),
            Err(err) => return Err(Error::StoreIo(err)),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read_record(&path).await {
                Ok(Some(record)) => out.push(record),
                Ok(None) => {}
                Err(error) => {
                    // Corruption policy: skip and log, the scan continues.
                    tracing::error!(?path, %error, "skipping unreadable deposit record");
                }
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl DepositWrite for FileStore {
    async fn put(&self, record: DepositRecord) -> Result<()> {
        self.ensure_dir().await?;
        let path = self.path_for(&record.id);
        let bytes = serde_json::to_vec_pretty(&record)?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    async fn put_if_absent(&self, record: DepositRecord) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        if self.get(&record.id).await?.is_some() {
            return Ok(false);
        }
        self.put(record).await?;
        Ok(true)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(id)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::StoreIo(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DepositStatus;
    use crate::testing::dummy;

    #[tokio::test]
    async fn round_trips_a_record_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let mut rng = rand::thread_rng();
        let record = dummy::deposit_record(&mut rng, DepositStatus::Initialized);

        store.put(record.clone()).await.unwrap();
        let fetched = store.get(&record.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, record.id);
        assert_eq!(fetched.status, record.status);
    }

    #[tokio::test]
    async fn list_skips_corrupt_files_without_failing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let mut rng = rand::thread_rng();
        let good = dummy::deposit_record(&mut rng, DepositStatus::Queued);
        store.put(good.clone()).await.unwrap();

        tokio::fs::write(dir.path().join("not-json.json"), b"{ not valid")
            .await
            .unwrap();

        let records = store.list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, good.id);
    }

    #[tokio::test]
    async fn put_if_absent_preserves_the_first_writer() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let mut rng = rand::thread_rng();
        let mut record = dummy::deposit_record(&mut rng, DepositStatus::Queued);
        record.id = "shared-id".to_string();

        let mut later = record.clone();
        later.error = Some("should not overwrite".to_string());

        assert!(store.put_if_absent(record.clone()).await.unwrap());
        assert!(!store.put_if_absent(later).await.unwrap());

        let fetched = store.get("shared-id").await.unwrap().unwrap();
        assert_eq!(fetched.error, None);
    }
}
