//! The deposit store: a durable key to record map, keyed by deposit id.
//!
//! This is the only persistent state in the relayer. Reconcilers and chain
//! handlers are written against the [`DepositRead`]/[`DepositWrite`] traits
//! rather than a concrete store, the same way the teacher codebase's
//! reconcile logic is written against `storage::DbRead`/`DbWrite` rather
//! than a specific backend.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{DepositRecord, DepositStatus};

/// Read access to the deposit store.
#[async_trait]
pub trait DepositRead: Send + Sync {
    /// Look up a record by id.
    async fn get(&self, id: &str) -> Result<Option<DepositRecord>>;

    /// Return every record. Implementations skip unreadable/corrupt
    /// entries rather than failing the whole scan.
    async fn list(&self) -> Result<Vec<DepositRecord>>;

    /// Return every record with the given status.
    async fn list_by_status(&self, status: DepositStatus) -> Result<Vec<DepositRecord>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|r| r.status == status)
            .collect())
    }
}

/// Write access to the deposit store.
#[async_trait]
pub trait DepositWrite: Send + Sync {
    /// Overwrite the record for `record.id`. Last writer wins within a
    /// single process.
    async fn put(&self, record: DepositRecord) -> Result<()>;

    /// Insert `record` only if no record with that id already exists.
    /// Returns `true` if the record was inserted, `false` if a record was
    /// already present (the existing record is left untouched). This is
    /// what makes the L2 event handler idempotent against duplicate
    /// events.
    async fn put_if_absent(&self, record: DepositRecord) -> Result<bool>;

    /// Remove a record. Unused by the reconcile core; exposed for
    /// operator tooling.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Convenience bound combining read and write access, used by components
/// that need both (reconcilers, the event dispatcher).
pub trait DepositStore: DepositRead + DepositWrite {}
impl<T: DepositRead + DepositWrite> DepositStore for T {}
