//! Per-id serialization for deposit transitions.
//!
//! The specification requires that a deposit being processed by a
//! reconciler must not be concurrently picked up by the event handler for
//! the same id (see the concurrency model). The teacher codebase gets
//! this for free from single-threaded scheduling plus its activity
//! throttle; this crate's scheduler is a genuinely concurrent set of
//! `tokio` tasks, so serialization is made explicit here via a sharded set
//! of per-id locks — a finite set of shards rather than one lock per id,
//! since ids are unbounded and most are touched only rarely.

use std::future::Future;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

/// Number of lock shards. Collisions between unrelated deposit ids only
/// cost extra (harmless) serialization, never correctness, so this can be
/// tuned freely.
const SHARD_COUNT: usize = 64;

/// Serializes work by deposit id across a fixed number of shards.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    shards: Arc<Vec<Mutex<()>>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self {
            shards: Arc::new((0..SHARD_COUNT).map(|_| Mutex::new(())).collect()),
        }
    }
}

impl Dispatcher {
    /// Construct a dispatcher with the default shard count.
    pub fn new() -> Self {
        Self::default()
    }

    fn shard_for(&self, id: &str) -> &Mutex<()> {
        let mut hasher = Sha256::new();
        hasher.update(id.as_bytes());
        let digest = hasher.finalize();
        let index = u64::from_be_bytes(digest[..8].try_into().unwrap()) as usize % self.shards.len();
        &self.shards[index]
    }

    /// Run `f` while holding the shard lock for `id`. Any other caller
    /// operating on an id that hashes to the same shard blocks until `f`
    /// completes; callers on different shards proceed independently.
    pub async fn with_lock<F, Fut, T>(&self, id: &str, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let shard = self.shard_for(id);
        let _guard = shard.lock().await;
        f().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[tokio::test]
    async fn serializes_access_to_the_same_id() {
        let dispatcher = Dispatcher::new();
        let counter = Arc::new(AtomicU64::new(0));

        let mut handles = Vec::new();
        for _ in 0..20 {
            let dispatcher = dispatcher.clone();
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                dispatcher
                    .with_lock("same-id", || async {
                        let before = counter.fetch_add(1, Ordering::SeqCst);
                        tokio::task::yield_now().await;
                        assert_eq!(counter.load(Ordering::SeqCst), before + 1);
                    })
                    .await;
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 20);
    }
}
