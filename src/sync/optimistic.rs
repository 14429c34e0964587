//! Optimistic mutation coordinator.
//!
//! Every write to the board goes through `Coordinator::with_optimistic_mutation`:
//!
//! 1. take the per-item locks for the affected keys (one mutation per item
//!    at a time; later ones queue);
//! 2. snapshot the affected items and apply the change locally;
//! 3. run the request under the configured timeout;
//! 4. on success, reconcile with the server's response;
//! 5. on failure or timeout, restore the snapshot.
//!
//! Steps 4 and 5 only touch the board while the mutation's ticket is still
//! current (see `BoardStore::settle`).

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};

use super::snapshot::Snapshot;
use crate::board::models::{ItemKey, Kanban};
use crate::board::store::{BoardEvent, BoardStore};
use crate::errors::{ApiError, MutationError};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

type LockMap = HashMap<ItemKey, Arc<tokio::sync::Mutex<()>>>;

/// Per-item async locks. Keys are locked in sorted order so two mutations
/// over overlapping key sets cannot deadlock. An entry lives only while some
/// mutation holds or waits on it.
#[derive(Default)]
pub(crate) struct ItemLocks {
    inner: Arc<Mutex<LockMap>>,
}

/// Guards for one mutation's keys. Dropping releases the locks and removes
/// entries nobody else is waiting on.
pub(crate) struct HeldLocks {
    guards: Vec<(ItemKey, OwnedMutexGuard<()>)>,
    map: Arc<Mutex<LockMap>>,
}

impl Drop for HeldLocks {
    fn drop(&mut self) {
        let keys: Vec<ItemKey> = self.guards.drain(..).map(|(key, _guard)| key).collect();
        let mut map = self.map.lock().unwrap_or_else(|e| e.into_inner());
        for key in keys {
            if map.get(&key).is_some_and(|m| Arc::strong_count(m) == 1) {
                map.remove(&key);
            }
        }
    }
}

impl ItemLocks {
    pub(crate) async fn acquire(&self, keys: &[ItemKey]) -> HeldLocks {
        let mut sorted = keys.to_vec();
        sorted.sort();
        sorted.dedup();

        let mutexes: Vec<_> = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            sorted
                .into_iter()
                .map(|key| {
                    let mutex = Arc::clone(map.entry(key.clone()).or_default());
                    (key, mutex)
                })
                .collect()
        };

        let mut guards = Vec::with_capacity(mutexes.len());
        for (key, mutex) in mutexes {
            guards.push((key, mutex.lock_owned().await));
        }
        HeldLocks {
            guards,
            map: Arc::clone(&self.inner),
        }
    }

    /// Drop entries no mutation holds or waits on.
    pub(crate) fn prune_idle(&self) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|_, mutex| Arc::strong_count(mutex) > 1);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

pub struct Coordinator {
    store: BoardStore,
    locks: ItemLocks,
    timeout: Duration,
}

impl Coordinator {
    pub fn new(store: BoardStore, timeout: Duration) -> Self {
        Self {
            store,
            locks: ItemLocks::default(),
            timeout,
        }
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Replace the loaded board. Responses still in flight for the old
    /// board are discarded when they arrive.
    pub fn load(&self, board: Kanban) -> Result<(), MutationError> {
        self.store.load(board)?;
        self.locks.prune_idle();
        Ok(())
    }

    /// Run a request under the configured timeout.
    pub async fn request<T, Fut>(&self, fut: Fut) -> Result<T, ApiError>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout(self.timeout)),
        }
    }

    /// Apply a change the server already confirmed (no rollback needed).
    pub async fn apply_confirmed<R>(
        &self,
        keys: Vec<ItemKey>,
        f: impl FnOnce(&mut Kanban) -> Result<R, MutationError>,
    ) -> Result<R, MutationError> {
        let _guards = self.locks.acquire(&keys).await;
        let (ticket, result) = self.store.apply_mutation(&keys, f)?;
        self.store.release(&ticket)?;
        Ok(result)
    }

    /// Snapshot, apply locally, request, then reconcile or roll back.
    ///
    /// `apply` may return data the request needs (e.g. the new column
    /// order). If `apply` fails, nothing is sent and the board is left as it
    /// was.
    pub async fn with_optimistic_mutation<P, T, A, Q, Fut, C>(
        &self,
        label: &'static str,
        keys: Vec<ItemKey>,
        apply: A,
        request: Q,
        reconcile: C,
    ) -> Result<T, MutationError>
    where
        A: FnOnce(&mut Kanban) -> Result<P, MutationError>,
        Q: FnOnce(P) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
        C: FnOnce(&mut Kanban, &T),
    {
        let _guards = self.locks.acquire(&keys).await;

        let (ticket, (snapshot, prepared)) = self.store.apply_mutation(&keys, |board| {
            let snapshot = Snapshot::capture(board, &keys);
            match apply(board) {
                Ok(prepared) => Ok((snapshot, prepared)),
                Err(e) => {
                    snapshot.restore(board);
                    Err(e)
                }
            }
        })?;
        debug!(mutation = label, keys = ?keys, "applied optimistically");

        match self.request(request(prepared)).await {
            Ok(value) => {
                if self
                    .store
                    .settle(&ticket, |board| reconcile(board, &value))?
                    .is_some()
                {
                    info!(mutation = label, keys = ?keys, "confirmed by server");
                    self.store.publish(BoardEvent::Reconciled { keys });
                }
                Ok(value)
            }
            Err(err) => {
                if self
                    .store
                    .settle(&ticket, |board| snapshot.restore(board))?
                    .is_some()
                {
                    warn!(mutation = label, keys = ?keys, error = %err, "rolled back");
                    self.store.publish(BoardEvent::RolledBack { keys });
                }
                Err(MutationError::Api(err))
            }
        }
    }
}
