//! Board state store.
//!
//! `BoardStore` is a cheap-to-clone handle around the one loaded board. Reads
//! are open to anyone; writes are crate-private and go through the mutation
//! coordinator so rollback snapshots stay valid.
//!
//! Every write bumps a per-item sequence number and returns a `Ticket`.
//! Reconciling or rolling back a mutation is only allowed while its ticket is
//! still current: no newer write touched its items and the board has not been
//! replaced since.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::models::{ItemKey, Kanban, KanbanId};
use crate::errors::MutationError;
use crate::notice::Notice;

const EVENT_CAPACITY: usize = 256;

/// Change notifications for subscribers (views, the CLI, tests).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum BoardEvent {
    Loaded { kanban_id: KanbanId },
    Applied { keys: Vec<ItemKey> },
    Reconciled { keys: Vec<ItemKey> },
    RolledBack { keys: Vec<ItemKey> },
    Notice(Notice),
}

/// Proof of a local write, checked before its response is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    epoch: u64,
    seqs: Vec<(ItemKey, u64)>,
}

impl Ticket {
    pub fn keys(&self) -> Vec<ItemKey> {
        self.seqs.iter().map(|(k, _)| k.clone()).collect()
    }
}

#[derive(Default)]
struct StoreState {
    board: Option<Kanban>,
    epoch: u64,
    next_seq: u64,
    seqs: HashMap<ItemKey, u64>,
}

impl StoreState {
    fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.epoch == self.epoch
            && ticket
                .seqs
                .iter()
                .all(|(key, seq)| self.seqs.get(key) == Some(seq))
    }

    /// Drop the sequence entries `ticket` still owns. Entries only live
    /// while a mutation on the key is outstanding.
    fn release(&mut self, ticket: &Ticket) {
        if ticket.epoch != self.epoch {
            return;
        }
        for (key, seq) in &ticket.seqs {
            if self.seqs.get(key) == Some(seq) {
                self.seqs.remove(key);
            }
        }
    }
}

#[derive(Clone)]
pub struct BoardStore {
    inner: Arc<Mutex<StoreState>>,
    tx: broadcast::Sender<BoardEvent>,
}

impl Default for BoardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardStore {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Mutex::new(StoreState::default())),
            tx,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, MutationError> {
        self.inner.lock().map_err(|_| MutationError::LockPoisoned)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.tx.subscribe()
    }

    /// Snapshot of the current board.
    pub fn board(&self) -> Result<Kanban, MutationError> {
        self.read(Kanban::clone)
    }

    pub fn read<R>(&self, f: impl FnOnce(&Kanban) -> R) -> Result<R, MutationError> {
        let state = self.lock()?;
        state.board.as_ref().map(f).ok_or(MutationError::BoardNotLoaded)
    }

    pub fn is_loaded(&self) -> bool {
        self.lock().map(|s| s.board.is_some()).unwrap_or(false)
    }

    /// Replace the loaded board. In-flight responses for the old board are
    /// discarded when they arrive.
    pub(crate) fn load(&self, board: Kanban) -> Result<(), MutationError> {
        let kanban_id = board.id.clone();
        {
            let mut state = self.lock()?;
            state.board = Some(board);
            state.epoch += 1;
            state.seqs.clear();
            debug!(kanban_id = %kanban_id, epoch = state.epoch, "board loaded");
        }
        self.publish(BoardEvent::Loaded { kanban_id });
        Ok(())
    }

    /// Run `f` against the board and stamp `keys` with fresh sequence numbers.
    pub(crate) fn apply_mutation<R>(
        &self,
        keys: &[ItemKey],
        f: impl FnOnce(&mut Kanban) -> Result<R, MutationError>,
    ) -> Result<(Ticket, R), MutationError> {
        let ticket = {
            let mut state = self.lock()?;
            let state = &mut *state;
            let board = state.board.as_mut().ok_or(MutationError::BoardNotLoaded)?;
            let result = f(board)?;

            let mut seqs = Vec::with_capacity(keys.len());
            for key in keys {
                state.next_seq += 1;
                state.seqs.insert(key.clone(), state.next_seq);
                seqs.push((key.clone(), state.next_seq));
            }
            (
                Ticket {
                    epoch: state.epoch,
                    seqs,
                },
                result,
            )
        };
        self.publish(BoardEvent::Applied {
            keys: keys.to_vec(),
        });
        Ok(ticket)
    }

    /// Run `f` only if `ticket` is still current. Returns `None` for a stale
    /// ticket.
    pub(crate) fn settle<R>(
        &self,
        ticket: &Ticket,
        f: impl FnOnce(&mut Kanban) -> R,
    ) -> Result<Option<R>, MutationError> {
        let mut state = self.lock()?;
        if !state.is_current(ticket) {
            warn!(keys = ?ticket.keys(), "discarding stale response");
            return Ok(None);
        }
        let result = state.board.as_mut().map(f);
        state.release(ticket);
        Ok(result)
    }

    /// Forget `ticket` without touching the board, for writes that need no
    /// response.
    pub(crate) fn release(&self, ticket: &Ticket) -> Result<(), MutationError> {
        self.lock()?.release(ticket);
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn tracked_keys(&self) -> usize {
        self.lock().map(|s| s.seqs.len()).unwrap_or(0)
    }

    pub(crate) fn publish(&self, event: BoardEvent) {
        // No subscribers is fine.
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fixtures::*;
    use crate::board::models::ColumnStatus;

    fn loaded_store() -> BoardStore {
        let store = BoardStore::new();
        store
            .load(order_board(
                vec![product("p1", ColumnStatus::Ordered, Some(0), 1)],
                vec![],
            ))
            .unwrap();
        store
    }

    #[test]
    fn test_read_before_load_fails() {
        let store = BoardStore::new();
        assert!(matches!(store.board(), Err(MutationError::BoardNotLoaded)));
        assert!(!store.is_loaded());
    }

    #[test]
    fn test_apply_then_settle_with_current_ticket() {
        let store = loaded_store();
        let (ticket, ()) = store
            .apply_mutation(&[pkey("p1")], |board| {
                board.product_mut(&pid("p1")).unwrap().name = "local".into();
                Ok(())
            })
            .unwrap();
        let settled = store
            .settle(&ticket, |board| {
                board.product_mut(&pid("p1")).unwrap().name = "server".into();
            })
            .unwrap();
        assert!(settled.is_some());
        assert_eq!(store.board().unwrap().products[0].name, "server");
    }

    #[test]
    fn test_newer_write_makes_ticket_stale() {
        let store = loaded_store();
        let (first, ()) = store.apply_mutation(&[pkey("p1")], |_| Ok(())).unwrap();
        let (second, ()) = store.apply_mutation(&[pkey("p1")], |_| Ok(())).unwrap();
        assert!(store.settle(&first, |_| ()).unwrap().is_none());
        assert!(store.settle(&second, |_| ()).unwrap().is_some());
    }

    #[test]
    fn test_reload_makes_ticket_stale() {
        let store = loaded_store();
        let (ticket, ()) = store.apply_mutation(&[pkey("p1")], |_| Ok(())).unwrap();
        store.load(order_board(vec![], vec![])).unwrap();
        assert!(store.settle(&ticket, |_| ()).unwrap().is_none());
    }

    #[test]
    fn test_failed_apply_issues_no_ticket() {
        let store = loaded_store();
        let mut rx = store.subscribe();
        let result: Result<(Ticket, ()), _> = store.apply_mutation(&[pkey("p1")], |_| {
            Err(MutationError::ProductNotFound { id: pid("p1") })
        });
        assert!(result.is_err());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_settled_tickets_are_forgotten() {
        let store = loaded_store();
        let (first, ()) = store.apply_mutation(&[pkey("p1")], |_| Ok(())).unwrap();
        let (second, ()) = store.apply_mutation(&[pkey("p1")], |_| Ok(())).unwrap();
        assert_eq!(store.tracked_keys(), 1);

        // stale settle leaves the newer entry alone
        store.settle(&first, |_| ()).unwrap();
        assert_eq!(store.tracked_keys(), 1);

        store.settle(&second, |board| board.remove_product(&pid("p1"))).unwrap();
        assert_eq!(store.tracked_keys(), 0);
    }

    #[test]
    fn test_release_drops_confirmed_write() {
        let store = loaded_store();
        let (ticket, ()) = store.apply_mutation(&[pkey("p1")], |_| Ok(())).unwrap();
        store.release(&ticket).unwrap();
        assert_eq!(store.tracked_keys(), 0);
    }

    #[tokio::test]
    async fn test_subscribers_see_applied_keys() {
        let store = loaded_store();
        let mut rx = store.subscribe();
        store.apply_mutation(&[pkey("p1")], |_| Ok(())).unwrap();
        assert_eq!(
            rx.recv().await.unwrap(),
            BoardEvent::Applied {
                keys: vec![pkey("p1")]
            }
        );
    }
}
