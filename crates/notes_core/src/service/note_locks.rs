//! Per-note mutation serialization.
//!
//! # Invariants
//! - At most one update/delete workflow per note id runs between its local
//!   change and its remote completion.
//! - Entries are pruned once no holder or waiter remains.

use crate::model::note::NoteId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slot = Arc<AsyncMutex<()>>;

#[derive(Debug, Default)]
pub(crate) struct NoteLocks {
    slots: Mutex<HashMap<NoteId, Slot>>,
}

/// Held lock for one note id; releases and prunes on drop.
pub(crate) struct NoteLockGuard<'a> {
    locks: &'a NoteLocks,
    note_id: NoteId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl NoteLocks {
    pub(crate) async fn acquire(&self, note_id: &str) -> NoteLockGuard<'_> {
        let slot = self
            .slots()
            .entry(note_id.to_string())
            .or_default()
            .clone();
        let guard = slot.lock_owned().await;
        NoteLockGuard {
            locks: self,
            note_id: note_id.to_string(),
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots().len()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<NoteId, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for NoteLockGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut slots = self.locks.slots();
        // Only the table itself still points at the slot: nobody is waiting.
        if slots
            .get(&self.note_id)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&self.note_id);
        }
    }
}
