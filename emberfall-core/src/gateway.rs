//! The character mutation gateway: the single writer for a character's
//! state of record.
//!
//! Rules modules produce candidate snapshots; `commit` makes one the
//! state of record, re-clamps vitals, publishes it over a watch
//! channel, and persists it. Readers clone snapshots and never observe
//! a half-applied mutation.

use crate::store::CharacterStore;
use crate::world::Character;
use std::sync::Arc;
use tokio::sync::watch;

pub struct MutationGateway {
    store: Arc<dyn CharacterStore>,
    current: watch::Sender<Character>,
}

impl MutationGateway {
    pub fn new(store: Arc<dyn CharacterStore>, character: Character) -> Self {
        let (current, _) = watch::channel(character);
        Self { store, current }
    }

    /// The current state of record.
    pub fn snapshot(&self) -> Character {
        self.current.borrow().clone()
    }

    /// Watch for committed snapshots, e.g. to drive a UI.
    pub fn subscribe(&self) -> watch::Receiver<Character> {
        self.current.subscribe()
    }

    /// Make `next` the state of record and persist it.
    ///
    /// A persistence failure is logged and does not roll back the
    /// in-memory state; the next successful commit writes the latest
    /// snapshot anyway.
    pub async fn commit(&self, mut next: Character) {
        next.clamp_vitals();
        self.current.send_replace(next);
        let snapshot = self.current.borrow().clone();
        if let Err(e) = self.store.save(&snapshot).await {
            tracing::warn!(character = %snapshot.id, error = %e, "failed to persist character");
        }
    }
}
