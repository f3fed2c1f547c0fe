//! Test doubles and harness helpers, shared by unit and integration
//! tests.

use crate::narrate::Narrator;
use crate::session::{GameSession, SessionConfig};
use crate::store::{CharacterStore, MemoryStore, StoreError};
use crate::world::{Character, CharacterClass, CharacterId};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Narrator double: records every fact recap it is asked to narrate
/// and replies with canned prose, or echoes the facts when the queue
/// runs dry.
#[derive(Default)]
pub struct MockNarrator {
    facts: Mutex<Vec<String>>,
    replies: Mutex<VecDeque<String>>,
}

impl MockNarrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            facts: Mutex::new(Vec::new()),
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
        }
    }

    /// Every fact recap seen so far, in order.
    pub fn seen_facts(&self) -> Vec<String> {
        match self.facts.lock() {
            Ok(facts) => facts.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl Narrator for MockNarrator {
    async fn narrate(&self, facts: &str) -> Result<String, narrator::Error> {
        if let Ok(mut seen) = self.facts.lock() {
            seen.push(facts.to_string());
        }
        let reply = self.replies.lock().ok().and_then(|mut q| q.pop_front());
        Ok(reply.unwrap_or_else(|| facts.to_string()))
    }
}

/// Narrator double that always fails, for exercising the fallback path.
pub struct FailingNarrator;

#[async_trait]
impl Narrator for FailingNarrator {
    async fn narrate(&self, _facts: &str) -> Result<String, narrator::Error> {
        Err(narrator::Error::Config("narrator offline".into()))
    }
}

/// Store double whose every write fails, e.g. a full disk.
pub struct FailingStore;

#[async_trait]
impl CharacterStore for FailingStore {
    async fn save(&self, _character: &Character) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk full")))
    }

    async fn load(&self, id: CharacterId) -> Result<Character, StoreError> {
        Err(StoreError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<CharacterId>, StoreError> {
        Ok(Vec::new())
    }
}

/// An in-memory, seeded session plus handles to its doubles.
pub struct TestHarness {
    pub session: GameSession,
    pub store: Arc<MemoryStore>,
    pub narrator: Arc<MockNarrator>,
}

impl TestHarness {
    /// A fresh warrior with a fixed seed.
    pub fn new(seed: u64) -> Self {
        Self::with_character(seed, Character::new("Brannik", CharacterClass::Warrior))
    }

    pub fn with_character(seed: u64, character: Character) -> Self {
        let store = Arc::new(MemoryStore::new());
        let narrator = Arc::new(MockNarrator::new());
        let session = GameSession::new(
            store.clone(),
            Box::new(SharedNarrator(narrator.clone())),
            character,
            SessionConfig::new().with_seed(seed),
        );
        Self {
            session,
            store,
            narrator,
        }
    }
}

// The session owns its narrator box; this shim lets the harness keep a
// handle on the mock for assertions.
struct SharedNarrator(Arc<MockNarrator>);

#[async_trait]
impl Narrator for SharedNarrator {
    async fn narrate(&self, facts: &str) -> Result<String, narrator::Error> {
        self.0.narrate(facts).await
    }
}

/// Assert the vitals invariant on a snapshot.
#[track_caller]
pub fn assert_vitals_valid(character: &Character) {
    assert!(
        character.vitals_valid(),
        "vitals out of range: hp {}/{} mp {}/{}",
        character.hp,
        character.max_hp,
        character.mp,
        character.max_mp
    );
}
