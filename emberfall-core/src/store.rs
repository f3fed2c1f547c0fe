//! Character persistence.
//!
//! The session only sees the `CharacterStore` trait; the file-backed
//! store writes one pretty-printed JSON document per character, and the
//! in-memory store backs tests.

use crate::world::{Character, CharacterId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("character {0} not found")]
    NotFound(CharacterId),
}

/// Where character snapshots of record live.
#[async_trait]
pub trait CharacterStore: Send + Sync {
    async fn save(&self, character: &Character) -> Result<(), StoreError>;
    async fn load(&self, id: CharacterId) -> Result<Character, StoreError>;
    async fn list(&self) -> Result<Vec<CharacterId>, StoreError>;
}

// ============================================================================
// File store
// ============================================================================

/// One JSON file per character under a root directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, id: CharacterId) -> PathBuf {
        self.root.join(format!("{}.json", id.0))
    }
}

#[async_trait]
impl CharacterStore for FileStore {
    async fn save(&self, character: &Character) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let json = serde_json::to_string_pretty(character)?;
        tokio::fs::write(self.path_for(character.id), json).await?;
        tracing::debug!(character = %character.id, "character saved");
        Ok(())
    }

    async fn load(&self, id: CharacterId) -> Result<Character, StoreError> {
        let path = self.path_for(id);
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&json)?)
    }

    async fn list(&self) -> Result<Vec<CharacterId>, StoreError> {
        let mut ids = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            if let Ok(uuid) = stem.parse() {
                ids.push(CharacterId(uuid));
            }
        }
        Ok(ids)
    }
}

// ============================================================================
// Memory store
// ============================================================================

/// In-memory store for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStore {
    characters: Mutex<HashMap<CharacterId, Character>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CharacterStore for MemoryStore {
    async fn save(&self, character: &Character) -> Result<(), StoreError> {
        self.characters
            .lock()
            .await
            .insert(character.id, character.clone());
        Ok(())
    }

    async fn load(&self, id: CharacterId) -> Result<Character, StoreError> {
        self.characters
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<CharacterId>, StoreError> {
        Ok(self.characters.lock().await.keys().copied().collect())
    }
}
