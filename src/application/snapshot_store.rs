// Snapshot store - Most recent successful fetch
use crate::domain::observation::Snapshot;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no snapshot has been saved yet")]
    Missing,

    #[error("stored snapshot is malformed: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("snapshot write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding failed: {0}")]
    Encode(String),
}

/// Holds the most recent snapshot. `save` replaces the previous one atomically:
/// a `load` sees either the old snapshot or the new one, never a mix.
pub trait SnapshotStore<R>: Send + Sync {
    fn save(&self, snapshot: &Snapshot<R>) -> Result<(), SaveError>;

    fn load(&self) -> Result<Snapshot<R>, LoadError>;
}

pub struct InMemorySnapshotStore<R> {
    current: Mutex<Option<Snapshot<R>>>,
}

impl<R> InMemorySnapshotStore<R> {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }
}

impl<R> Default for InMemorySnapshotStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Clone + Send> SnapshotStore<R> for InMemorySnapshotStore<R> {
    fn save(&self, snapshot: &Snapshot<R>) -> Result<(), SaveError> {
        let mut current = self
            .current
            .lock()
            .map_err(|e| SaveError::Encode(format!("store lock poisoned: {}", e)))?;
        *current = Some(snapshot.clone());
        Ok(())
    }

    fn load(&self) -> Result<Snapshot<R>, LoadError> {
        let current = self
            .current
            .lock()
            .map_err(|e| LoadError::Malformed(format!("store lock poisoned: {}", e)))?;
        current.clone().ok_or(LoadError::Missing)
    }
}
