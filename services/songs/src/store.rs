//! Song store abstraction shared by the SQL and in-memory backends.
//!
//! A store value is a unit of work: reads go straight to durable storage,
//! while `add`, `update` and `remove` are staged in a [`ChangeSet`] and only
//! reach storage when `commit` applies the whole batch atomically.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Song, SongForm};

pub use memory::{MemoryDatabase, MemorySongStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("song store is closed")]
    Unavailable,
    #[error("commit rejected: {0}")]
    Rejected(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable)
    }
}

#[async_trait]
pub trait SongStore: Send + Sync {
    /// Every durable song in primary-key order.
    async fn list_all(&self) -> Result<Vec<Song>, StoreError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Song>, StoreError>;

    /// Stages an insert. When the form has no id, one is reserved from the
    /// store's id sequence, so concurrent sessions never receive the same id.
    async fn add(&mut self, form: SongForm) -> Result<Song, StoreError>;

    fn update(&mut self, song: Song) -> Result<(), StoreError>;

    fn remove(&mut self, song: Song) -> Result<(), StoreError>;

    /// Applies every staged change or none of them. Returns the number applied.
    async fn commit(&mut self) -> Result<usize, StoreError>;

    fn clear_pending(&mut self);

    fn pending(&self) -> &ChangeSet;

    async fn close(&mut self);

    fn is_closed(&self) -> bool;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingChange {
    Insert(Song),
    Update(Song),
    Delete(Song),
}

/// Ordered list of staged changes awaiting a commit.
#[derive(Clone, Debug, Default)]
pub struct ChangeSet {
    changes: Vec<PendingChange>,
}

impl ChangeSet {
    pub fn push(&mut self, change: PendingChange) {
        self.changes.push(change);
    }

    pub fn take(&mut self) -> Vec<PendingChange> {
        std::mem::take(&mut self.changes)
    }

    pub fn clear(&mut self) {
        self.changes.clear();
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
