use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use super::{ChangeSet, PendingChange, SongStore, StoreError};
use crate::models::{Song, SongForm};

/// Song rows plus the id sequence, guarded together.
#[derive(Debug, Default)]
struct Table {
    songs: BTreeMap<i64, Song>,
    next_id: i64,
}

impl Table {
    /// Hands out an id that no other caller will receive, skipping past any
    /// row inserted with an explicit id.
    fn reserve_id(&mut self) -> i64 {
        let floor = self.songs.keys().next_back().map_or(1, |max| max + 1);
        let id = self.next_id.max(floor);
        self.next_id = id + 1;
        id
    }
}

/// Shared in-process song table. Clones point at the same data.
#[derive(Clone, Debug, Default)]
pub struct MemoryDatabase {
    table: Arc<Mutex<Table>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(songs: impl IntoIterator<Item = Song>) -> Self {
        let database = MemoryDatabase::new();
        database
            .table
            .lock()
            .songs
            .extend(songs.into_iter().map(|song| (song.id, song)));
        database
    }

    /// Opens a fresh unit of work over this table.
    pub fn session(&self) -> MemorySongStore {
        MemorySongStore {
            table: Arc::clone(&self.table),
            changes: ChangeSet::default(),
            closed: false,
        }
    }

    pub fn snapshot(&self) -> Vec<Song> {
        self.table.lock().songs.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.table.lock().songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.lock().songs.is_empty()
    }
}

#[derive(Debug)]
pub struct MemorySongStore {
    table: Arc<Mutex<Table>>,
    changes: ChangeSet,
    closed: bool,
}

impl MemorySongStore {
    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

fn apply(songs: &mut BTreeMap<i64, Song>, change: PendingChange) -> Result<(), StoreError> {
    match change {
        PendingChange::Insert(song) => {
            if songs.contains_key(&song.id) {
                return Err(StoreError::Rejected(format!("song {} already exists", song.id)));
            }
            songs.insert(song.id, song);
        }
        PendingChange::Update(song) => match songs.get_mut(&song.id) {
            Some(existing) => *existing = song,
            None => {
                return Err(StoreError::Rejected(format!("song {} does not exist", song.id)));
            }
        },
        PendingChange::Delete(song) => {
            if songs.remove(&song.id).is_none() {
                return Err(StoreError::Rejected(format!("song {} does not exist", song.id)));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl SongStore for MemorySongStore {
    async fn list_all(&self) -> Result<Vec<Song>, StoreError> {
        self.ensure_open()?;
        Ok(self.table.lock().songs.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Song>, StoreError> {
        self.ensure_open()?;
        Ok(self.table.lock().songs.get(&id).cloned())
    }

    async fn add(&mut self, form: SongForm) -> Result<Song, StoreError> {
        self.ensure_open()?;
        let id = match form.id {
            Some(id) => id,
            None => self.table.lock().reserve_id(),
        };
        let song = form.into_song(id);
        self.changes.push(PendingChange::Insert(song.clone()));
        Ok(song)
    }

    fn update(&mut self, song: Song) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.changes.push(PendingChange::Update(song));
        Ok(())
    }

    fn remove(&mut self, song: Song) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.changes.push(PendingChange::Delete(song));
        Ok(())
    }

    async fn commit(&mut self) -> Result<usize, StoreError> {
        self.ensure_open()?;
        let changes = self.changes.take();
        let count = changes.len();
        if count == 0 {
            return Ok(0);
        }

        let mut table = self.table.lock();
        let mut working = table.songs.clone();
        for change in changes {
            apply(&mut working, change)?;
        }
        table.songs = working;
        debug!("Committed {} song change(s) to memory store", count);
        Ok(count)
    }

    fn clear_pending(&mut self) {
        self.changes.clear();
    }

    fn pending(&self) -> &ChangeSet {
        &self.changes
    }

    async fn close(&mut self) {
        self.changes.clear();
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
