use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction, sqlite::SqlitePoolOptions};
use tracing::{debug, info};

use crate::models::{Song, SongForm};
use crate::store::{ChangeSet, PendingChange, SongStore, StoreError};

#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        debug!("DATABASE_URL={}", database_url);

        // An in-memory database lives only as long as its connection, so keep
        // exactly one and never recycle it.
        let options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = options.connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Fresh in-memory database with the schema applied.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let database = Database::connect("sqlite::memory:").await?;
        database.migrate().await?;
        Ok(database)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.into()))?;
        info!("Song schema is up to date");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Opens a unit of work for one request.
    pub fn session(&self) -> SqlSongStore {
        SqlSongStore {
            pool: self.pool.clone(),
            changes: ChangeSet::default(),
            closed: false,
        }
    }

    /// Inserts rows directly, bypassing staging. Used to seed fixtures.
    pub async fn seed(&self, songs: &[Song]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for song in songs {
            insert_song(&mut tx, song).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct SqlSongStore {
    pool: SqlitePool,
    changes: ChangeSet,
    closed: bool,
}

impl SqlSongStore {
    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }

    /// Reserves the next id in one statement, so two sessions can never be
    /// handed the same value. Rows seeded with explicit ids push the floor up.
    async fn reserve_id(&self) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            UPDATE song_sequence
            SET next_id = MAX(next_id, (SELECT COALESCE(MAX(id), 0) FROM songs) + 1) + 1
            RETURNING next_id - 1
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }
}

async fn insert_song(tx: &mut Transaction<'_, Sqlite>, song: &Song) -> Result<(), StoreError> {
    sqlx::query("INSERT INTO songs (id, title, artist) VALUES (?, ?, ?)")
        .bind(song.id)
        .bind(&song.title)
        .bind(&song.artist)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn apply(tx: &mut Transaction<'_, Sqlite>, change: &PendingChange) -> Result<(), StoreError> {
    match change {
        PendingChange::Insert(song) => {
            let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM songs WHERE id = ?")
                .bind(song.id)
                .fetch_optional(&mut **tx)
                .await?;
            if exists.is_some() {
                return Err(StoreError::Rejected(format!("song {} already exists", song.id)));
            }
            insert_song(tx, song).await
        }
        PendingChange::Update(song) => {
            let result = sqlx::query("UPDATE songs SET title = ?, artist = ? WHERE id = ?")
                .bind(&song.title)
                .bind(&song.artist)
                .bind(song.id)
                .execute(&mut **tx)
                .await?;
            if result.rows_affected() == 0 {
                return Err(StoreError::Rejected(format!("song {} does not exist", song.id)));
            }
            Ok(())
        }
        PendingChange::Delete(song) => {
            let result = sqlx::query("DELETE FROM songs WHERE id = ?")
                .bind(song.id)
                .execute(&mut **tx)
                .await?;
            if result.rows_affected() == 0 {
                return Err(StoreError::Rejected(format!("song {} does not exist", song.id)));
            }
            Ok(())
        }
    }
}

#[async_trait]
impl SongStore for SqlSongStore {
    async fn list_all(&self) -> Result<Vec<Song>, StoreError> {
        self.ensure_open()?;
        let songs = sqlx::query_as::<_, Song>("SELECT id, title, artist FROM songs ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(songs)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Song>, StoreError> {
        self.ensure_open()?;
        let song = sqlx::query_as::<_, Song>("SELECT id, title, artist FROM songs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(song)
    }

    async fn add(&mut self, form: SongForm) -> Result<Song, StoreError> {
        self.ensure_open()?;
        let id = match form.id {
            Some(id) => id,
            None => self.reserve_id().await?,
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
        if changes.is_empty() {
            return Ok(0);
        }

        // Dropping the transaction on an early return rolls it back.
        let mut tx = self.pool.begin().await?;
        for change in &changes {
            apply(&mut tx, change).await?;
        }
        tx.commit().await?;

        debug!("Committed {} song change(s)", changes.len());
        Ok(changes.len())
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
