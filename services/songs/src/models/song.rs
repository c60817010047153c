use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted song. `id` is assigned by the store and never changes.
#[derive(Deserialize, Serialize, FromRow, Clone, Debug, PartialEq, Eq)]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub artist: String,
}

/// Payload submitted by the create and edit forms.
///
/// `id` is absent on create and carried as a hidden field on edit.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SongForm {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
}

impl SongForm {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        SongForm {
            id: None,
            title: title.into(),
            artist: artist.into(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Binds the payload to a concrete id, producing the record to persist.
    pub fn into_song(self, id: i64) -> Song {
        Song {
            id,
            title: self.title,
            artist: self.artist,
        }
    }
}

impl From<Song> for SongForm {
    fn from(song: Song) -> Self {
        SongForm {
            id: Some(song.id),
            title: song.title,
            artist: song.artist,
        }
    }
}
