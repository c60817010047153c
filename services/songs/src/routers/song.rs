use axum::{
    Form, Router,
    extract::{Path, State},
    routing::get,
};
use tracing::debug;

use crate::controllers::{ActionResult, SongController};
use crate::db::{Database, SqlSongStore};
use crate::models::{ModelState, SongForm};
use crate::store::StoreError;

type SongResult = Result<ActionResult, StoreError>;

/// A path segment that is not a number addresses no song.
fn parse_id(raw: &str) -> Option<i64> {
    raw.parse().ok()
}

fn controller(database: &Database) -> SongController<SqlSongStore> {
    SongController::new(database.session())
}

pub async fn list_songs_route(State(database): State<Database>) -> SongResult {
    controller(&database).index().await
}

pub async fn song_details_route(
    State(database): State<Database>,
    Path(id): Path<String>,
) -> SongResult {
    controller(&database).details(parse_id(&id)).await
}

pub async fn create_song_form_route(State(database): State<Database>) -> ActionResult {
    controller(&database).create_form()
}

pub async fn create_song_route(
    State(database): State<Database>,
    Form(form): Form<SongForm>,
) -> SongResult {
    let state = ModelState::validate(&form);
    controller(&database).create(form, state).await
}

pub async fn edit_song_form_route(
    State(database): State<Database>,
    Path(id): Path<String>,
) -> SongResult {
    controller(&database).edit_form(parse_id(&id)).await
}

pub async fn edit_song_route(
    State(database): State<Database>,
    Path(raw_id): Path<String>,
    Form(form): Form<SongForm>,
) -> SongResult {
    let Some(id) = parse_id(&raw_id) else {
        debug!("Rejecting edit for non-numeric id {:?}", raw_id);
        return Ok(ActionResult::NotFound);
    };
    let state = ModelState::validate(&form);
    controller(&database).edit(id, form, state).await
}

pub async fn delete_song_form_route(
    State(database): State<Database>,
    Path(id): Path<String>,
) -> SongResult {
    controller(&database).delete_form(parse_id(&id)).await
}

pub async fn delete_song_route(
    State(database): State<Database>,
    Path(raw_id): Path<String>,
) -> SongResult {
    let Some(id) = parse_id(&raw_id) else {
        debug!("Rejecting delete for non-numeric id {:?}", raw_id);
        return Ok(ActionResult::NotFound);
    };
    controller(&database).delete_confirmed(id).await
}

pub fn song_routes() -> Router<Database> {
    Router::new()
        .route("/songs", get(list_songs_route).post(create_song_route))
        .route("/songs/new", get(create_song_form_route))
        .route("/songs/{id}", get(song_details_route).post(edit_song_route))
        .route("/songs/{id}/edit", get(edit_song_form_route))
        .route(
            "/songs/{id}/delete",
            get(delete_song_form_route).post(delete_song_route),
        )
}
