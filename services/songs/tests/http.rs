use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};
use tower::ServiceExt;

use songs::db::Database;
use songs::models::Song;
use songs::routers::app;
use songs::store::SongStore;

async fn setup() -> (Database, Router) {
    let database = Database::in_memory().await.unwrap();
    database
        .seed(&[
            Song {
                id: 1,
                title: "Song 1".into(),
                artist: "Artist 1".into(),
            },
            Song {
                id: 2,
                title: "Song 2".into(),
                artist: "Artist 2".into(),
            },
        ])
        .await
        .unwrap();
    let router = app(database.clone());
    (database, router)
}

async fn get(router: &Router, uri: &str) -> Response {
    router
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(router: &Router, uri: &str, body: &str) -> Response {
    router
        .clone()
        .oneshot(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn assert_redirects_to_list(response: &Response) {
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/songs");
}

#[tokio::test]
async fn test_list_songs() {
    let (_, router) = setup().await;
    let response = get(&router, "/songs").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "view": "index",
            "model": [
                {"id": 1, "title": "Song 1", "artist": "Artist 1"},
                {"id": 2, "title": "Song 2", "artist": "Artist 2"}
            ]
        })
    );
}

#[tokio::test]
async fn test_song_details_and_not_found() {
    let (_, router) = setup().await;

    let found = get(&router, "/songs/2").await;
    assert_eq!(found.status(), StatusCode::OK);
    let body = json_body(found).await;
    assert_eq!(body["view"], "details");
    assert_eq!(body["model"]["title"], "Song 2");

    assert_eq!(get(&router, "/songs/99").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(&router, "/songs/abc").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_form_route_wins_over_id() {
    let (_, router) = setup().await;
    let response = get(&router, "/songs/new").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"view": "create", "model": null}));
}

#[tokio::test]
async fn test_create_song_redirects() {
    let (database, router) = setup().await;
    let response = post_form(&router, "/songs", "title=New+Song&artist=New+Artist").await;
    assert_redirects_to_list(&response);

    let song = database.session().get_by_id(3).await.unwrap().unwrap();
    assert_eq!(song.title, "New Song");
    assert_eq!(song.artist, "New Artist");
}

#[tokio::test]
async fn test_create_song_ignores_client_id() {
    let (database, router) = setup().await;
    let response = post_form(&router, "/songs", "id=1&title=X&artist=Y").await;
    assert_redirects_to_list(&response);

    let songs = database.session().list_all().await.unwrap();
    assert_eq!(songs.len(), 3);
    assert_eq!(songs[0].title, "Song 1");
    assert_eq!(songs[2].id, 3);
    assert_eq!(songs[2].title, "X");
}

#[tokio::test]
async fn test_create_song_with_blank_title_redisplays_form() {
    let (database, router) = setup().await;
    let response = post_form(&router, "/songs", "title=&artist=New+Artist").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["view"], "create");
    assert_eq!(body["model"]["form"]["artist"], "New Artist");
    assert!(body["model"]["errors"]["title"].is_array());
    assert_eq!(database.session().list_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_edit_routes() {
    let (database, router) = setup().await;

    let form = get(&router, "/songs/1/edit").await;
    assert_eq!(form.status(), StatusCode::OK);
    assert_eq!(json_body(form).await["view"], "edit");
    assert_eq!(get(&router, "/songs/99/edit").await.status(), StatusCode::NOT_FOUND);

    let mismatch = post_form(&router, "/songs/2", "id=1&title=X&artist=Y").await;
    assert_eq!(mismatch.status(), StatusCode::NOT_FOUND);

    let saved = post_form(&router, "/songs/1", "id=1&title=Updated+Song&artist=Updated+Artist").await;
    assert_redirects_to_list(&saved);
    let song = database.session().get_by_id(1).await.unwrap().unwrap();
    assert_eq!(song.title, "Updated Song");
    assert_eq!(song.artist, "Updated Artist");
}

#[tokio::test]
async fn test_delete_routes() {
    let (database, router) = setup().await;

    let confirm = get(&router, "/songs/1/delete").await;
    assert_eq!(confirm.status(), StatusCode::OK);
    assert_eq!(json_body(confirm).await["view"], "delete");
    assert_eq!(get(&router, "/songs/99/delete").await.status(), StatusCode::NOT_FOUND);

    assert_redirects_to_list(&post_form(&router, "/songs/1/delete", "").await);
    assert_redirects_to_list(&post_form(&router, "/songs/99/delete", "").await);

    let songs = database.session().list_all().await.unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0].id, 2);
}

#[tokio::test]
async fn test_health_check() {
    let (_, router) = setup().await;
    let response = get(&router, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"status": "ok"}));
}
