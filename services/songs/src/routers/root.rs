use axum::{extract::State, response::Response};
use crate::controllers::RootController;
use crate::db::Database;

pub async fn health_check_route(State(database): State<Database>) -> Response {
    RootController::health_check(&database).await
}
