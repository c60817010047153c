use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::db::Database;

pub struct RootController;

impl RootController {
    /// Reports healthy only while the database answers a trivial query.
    pub async fn health_check(database: &Database) -> Response {
        match sqlx::query("SELECT 1").execute(database.pool()).await {
            Ok(_) => (StatusCode::OK, Json(serde_json::json!({"status": "ok"}))).into_response(),
            Err(e) => {
                error!("Health check failed: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(serde_json::json!({"status": "unavailable"})),
                )
                    .into_response()
            }
        }
    }
}
