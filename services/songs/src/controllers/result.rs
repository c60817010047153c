use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::models::{ModelState, Song, SongForm};
use crate::store::StoreError;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ViewName {
    Index,
    Details,
    Create,
    Edit,
    Delete,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum ViewModel {
    Empty,
    Song(Song),
    Songs(Vec<Song>),
    Form { form: SongForm, errors: ModelState },
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct View {
    #[serde(rename = "view")]
    pub name: ViewName,
    pub model: ViewModel,
}

/// Actions a result can redirect to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Index,
}

impl Action {
    pub fn path(self) -> &'static str {
        match self {
            Action::Index => "/songs",
        }
    }
}

/// Outcome of a controller action, rendered uniformly by the HTTP layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionResult {
    Rendered(View),
    Redirected { target: Action },
    NotFound,
}

impl ActionResult {
    pub fn view(name: ViewName, model: ViewModel) -> Self {
        ActionResult::Rendered(View { name, model })
    }

    pub fn redirect_to(target: Action) -> Self {
        ActionResult::Redirected { target }
    }

    pub fn as_view(&self) -> Option<&View> {
        match self {
            ActionResult::Rendered(view) => Some(view),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ActionResult::NotFound)
    }
}

impl IntoResponse for ActionResult {
    fn into_response(self) -> Response {
        match self {
            ActionResult::Rendered(view) => (StatusCode::OK, Json(view)).into_response(),
            ActionResult::Redirected { target } => {
                (StatusCode::FOUND, [(header::LOCATION, target.path())]).into_response()
            }
            ActionResult::NotFound => StatusCode::NOT_FOUND.into_response(),
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        error!("Song store failure: {}", self);
        let status = match self {
            StoreError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(serde_json::json!({"error": self.to_string()})),
        )
            .into_response()
    }
}
