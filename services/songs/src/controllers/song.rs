use tracing::{debug, info, warn};

use crate::controllers::result::{Action, ActionResult, ViewModel, ViewName};
use crate::models::{ModelState, SongForm};
use crate::store::{SongStore, StoreError};

/// List/detail/create/edit/delete workflow for songs.
///
/// The controller owns one store session, so a controller instance serves a
/// single request.
pub struct SongController<S> {
    store: S,
}

impl<S: SongStore> SongController<S> {
    pub fn new(store: S) -> Self {
        SongController { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub async fn index(&self) -> Result<ActionResult, StoreError> {
        let songs = self.store.list_all().await?;
        debug!("Listing {} songs", songs.len());
        Ok(ActionResult::view(ViewName::Index, ViewModel::Songs(songs)))
    }

    pub async fn details(&self, id: Option<i64>) -> Result<ActionResult, StoreError> {
        self.show(ViewName::Details, id).await
    }

    pub fn create_form(&self) -> ActionResult {
        ActionResult::view(ViewName::Create, ViewModel::Empty)
    }

    pub async fn create(
        &mut self,
        mut form: SongForm,
        state: ModelState,
    ) -> Result<ActionResult, StoreError> {
        if !state.is_valid() {
            debug!("Create rejected with {} validation error(s)", state.error_count());
            return Ok(ActionResult::view(
                ViewName::Create,
                ViewModel::Form {
                    form,
                    errors: state,
                },
            ));
        }

        // New songs always take their id from the store.
        form.id = None;
        let song = self.store.add(form).await?;
        self.store.commit().await?;
        info!("Created song {}", song.id);
        Ok(ActionResult::redirect_to(Action::Index))
    }

    pub async fn edit_form(&self, id: Option<i64>) -> Result<ActionResult, StoreError> {
        self.show(ViewName::Edit, id).await
    }

    pub async fn edit(
        &mut self,
        id: i64,
        form: SongForm,
        state: ModelState,
    ) -> Result<ActionResult, StoreError> {
        if form.id != Some(id) {
            warn!("Edit path id {} does not match payload id {:?}", id, form.id);
            return Ok(ActionResult::NotFound);
        }

        if !state.is_valid() {
            debug!("Edit of song {} rejected with {} validation error(s)", id, state.error_count());
            return Ok(ActionResult::view(
                ViewName::Edit,
                ViewModel::Form {
                    form,
                    errors: state,
                },
            ));
        }

        self.store.update(form.into_song(id))?;
        match self.store.commit().await {
            Ok(_) => {}
            Err(StoreError::Rejected(reason)) => {
                if self.store.get_by_id(id).await?.is_none() {
                    warn!("Song {} vanished before edit was saved", id);
                    return Ok(ActionResult::NotFound);
                }
                return Err(StoreError::Rejected(reason));
            }
            Err(e) => return Err(e),
        }
        info!("Updated song {}", id);
        Ok(ActionResult::redirect_to(Action::Index))
    }

    pub async fn delete_form(&self, id: Option<i64>) -> Result<ActionResult, StoreError> {
        self.show(ViewName::Delete, id).await
    }

    /// Deleting a song that is already gone is a no-op.
    pub async fn delete_confirmed(&mut self, id: i64) -> Result<ActionResult, StoreError> {
        if let Some(song) = self.store.get_by_id(id).await? {
            self.store.remove(song)?;
        }
        let removed = match self.store.commit().await {
            Ok(removed) => removed,
            Err(StoreError::Rejected(reason)) => {
                if self.store.get_by_id(id).await?.is_some() {
                    return Err(StoreError::Rejected(reason));
                }
                0
            }
            Err(e) => return Err(e),
        };
        if removed > 0 {
            info!("Deleted song {}", id);
        } else {
            debug!("Song {} already absent, nothing to delete", id);
        }
        Ok(ActionResult::redirect_to(Action::Index))
    }

    async fn show(&self, view: ViewName, id: Option<i64>) -> Result<ActionResult, StoreError> {
        let Some(id) = id else {
            return Ok(ActionResult::NotFound);
        };
        match self.store.get_by_id(id).await? {
            Some(song) => Ok(ActionResult::view(view, ViewModel::Song(song))),
            None => {
                debug!("Song {} not found", id);
                Ok(ActionResult::NotFound)
            }
        }
    }
}
