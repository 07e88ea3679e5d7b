// src/application/services/bookmark_service_impl.rs
use std::sync::Arc;

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::bookmark_service::BookmarkService;
use crate::domain::bookmark::{Bookmark, BookmarkId, BookmarkPatch, NewBookmark, OwnerId};
use crate::domain::identity::IdentityProvider;
use crate::domain::repositories::repository::BookmarkStore;
use crate::domain::url::{resolve_title, validate};
use crate::util::validation::ValidationHelper;
use tracing::{debug, instrument, warn};

#[derive(Debug)]
pub struct BookmarkServiceImpl<S: BookmarkStore> {
    store: Arc<S>,
    identity: Arc<dyn IdentityProvider>,
}

impl<S: BookmarkStore> BookmarkServiceImpl<S> {
    pub fn new(store: Arc<S>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    fn require_user(&self) -> ApplicationResult<OwnerId> {
        self.identity
            .current_user()
            .ok_or(ApplicationError::NotAuthenticated)
    }
}

impl<S: BookmarkStore> BookmarkService for BookmarkServiceImpl<S> {
    fn current_user(&self) -> Option<OwnerId> {
        self.identity.current_user()
    }

    #[instrument(skip(self), level = "debug")]
    fn add_bookmark(&self, url: &str, title: Option<&str>) -> ApplicationResult<Bookmark> {
        let owner = self.require_user()?;
        let new_bookmark = NewBookmark::from_input(url, title, owner)?;

        debug!(
            "Creating bookmark '{}' -> {}",
            new_bookmark.title, new_bookmark.url
        );
        let bookmark = self.store.insert(&new_bookmark)?;
        Ok(bookmark)
    }

    #[instrument(skip(self), level = "debug")]
    fn update_bookmark(
        &self,
        id: BookmarkId,
        url: Option<&str>,
        title: Option<&str>,
    ) -> ApplicationResult<Bookmark> {
        let owner = self.require_user()?;
        let mut bookmark =
            ValidationHelper::validate_and_get_owned_bookmark(id, &owner, self.store.as_ref())?;

        let url = url.map(validate).transpose()?;
        let effective_url = url.as_deref().unwrap_or(&bookmark.url);
        let title = title.map(|t| resolve_title(Some(t), effective_url));

        let patch = BookmarkPatch { url, title };
        if patch.is_empty() {
            debug!("Nothing to update for bookmark {}", id);
            return Ok(bookmark);
        }

        self.store.update(id, &patch)?;
        bookmark.apply_patch(&patch);
        Ok(bookmark)
    }

    #[instrument(skip(self), level = "debug")]
    fn delete_bookmark(&self, id: BookmarkId) -> ApplicationResult<()> {
        let owner = self.require_user()?;
        ValidationHelper::validate_and_get_owned_bookmark(id, &owner, self.store.as_ref())?;

        // the change feed reconciles a failed delete
        if let Err(e) = self.store.delete(id) {
            warn!("Delete of bookmark {} failed: {}", id, e);
        }
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    fn get_bookmark(&self, id: BookmarkId) -> ApplicationResult<Option<Bookmark>> {
        let owner = self.require_user()?;
        ValidationHelper::validate_bookmark_id(id)?;

        let bookmark = self.store.get(id)?.filter(|b| b.owner == owner);
        Ok(bookmark)
    }

    #[instrument(skip(self), level = "debug")]
    fn list_bookmarks(&self) -> ApplicationResult<Vec<Bookmark>> {
        let owner = self.require_user()?;
        let bookmarks = self.store.list_by_owner(&owner)?;
        debug!("Loaded {} bookmarks for {}", bookmarks.len(), owner);
        Ok(bookmarks)
    }
}
