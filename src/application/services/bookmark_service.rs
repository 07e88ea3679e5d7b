// src/application/services/bookmark_service.rs
use crate::application::error::ApplicationResult;
use crate::domain::bookmark::{Bookmark, BookmarkId, OwnerId};
use std::fmt::Debug;

/// Service interface for bookmark-related operations of the signed-in user
pub trait BookmarkService: Send + Sync + Debug {
    /// The signed-in user, if any
    fn current_user(&self) -> Option<OwnerId>;

    /// Validate the raw url, derive a title if none is given, and store it
    fn add_bookmark(&self, url: &str, title: Option<&str>) -> ApplicationResult<Bookmark>;

    /// Change url and/or title; a blank title is re-derived from the url
    fn update_bookmark(
        &self,
        id: BookmarkId,
        url: Option<&str>,
        title: Option<&str>,
    ) -> ApplicationResult<Bookmark>;

    /// Request deletion; store failures are logged, not returned
    fn delete_bookmark(&self, id: BookmarkId) -> ApplicationResult<()>;

    /// Get a bookmark by ID if it belongs to the current user
    fn get_bookmark(&self, id: BookmarkId) -> ApplicationResult<Option<Bookmark>>;

    /// All bookmarks of the current user, newest first
    fn list_bookmarks(&self) -> ApplicationResult<Vec<Bookmark>>;
}
