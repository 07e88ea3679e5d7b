// src/domain/repositories/repository.rs

use crate::domain::bookmark::{Bookmark, BookmarkId, BookmarkPatch, NewBookmark, OwnerId};
use crate::domain::error::DomainError;
/*
   Store Interface
   The persistence backend owns identity assignment, timestamps and ordering.
   Every mutation it commits is expected to show up on the matching change feed.
*/
/// Persistence operations for bookmarks
pub trait BookmarkStore: std::fmt::Debug + Send + Sync {
    /// Persist a new bookmark, returning it with id and creation time assigned
    fn insert(&self, bookmark: &NewBookmark) -> Result<Bookmark, DomainError>;

    /// Change url and/or title of an existing bookmark
    fn update(&self, id: BookmarkId, patch: &BookmarkPatch) -> Result<(), DomainError>;

    /// Remove a bookmark
    fn delete(&self, id: BookmarkId) -> Result<(), DomainError>;

    /// All bookmarks of `owner`, newest first
    fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<Bookmark>, DomainError>;

    /// Get a bookmark by its ID
    fn get(&self, id: BookmarkId) -> Result<Option<Bookmark>, DomainError>;
}
