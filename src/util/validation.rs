use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::bookmark::{Bookmark, BookmarkId, OwnerId};
use crate::domain::repositories::repository::BookmarkStore;

/// Utility for common validation patterns across services
pub struct ValidationHelper;

impl ValidationHelper {
    /// Validates that a bookmark ID is positive (> 0)
    ///
    /// # Returns
    /// * `Ok(())` - If the ID is valid
    /// * `Err(ApplicationError::Other)` - If the ID is invalid (≤ 0)
    pub fn validate_bookmark_id(id: BookmarkId) -> ApplicationResult<()> {
        if id.value() <= 0 {
            return Err(ApplicationError::Other(format!(
                "Invalid bookmark ID: {}",
                id
            )));
        }
        Ok(())
    }

    /// Validates the ID and fetches the bookmark, which must belong to `owner`.
    ///
    /// Bookmarks of other users are reported as not found.
    pub fn validate_and_get_owned_bookmark<S: BookmarkStore + ?Sized>(
        id: BookmarkId,
        owner: &OwnerId,
        store: &S,
    ) -> ApplicationResult<Bookmark> {
        Self::validate_bookmark_id(id)?;

        store
            .get(id)?
            .filter(|bookmark| &bookmark.owner == owner)
            .ok_or(ApplicationError::BookmarkNotFound(id))
    }
}
