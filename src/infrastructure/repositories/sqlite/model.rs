// src/infrastructure/repositories/sqlite/model.rs
use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use std::fmt;

use crate::domain::bookmark::{Bookmark, BookmarkId, BookmarkPatch, NewBookmark, OwnerId};
use crate::domain::event::ChangeEvent;
use crate::infrastructure::repositories::sqlite::error::{SqliteRepositoryError, SqliteResult};

#[derive(Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = crate::infrastructure::repositories::sqlite::schema::bookmarks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbBookmark {
    pub id: i32,
    pub url: String,
    pub title: String,
    pub owner: String,
    pub created_at: NaiveDateTime,
}

impl fmt::Display for DbBookmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id: {}, url: {}, title: {}, owner: {}, created_at: {}",
            self.id, self.url, self.title, self.owner, self.created_at
        )
    }
}

impl From<DbBookmark> for Bookmark {
    fn from(db: DbBookmark) -> Self {
        Bookmark {
            id: BookmarkId::new(db.id),
            url: db.url,
            title: db.title,
            owner: OwnerId::new(db.owner),
            created_at: DateTime::<Utc>::from_naive_utc_and_offset(db.created_at, Utc),
        }
    }
}

/// New bookmark for insertion
#[derive(Insertable, Debug)]
#[diesel(table_name = crate::infrastructure::repositories::sqlite::schema::bookmarks)]
pub struct NewDbBookmark<'a> {
    pub url: &'a str,
    pub title: &'a str,
    pub owner: &'a str,
    pub created_at: NaiveDateTime,
}

impl<'a> NewDbBookmark<'a> {
    pub fn from_domain(bookmark: &'a NewBookmark, created_at: DateTime<Utc>) -> Self {
        Self {
            url: &bookmark.url,
            title: &bookmark.title,
            owner: bookmark.owner.as_str(),
            created_at: created_at.naive_utc(),
        }
    }
}

/// Changes for updating a bookmark; `None` leaves the column alone
#[derive(AsChangeset, Debug)]
#[diesel(table_name = crate::infrastructure::repositories::sqlite::schema::bookmarks)]
pub struct DbBookmarkChanges<'a> {
    pub url: Option<&'a str>,
    pub title: Option<&'a str>,
}

impl<'a> From<&'a BookmarkPatch> for DbBookmarkChanges<'a> {
    fn from(patch: &'a BookmarkPatch) -> Self {
        Self {
            url: patch.url.as_deref(),
            title: patch.title.as_deref(),
        }
    }
}

/// Row of the change log written by the bookmark triggers
#[derive(Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = crate::infrastructure::repositories::sqlite::schema::bookmark_changes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbChange {
    pub seq: i32,
    pub kind: String,
    pub bookmark_id: i32,
    pub owner: String,
    pub url: Option<String>,
    pub title: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

impl DbChange {
    pub fn into_event(self) -> SqliteResult<ChangeEvent> {
        let id = BookmarkId::new(self.bookmark_id);
        match self.kind.as_str() {
            "DELETE" => Ok(ChangeEvent::Deleted(id)),
            kind @ ("INSERT" | "UPDATE") => {
                let (Some(url), Some(title), Some(created_at)) =
                    (self.url, self.title, self.created_at)
                else {
                    return Err(SqliteRepositoryError::ConversionError(format!(
                        "change {} for bookmark {} lacks row data",
                        self.seq, self.bookmark_id
                    )));
                };
                let bookmark = Bookmark {
                    id,
                    url,
                    title,
                    owner: OwnerId::new(self.owner),
                    created_at: DateTime::<Utc>::from_naive_utc_and_offset(created_at, Utc),
                };
                Ok(if kind == "INSERT" {
                    ChangeEvent::Inserted(bookmark)
                } else {
                    ChangeEvent::Updated(bookmark)
                })
            }
            other => Err(SqliteRepositoryError::ConversionError(format!(
                "unknown change kind '{}' at seq {}",
                other, self.seq
            ))),
        }
    }
}
