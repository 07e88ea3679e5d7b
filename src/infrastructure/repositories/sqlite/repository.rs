// src/infrastructure/repositories/sqlite/repository.rs

use chrono::Utc;
use diesel::prelude::*;
use tracing::{debug, instrument};

use super::connection::{ConnectionPool, PooledConnection};
use super::error::{SqliteRepositoryError, SqliteResult};
use crate::domain::bookmark::{Bookmark, BookmarkId, BookmarkPatch, NewBookmark, OwnerId};
use crate::domain::error::DomainError;
use crate::domain::repositories::repository::BookmarkStore;
use crate::infrastructure::repositories::sqlite::model::{DbBookmark, DbBookmarkChanges, NewDbBookmark};
use crate::infrastructure::repositories::sqlite::schema::{bookmark_changes, bookmarks::dsl};

/// Bookmark store on a SQLite file shared by every session.
///
/// Triggers record each committed mutation in `bookmark_changes`, which is
/// what [`super::change_feed::SqliteChangeFeed`] tails.
#[derive(Clone, Debug)]
pub struct SqliteBookmarkStore {
    pool: ConnectionPool,
}

impl SqliteBookmarkStore {
    /// Create a new SQLite store with the provided connection pool
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Create a new SQLite store with the provided database URL
    #[instrument(skip_all, level = "debug")]
    pub fn from_url(database_url: &str) -> SqliteResult<Self> {
        let pool = super::connection::init_pool(database_url)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Get a connection from the pool
    #[instrument(skip_all, level = "trace")]
    pub fn get_connection(&self) -> SqliteResult<PooledConnection> {
        self.pool
            .get()
            .map_err(|e| SqliteRepositoryError::ConnectionPoolError(e.to_string()))
    }

    /// Drops change log rows older than `age`; returns the number removed
    #[instrument(skip(self), level = "debug")]
    pub fn prune_change_log(&self, age: chrono::Duration) -> SqliteResult<usize> {
        let mut conn = self.get_connection()?;
        let cutoff = (Utc::now() - age).naive_utc();
        let removed = diesel::delete(
            bookmark_changes::table.filter(bookmark_changes::changed_at.lt(cutoff)),
        )
        .execute(&mut conn)?;
        debug!("Pruned {} change log rows", removed);
        Ok(removed)
    }

    /// Deletes every bookmark and change log row
    #[instrument(skip_all, level = "debug")]
    pub fn empty_bookmark_table(&self) -> SqliteResult<()> {
        let mut conn = self.get_connection()?;
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::delete(dsl::bookmarks).execute(conn)?;
            diesel::delete(bookmark_changes::table).execute(conn)?;
            Ok(())
        })?;
        debug!("Cleaned table.");
        Ok(())
    }
}

impl BookmarkStore for SqliteBookmarkStore {
    #[instrument(skip_all, level = "debug")]
    fn insert(&self, bookmark: &NewBookmark) -> Result<Bookmark, DomainError> {
        let mut conn = self.get_connection()?;

        let db_bookmark = NewDbBookmark::from_domain(bookmark, Utc::now());
        debug!("Inserting bookmark: {:?}", db_bookmark);

        let stored = diesel::insert_into(dsl::bookmarks)
            .values(&db_bookmark)
            .returning(DbBookmark::as_returning())
            .get_result(&mut conn)
            .map_err(SqliteRepositoryError::DatabaseError)?;

        Ok(stored.into())
    }

    #[instrument(skip_all, level = "debug", fields(id = %id))]
    fn update(&self, id: BookmarkId, patch: &BookmarkPatch) -> Result<(), DomainError> {
        let mut conn = self.get_connection()?;

        if patch.is_empty() {
            let exists = dsl::bookmarks
                .filter(dsl::id.eq(id.value()))
                .count()
                .get_result::<i64>(&mut conn)
                .map_err(SqliteRepositoryError::DatabaseError)?;
            if exists == 0 {
                return Err(SqliteRepositoryError::BookmarkNotFound(id.value()).into());
            }
            return Ok(());
        }

        let changes = DbBookmarkChanges::from(patch);
        let result = diesel::update(dsl::bookmarks.filter(dsl::id.eq(id.value())))
            .set(&changes)
            .execute(&mut conn)
            .map_err(SqliteRepositoryError::DatabaseError)?;

        if result == 0 {
            return Err(SqliteRepositoryError::BookmarkNotFound(id.value()).into());
        }

        Ok(())
    }

    #[instrument(skip_all, level = "debug", fields(id = %id))]
    fn delete(&self, id: BookmarkId) -> Result<(), DomainError> {
        let mut conn = self.get_connection()?;

        let result = diesel::delete(dsl::bookmarks.filter(dsl::id.eq(id.value())))
            .execute(&mut conn)
            .map_err(SqliteRepositoryError::DatabaseError)?;

        if result == 0 {
            debug!("Delete of unknown bookmark {}", id);
        }
        Ok(())
    }

    #[instrument(skip_all, level = "debug", fields(owner = %owner))]
    fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<Bookmark>, DomainError> {
        let mut conn = self.get_connection()?;

        let db_bookmarks = dsl::bookmarks
            .filter(dsl::owner.eq(owner.as_str()))
            .order((dsl::created_at.desc(), dsl::id.desc()))
            .select(DbBookmark::as_select())
            .load(&mut conn)
            .map_err(SqliteRepositoryError::DatabaseError)?;

        Ok(db_bookmarks.into_iter().map(Bookmark::from).collect())
    }

    #[instrument(skip_all, level = "debug", fields(id = %id))]
    fn get(&self, id: BookmarkId) -> Result<Option<Bookmark>, DomainError> {
        let mut conn = self.get_connection()?;

        let result = dsl::bookmarks
            .filter(dsl::id.eq(id.value()))
            .select(DbBookmark::as_select())
            .first(&mut conn)
            .optional()
            .map_err(SqliteRepositoryError::DatabaseError)?;

        Ok(result.map(Bookmark::from))
    }
}
