// src/infrastructure/di/service_container.rs
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::bookmark_service::BookmarkService;
use crate::application::{BookmarkServiceImpl, BookmarkView};
use crate::config::Settings;
use crate::domain::bookmark::OwnerId;
use crate::domain::change_feed::ChangeFeed;
use crate::domain::event::InsertOrdering;
use crate::domain::identity::IdentityProvider;
use crate::infrastructure::identity::ConfiguredIdentity;
use crate::infrastructure::repositories::sqlite::change_feed::SqliteChangeFeed;
use crate::infrastructure::repositories::sqlite::repository::SqliteBookmarkStore;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Change log rows older than this are dropped at startup
const CHANGE_LOG_RETENTION_DAYS: i64 = 7;

/// Production service container - single source of truth for service creation
pub struct ServiceContainer {
    pub store: Arc<SqliteBookmarkStore>,
    pub change_feed: Arc<dyn ChangeFeed>,
    pub identity: Arc<dyn IdentityProvider>,
    pub bookmark_service: Arc<dyn BookmarkService>,
    pub insert_ordering: InsertOrdering,
}

impl ServiceContainer {
    /// Create all services with explicit dependency injection
    #[instrument(skip_all, level = "debug")]
    pub fn new(config: &Settings) -> ApplicationResult<Self> {
        let store = Self::create_store(&config.db_url)?;
        let change_feed: Arc<dyn ChangeFeed> = Arc::new(SqliteChangeFeed::new(
            store.pool().clone(),
            config.feed.poll_interval(),
        ));
        let identity: Arc<dyn IdentityProvider> = Arc::new(ConfiguredIdentity::new(
            config.user.as_deref().map(OwnerId::new),
        ));

        let bookmark_service = Arc::new(BookmarkServiceImpl::new(store.clone(), identity.clone()));

        debug!("Services created for {:?}", identity.current_user());
        Ok(Self {
            store,
            change_feed,
            identity,
            bookmark_service,
            insert_ordering: config.feed.insert_ordering,
        })
    }

    fn create_store(db_url: &str) -> ApplicationResult<Arc<SqliteBookmarkStore>> {
        if !Path::new(db_url).exists() {
            return Err(ApplicationError::Other(format!(
                "Database not found at '{}'. Create it with 'linkstash create-db {}' or set LINKSTASH_DB_URL",
                db_url, db_url
            )));
        }

        // Create the store, runs all migrations
        let store = SqliteBookmarkStore::from_url(db_url).map_err(|e| {
            ApplicationError::Other(format!("Failed to open bookmark database: {}", e))
        })?;

        if let Err(e) = store.prune_change_log(chrono::Duration::days(CHANGE_LOG_RETENTION_DAYS)) {
            warn!("Could not prune change log: {}", e);
        }

        Ok(Arc::new(store))
    }

    /// Opens a live view of the current user's bookmarks
    pub fn open_view(&self) -> ApplicationResult<BookmarkView> {
        BookmarkView::open(
            self.bookmark_service.as_ref(),
            self.change_feed.clone(),
            self.insert_ordering,
        )
    }
}

impl std::fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("store", &self.store)
            .field("change_feed", &self.change_feed)
            .field("identity", &self.identity)
            .field("bookmark_service", &"Arc<dyn BookmarkService>")
            .field("insert_ordering", &self.insert_ordering)
            .finish()
    }
}
