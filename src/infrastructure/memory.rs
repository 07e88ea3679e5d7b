// src/infrastructure/memory.rs
//! Process-local backend: a bookmark store and its change feed in one place.
//!
//! Events are delivered synchronously on the writer's thread right after the
//! mutation is applied, in mutation order.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, instrument, trace};

use crate::domain::bookmark::{Bookmark, BookmarkId, BookmarkPatch, NewBookmark, OwnerId};
use crate::domain::change_feed::{ChangeFeed, ChangeHandler, SubscriptionHandle};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::event::ChangeEvent;
use crate::domain::repositories::repository::BookmarkStore;

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Bookmark>,
    last_id: i32,
}

#[derive(Debug, Default)]
struct InjectedFailures {
    write: Option<String>,
    read: Option<String>,
}

#[derive(Default)]
pub struct InMemoryBackend {
    table: Mutex<Table>,
    subscribers: Mutex<HashMap<SubscriptionHandle, (OwnerId, ChangeHandler)>>,
    next_handle: AtomicU64,
    failures: Mutex<InjectedFailures>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next insert/update/delete fail with `message`
    pub fn fail_next_write<S: Into<String>>(&self, message: S) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.write = Some(message.into());
        }
    }

    /// Makes the next get/list fail with `message`
    pub fn fail_next_read<S: Into<String>>(&self, message: S) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.read = Some(message.into());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }

    fn table(&self) -> DomainResult<MutexGuard<'_, Table>> {
        self.table
            .lock()
            .map_err(|e| DomainError::Store(format!("bookmark table poisoned: {}", e)))
    }

    fn take_failure(&self, write: bool) -> DomainResult<()> {
        let mut failures = self
            .failures
            .lock()
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let slot = if write {
            &mut failures.write
        } else {
            &mut failures.read
        };
        match slot.take() {
            Some(message) => Err(DomainError::Store(message)),
            None => Ok(()),
        }
    }

    fn publish(&self, owner: &OwnerId, event: ChangeEvent) {
        // handlers run without the subscriber lock held
        let handlers: Vec<ChangeHandler> = match self.subscribers.lock() {
            Ok(subscribers) => subscribers
                .values()
                .filter(|(o, _)| o == owner)
                .map(|(_, h)| h.clone())
                .collect(),
            Err(_) => return,
        };
        trace!("Publishing {} to {} subscriber(s)", event, handlers.len());
        for handler in handlers {
            handler(event.clone());
        }
    }
}

impl fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryBackend")
            .field("table", &self.table)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl BookmarkStore for InMemoryBackend {
    #[instrument(skip(self), level = "debug")]
    fn insert(&self, bookmark: &NewBookmark) -> DomainResult<Bookmark> {
        self.take_failure(true)?;
        let stored = {
            let mut table = self.table()?;
            table.last_id += 1;
            let stored = Bookmark {
                id: BookmarkId::new(table.last_id),
                url: bookmark.url.clone(),
                title: bookmark.title.clone(),
                owner: bookmark.owner.clone(),
                created_at: Utc::now(),
            };
            table.rows.push(stored.clone());
            stored
        };
        self.publish(&stored.owner, ChangeEvent::Inserted(stored.clone()));
        Ok(stored)
    }

    #[instrument(skip(self), level = "debug")]
    fn update(&self, id: BookmarkId, patch: &BookmarkPatch) -> DomainResult<()> {
        self.take_failure(true)?;
        let updated = {
            let mut table = self.table()?;
            let row = table
                .rows
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or_else(|| DomainError::BookmarkNotFound(id.to_string()))?;
            row.apply_patch(patch);
            row.clone()
        };
        self.publish(&updated.owner, ChangeEvent::Updated(updated.clone()));
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    fn delete(&self, id: BookmarkId) -> DomainResult<()> {
        self.take_failure(true)?;
        let removed = {
            let mut table = self.table()?;
            let pos = table.rows.iter().position(|b| b.id == id);
            pos.map(|p| table.rows.remove(p))
        };
        match removed {
            Some(bookmark) => {
                self.publish(&bookmark.owner, ChangeEvent::Deleted(id));
                Ok(())
            }
            None => {
                debug!("Delete of unknown bookmark {}", id);
                Ok(())
            }
        }
    }

    fn list_by_owner(&self, owner: &OwnerId) -> DomainResult<Vec<Bookmark>> {
        self.take_failure(false)?;
        let table = self.table()?;
        let mut rows: Vec<Bookmark> = table
            .rows
            .iter()
            .filter(|b| &b.owner == owner)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    fn get(&self, id: BookmarkId) -> DomainResult<Option<Bookmark>> {
        self.take_failure(false)?;
        let table = self.table()?;
        Ok(table.rows.iter().find(|b| b.id == id).cloned())
    }
}

impl ChangeFeed for InMemoryBackend {
    fn subscribe(&self, owner: &OwnerId, handler: ChangeHandler) -> DomainResult<SubscriptionHandle> {
        let handle = SubscriptionHandle::new(self.next_handle.fetch_add(1, Ordering::SeqCst));
        self.subscribers
            .lock()
            .map_err(|e| DomainError::ChangeFeed(e.to_string()))?
            .insert(handle, (owner.clone(), handler));
        Ok(handle)
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        self.subscribers
            .lock()
            .map(|mut s| s.remove(&handle).is_some())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::change_feed::channel_handler;
    use std::sync::mpsc;

    fn new_bookmark(url: &str, owner: &str) -> NewBookmark {
        NewBookmark::from_input(url, None, OwnerId::new(owner)).unwrap()
    }

    #[test]
    fn given_inserts_when_listed_then_newest_first() {
        let backend = InMemoryBackend::new();
        let a = backend.insert(&new_bookmark("a.example", "alice")).unwrap();
        let b = backend.insert(&new_bookmark("b.example", "alice")).unwrap();

        let listed = backend.list_by_owner(&OwnerId::new("alice")).unwrap();

        assert_eq!(listed, vec![b, a]);
    }

    #[test]
    fn given_subscriber_when_mutations_then_events_in_order_for_owner_only() {
        let backend = InMemoryBackend::new();
        let (tx, rx) = mpsc::channel();
        backend
            .subscribe(&OwnerId::new("alice"), channel_handler(tx))
            .unwrap();

        let a = backend.insert(&new_bookmark("a.example", "alice")).unwrap();
        backend.insert(&new_bookmark("b.example", "bob")).unwrap();
        backend
            .update(
                a.id,
                &BookmarkPatch {
                    url: None,
                    title: Some("A".to_string()),
                },
            )
            .unwrap();
        backend.delete(a.id).unwrap();

        let events: Vec<ChangeEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], ChangeEvent::Inserted(a.clone()));
        assert!(matches!(&events[1], ChangeEvent::Updated(b) if b.title == "A"));
        assert_eq!(events[2], ChangeEvent::Deleted(a.id));
    }

    #[test]
    fn given_unsubscribed_handle_when_insert_then_no_event() {
        let backend = InMemoryBackend::new();
        let (tx, rx) = mpsc::channel();
        let handle = backend
            .subscribe(&OwnerId::new("alice"), channel_handler(tx))
            .unwrap();

        assert!(backend.unsubscribe(handle));
        assert!(!backend.unsubscribe(handle));
        backend.insert(&new_bookmark("a.example", "alice")).unwrap();

        assert!(rx.try_recv().is_err());
        assert_eq!(backend.subscriber_count(), 0);
    }

    #[test]
    fn given_injected_failure_when_insert_then_nothing_stored_or_published() {
        let backend = InMemoryBackend::new();
        let (tx, rx) = mpsc::channel();
        backend
            .subscribe(&OwnerId::new("alice"), channel_handler(tx))
            .unwrap();
        backend.fail_next_write("boom");

        let err = backend.insert(&new_bookmark("a.example", "alice")).unwrap_err();

        assert_eq!(err.to_string(), "boom");
        assert!(rx.try_recv().is_err());
        assert!(backend.insert(&new_bookmark("a.example", "alice")).is_ok());
    }

    #[test]
    fn given_unknown_id_when_update_then_not_found() {
        let backend = InMemoryBackend::new();
        let result = backend.update(BookmarkId::new(99), &BookmarkPatch::default());
        assert!(matches!(result, Err(DomainError::BookmarkNotFound(_))));
    }
}
