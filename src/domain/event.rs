// src/domain/event.rs
//! Change events delivered by a change feed, and the reducer that folds them
//! into the locally cached bookmark list.
//!
//! The cached list is ordered newest first. Inserts are assumed to arrive in
//! creation order and are prepended without re-sorting; this holds for a
//! single writer but can misplace a record when the feed delivers out of
//! order. [`InsertOrdering::CreatedAtDesc`] trades that assumption for a
//! positional insert.

use crate::domain::bookmark::{Bookmark, BookmarkId};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// A single-record change as pushed by a change feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Inserted(Bookmark),
    Updated(Bookmark),
    Deleted(BookmarkId),
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeEvent::Inserted(b) => write!(f, "inserted {}", b),
            ChangeEvent::Updated(b) => write!(f, "updated {}", b),
            ChangeEvent::Deleted(id) => write!(f, "deleted [{}]", id),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertOrdering {
    /// New records go to the front
    #[default]
    Prepend,
    /// New records go before the first element that is not newer
    CreatedAtDesc,
}

/// Folds one event into `list` using the prepend policy.
pub fn apply_event(list: Vec<Bookmark>, event: ChangeEvent) -> Vec<Bookmark> {
    apply_event_with(list, event, InsertOrdering::Prepend)
}

pub fn apply_event_with(
    mut list: Vec<Bookmark>,
    event: ChangeEvent,
    ordering: InsertOrdering,
) -> Vec<Bookmark> {
    match event {
        ChangeEvent::Inserted(record) => {
            let at = match ordering {
                InsertOrdering::Prepend => 0,
                InsertOrdering::CreatedAtDesc => list
                    .iter()
                    .position(|b| b.created_at <= record.created_at)
                    .unwrap_or(list.len()),
            };
            trace!("Inserting bookmark {} at {}", record.id, at);
            list.insert(at, record);
        }
        ChangeEvent::Updated(record) => {
            if let Some(slot) = list.iter_mut().find(|b| b.id == record.id) {
                *slot = record;
            } else {
                trace!("Update for unknown bookmark {} ignored", record.id);
            }
        }
        ChangeEvent::Deleted(id) => {
            list.retain(|b| b.id != id);
        }
    }
    list
}

/// Ordered bookmark cache patched by change events
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkList {
    items: Vec<Bookmark>,
    ordering: InsertOrdering,
}

impl BookmarkList {
    pub fn new(ordering: InsertOrdering) -> Self {
        Self {
            items: Vec::new(),
            ordering,
        }
    }

    /// Replaces the whole list, e.g. after an initial load
    pub fn reset(&mut self, items: Vec<Bookmark>) {
        self.items = items;
    }

    pub fn apply(&mut self, event: ChangeEvent) {
        let items = std::mem::take(&mut self.items);
        self.items = apply_event_with(items, event, self.ordering);
    }

    pub fn as_slice(&self) -> &[Bookmark] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: BookmarkId) -> bool {
        self.items.iter().any(|b| b.id == id)
    }
}
