// src/application/view.rs
//! Live view over the signed-in user's bookmarks.
//!
//! The view subscribes first and then loads the list once, keeping it current
//! by folding change events into it. The feed's handler only forwards events
//! into a channel; the view is the single owner of the list and applies
//! events when the caller pumps it. A change committed while the list loads
//! can arrive as an event the loaded list already reflects: updates and
//! deletes replay harmlessly, an insert of a known id replaces that entry.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, instrument, trace};

use crate::application::error::ApplicationResult;
use crate::application::services::bookmark_service::BookmarkService;
use crate::domain::bookmark::{Bookmark, OwnerId};
use crate::domain::change_feed::{channel_handler, ChangeFeed, Subscription};
use crate::domain::error::DomainError;
use crate::domain::event::{BookmarkList, ChangeEvent, InsertOrdering};

#[derive(Debug)]
pub struct BookmarkView {
    list: BookmarkList,
    owner: Option<OwnerId>,
    events: Option<Receiver<ChangeEvent>>,
    subscription: Option<Subscription>,
}

impl BookmarkView {
    /// Starts observing changes, then loads the current user's bookmarks.
    ///
    /// Without a signed-in user the view is empty and never changes. A failed
    /// load is logged and leaves the list empty; later events still apply.
    #[instrument(skip(service, feed), level = "debug")]
    pub fn open(
        service: &dyn BookmarkService,
        feed: Arc<dyn ChangeFeed>,
        ordering: InsertOrdering,
    ) -> ApplicationResult<Self> {
        let mut list = BookmarkList::new(ordering);

        let Some(owner) = service.current_user() else {
            debug!("No signed-in user, view stays empty");
            return Ok(Self {
                list,
                owner: None,
                events: None,
                subscription: None,
            });
        };

        let (tx, rx) = mpsc::channel();
        let subscription = Subscription::open(feed, &owner, channel_handler(tx))?;

        match service.list_bookmarks() {
            Ok(bookmarks) => list.reset(bookmarks),
            Err(e) => error!("Error fetching bookmarks: {}", e),
        }

        Ok(Self {
            list,
            owner: Some(owner),
            events: Some(rx),
            subscription: Some(subscription),
        })
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        self.list.as_slice()
    }

    pub fn owner(&self) -> Option<&OwnerId> {
        self.owner.as_ref()
    }

    pub fn is_live(&self) -> bool {
        self.subscription.as_ref().is_some_and(Subscription::is_active)
    }

    /// Applies every event already received; returns how many were applied
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.try_next() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Blocks up to `timeout` for the next event, then drains any backlog.
    ///
    /// Returns the number of events applied, zero on timeout or when the view
    /// is not live. Fails if the feed went away while still subscribed.
    pub fn wait_for_change(&mut self, timeout: Duration) -> ApplicationResult<usize> {
        self.wait_for_events(timeout).map(|events| events.len())
    }

    /// Like [`Self::wait_for_change`], returning the applied events in order
    pub fn wait_for_events(&mut self, timeout: Duration) -> ApplicationResult<Vec<ChangeEvent>> {
        if !self.is_live() {
            return Ok(Vec::new());
        }
        let Some(events) = self.events.as_ref() else {
            return Ok(Vec::new());
        };
        let first = match events.recv_timeout(timeout) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => return Ok(Vec::new()),
            Err(RecvTimeoutError::Disconnected) => {
                return Err(DomainError::ChangeFeed(
                    "change feed closed the subscription".to_string(),
                )
                .into())
            }
        };
        let mut applied = vec![first.clone()];
        self.apply(first);
        while let Some(event) = self.try_next() {
            applied.push(event.clone());
            self.apply(event);
        }
        Ok(applied)
    }

    /// Stops observing; the list keeps its last state
    pub fn close(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.close();
        }
        self.events = None;
    }

    fn try_next(&mut self) -> Option<ChangeEvent> {
        let events = self.events.as_ref()?;
        match events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    fn apply(&mut self, event: ChangeEvent) {
        trace!("Applying {}", event);
        let event = match event {
            ChangeEvent::Inserted(bookmark) if self.list.contains(bookmark.id) => {
                debug!("Insert of loaded bookmark {} replayed", bookmark.id);
                ChangeEvent::Updated(bookmark)
            }
            other => other,
        };
        self.list.apply(event);
    }
}
