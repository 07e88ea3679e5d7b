// src/domain/change_feed.rs
use crate::domain::bookmark::OwnerId;
use crate::domain::error::DomainResult;
use crate::domain::event::ChangeEvent;
use std::fmt::{self, Debug};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tracing::{debug, trace};

/// Callback invoked for every event matching a subscription.
///
/// May run on a thread owned by the feed; handlers should hand the event off
/// (see [`channel_handler`]) rather than mutate shared state.
pub type ChangeHandler = Arc<dyn Fn(ChangeEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Push channel for bookmark changes, filtered by owner
pub trait ChangeFeed: Send + Sync + Debug {
    fn subscribe(&self, owner: &OwnerId, handler: ChangeHandler)
        -> DomainResult<SubscriptionHandle>;

    /// Stops delivery for `handle`; returns false if it was not active.
    /// A delivery already running on another thread may still complete.
    fn unsubscribe(&self, handle: SubscriptionHandle) -> bool;
}

/// Forwards events into an mpsc channel; send errors mean the receiver is gone
pub fn channel_handler(tx: Sender<ChangeEvent>) -> ChangeHandler {
    Arc::new(move |event| {
        if tx.send(event).is_err() {
            trace!("Change event dropped, receiver closed");
        }
    })
}

/// Active subscription, released when dropped
pub struct Subscription {
    feed: Arc<dyn ChangeFeed>,
    handle: Option<SubscriptionHandle>,
    owner: OwnerId,
}

impl Subscription {
    pub fn open(
        feed: Arc<dyn ChangeFeed>,
        owner: &OwnerId,
        handler: ChangeHandler,
    ) -> DomainResult<Self> {
        let handle = feed.subscribe(owner, handler)?;
        debug!("Subscribed to changes for {} ({:?})", owner, handle);
        Ok(Self {
            feed,
            handle: Some(handle),
            owner: owner.clone(),
        })
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// Unsubscribes now instead of at drop
    pub fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            let released = self.feed.unsubscribe(handle);
            debug!("Unsubscribed {:?} (was active: {})", handle, released);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("handle", &self.handle)
            .field("owner", &self.owner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bookmark::BookmarkId;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::mpsc;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingFeed {
        next: AtomicU64,
        released: Mutex<Vec<SubscriptionHandle>>,
    }

    impl ChangeFeed for RecordingFeed {
        fn subscribe(
            &self,
            _owner: &OwnerId,
            _handler: ChangeHandler,
        ) -> DomainResult<SubscriptionHandle> {
            Ok(SubscriptionHandle::new(self.next.fetch_add(1, Ordering::SeqCst)))
        }

        fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
            self.released.lock().unwrap().push(handle);
            true
        }
    }

    #[test]
    fn given_subscription_when_dropped_then_unsubscribed_once() {
        let feed = Arc::new(RecordingFeed::default());
        let handler = channel_handler(mpsc::channel().0);
        {
            let sub = Subscription::open(feed.clone(), &OwnerId::new("alice"), handler).unwrap();
            assert!(sub.is_active());
        }
        assert_eq!(*feed.released.lock().unwrap(), vec![SubscriptionHandle::new(0)]);
    }

    #[test]
    fn given_closed_subscription_when_dropped_then_not_released_again() {
        let feed = Arc::new(RecordingFeed::default());
        let mut sub =
            Subscription::open(feed.clone(), &OwnerId::new("alice"), channel_handler(mpsc::channel().0))
                .unwrap();
        sub.close();
        assert!(!sub.is_active());
        drop(sub);
        assert_eq!(feed.released.lock().unwrap().len(), 1);
    }

    #[test]
    fn given_channel_handler_when_called_then_event_forwarded() {
        let (tx, rx) = mpsc::channel();
        let handler = channel_handler(tx);
        handler(ChangeEvent::Deleted(BookmarkId::new(3)));
        assert_eq!(rx.recv().unwrap(), ChangeEvent::Deleted(BookmarkId::new(3)));
    }

    #[test]
    fn given_dropped_receiver_when_handler_called_then_no_panic() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        channel_handler(tx)(ChangeEvent::Deleted(BookmarkId::new(1)));
    }
}
