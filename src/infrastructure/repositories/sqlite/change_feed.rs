// src/infrastructure/repositories/sqlite/change_feed.rs
//! Change feed that tails the `bookmark_changes` log.
//!
//! Every subscription owns a worker thread polling the log for rows newer
//! than its cursor. The cursor starts at the newest row present when the
//! subscription is made, so writes from any process sharing the database
//! file are delivered and older history is not replayed.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use diesel::prelude::*;
use tracing::{debug, instrument, trace, warn};

use super::connection::ConnectionPool;
use super::error::{SqliteRepositoryError, SqliteResult};
use super::model::DbChange;
use super::schema::bookmark_changes;
use crate::domain::bookmark::OwnerId;
use crate::domain::change_feed::{ChangeFeed, ChangeHandler, SubscriptionHandle};
use crate::domain::error::{DomainError, DomainResult};

const BATCH_SIZE: i64 = 256;

struct Worker {
    stop: Sender<()>,
    thread: JoinHandle<()>,
}

pub struct SqliteChangeFeed {
    pool: ConnectionPool,
    poll_interval: Duration,
    workers: Mutex<HashMap<SubscriptionHandle, Worker>>,
    next_handle: AtomicU64,
}

impl SqliteChangeFeed {
    pub fn new(pool: ConnectionPool, poll_interval: Duration) -> Self {
        Self {
            pool,
            poll_interval,
            workers: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
        }
    }

    pub fn active_subscriptions(&self) -> usize {
        self.workers.lock().map(|w| w.len()).unwrap_or(0)
    }

    fn latest_seq(&self) -> SqliteResult<i32> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| SqliteRepositoryError::ConnectionPoolError(e.to_string()))?;
        let max = bookmark_changes::table
            .select(diesel::dsl::max(bookmark_changes::seq))
            .first::<Option<i32>>(&mut conn)?;
        Ok(max.unwrap_or(0))
    }

    fn stop_worker(handle: SubscriptionHandle, worker: Worker) {
        // a closed channel also stops the loop
        let _ = worker.stop.send(());
        if worker.thread.thread().id() == thread::current().id() {
            // unsubscribed from inside its own handler; the loop exits on return
            return;
        }
        if worker.thread.join().is_err() {
            warn!("Change feed worker {:?} panicked", handle);
        }
    }
}

/// Loads the owner's change rows after `cursor`, oldest first
fn fetch_changes(pool: &ConnectionPool, owner: &OwnerId, cursor: i32) -> SqliteResult<Vec<DbChange>> {
    let mut conn = pool
        .get()
        .map_err(|e| SqliteRepositoryError::ConnectionPoolError(e.to_string()))?;
    let rows = bookmark_changes::table
        .filter(bookmark_changes::owner.eq(owner.as_str()))
        .filter(bookmark_changes::seq.gt(cursor))
        .order(bookmark_changes::seq.asc())
        .limit(BATCH_SIZE)
        .select(DbChange::as_select())
        .load(&mut conn)
        .map_err(SqliteRepositoryError::DatabaseError)?;
    Ok(rows)
}

/// Delivers one batch and returns the advanced cursor
fn deliver(rows: Vec<DbChange>, mut cursor: i32, handler: &ChangeHandler) -> i32 {
    for row in rows {
        cursor = row.seq;
        match row.into_event() {
            Ok(event) => {
                trace!("Delivering {}", event);
                handler(event);
            }
            Err(e) => warn!("Skipping change log row: {}", e),
        }
    }
    cursor
}

fn poll_loop(
    pool: ConnectionPool,
    owner: OwnerId,
    handler: ChangeHandler,
    mut cursor: i32,
    poll_interval: Duration,
    stop: mpsc::Receiver<()>,
) {
    debug!("Change feed worker for {} started at seq {}", owner, cursor);
    loop {
        match stop.recv_timeout(poll_interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
        loop {
            let rows = match fetch_changes(&pool, &owner, cursor) {
                Ok(rows) => rows,
                Err(e) => {
                    warn!("Polling change log failed: {}", e);
                    break;
                }
            };
            let full_batch = rows.len() as i64 == BATCH_SIZE;
            cursor = deliver(rows, cursor, &handler);
            if !full_batch {
                break;
            }
        }
    }
    debug!("Change feed worker for {} stopped at seq {}", owner, cursor);
}

impl fmt::Debug for SqliteChangeFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteChangeFeed")
            .field("poll_interval", &self.poll_interval)
            .field("subscriptions", &self.active_subscriptions())
            .finish()
    }
}

impl ChangeFeed for SqliteChangeFeed {
    #[instrument(skip(self, handler), level = "debug")]
    fn subscribe(&self, owner: &OwnerId, handler: ChangeHandler) -> DomainResult<SubscriptionHandle> {
        let cursor = self.latest_seq().map_err(|e| {
            DomainError::ChangeFeed(format!("cannot read change log position: {}", e))
        })?;
        let handle = SubscriptionHandle::new(self.next_handle.fetch_add(1, Ordering::SeqCst));

        let (stop_tx, stop_rx) = mpsc::channel();
        let pool = self.pool.clone();
        let owner = owner.clone();
        let poll_interval = self.poll_interval;
        let thread = thread::Builder::new()
            .name(format!("linkstash-feed-{}", handle.value()))
            .spawn(move || poll_loop(pool, owner, handler, cursor, poll_interval, stop_rx))?;

        self.workers
            .lock()
            .map_err(|e| DomainError::ChangeFeed(e.to_string()))?
            .insert(
                handle,
                Worker {
                    stop: stop_tx,
                    thread,
                },
            );
        Ok(handle)
    }

    #[instrument(skip(self), level = "debug")]
    fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let worker = match self.workers.lock() {
            Ok(mut workers) => workers.remove(&handle),
            Err(_) => None,
        };
        match worker {
            Some(worker) => {
                Self::stop_worker(handle, worker);
                true
            }
            None => false,
        }
    }
}

impl Drop for SqliteChangeFeed {
    fn drop(&mut self) {
        let workers: Vec<(SubscriptionHandle, Worker)> = match self.workers.get_mut() {
            Ok(workers) => workers.drain().collect(),
            Err(_) => return,
        };
        for (handle, worker) in workers {
            Self::stop_worker(handle, worker);
        }
    }
}
