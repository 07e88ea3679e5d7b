// src/util/testing.rs

use std::env;
use std::sync::OnceLock;
use tempfile::TempDir;
use tracing::{debug, info, instrument};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::config::{ENV_DB_URL, ENV_POLL_INTERVAL_MS, ENV_USER};
use crate::infrastructure::repositories::sqlite::repository::SqliteBookmarkStore;

/// Global test configuration, initialized exactly once via OnceLock.
#[derive(Debug)]
pub struct TestEnv {
    /// File name used for per-test databases
    pub db_file_name: &'static str,
}

static TEST_ENV: OnceLock<TestEnv> = OnceLock::new();

/// Initializes the global test environment exactly once and sets up logging.
pub fn init_test_env() -> &'static TestEnv {
    TEST_ENV.get_or_init(|| {
        setup_test_logging();
        info!("Test environment initialized");
        TestEnv {
            db_file_name: "test.db",
        }
    })
}

/// Logging setup only runs once; subsequent calls do nothing if `tracing` is already set.
fn setup_test_logging() {
    debug!("Attempting logger init from testing.rs");
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
        return;
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    subscriber.try_init().unwrap_or_else(|e| {
        eprintln!("Error: Failed to set up logging: {}", e);
    });
}

/// Restores the LINKSTASH_* environment variables on drop
#[derive(Debug, Clone)]
pub struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
}

impl Default for EnvGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvGuard {
    /// Snapshots and clears the variables
    pub fn new() -> Self {
        let saved = [ENV_DB_URL, ENV_USER, ENV_POLL_INTERVAL_MS]
            .into_iter()
            .map(|key| (key, env::var(key).ok()))
            .collect();
        let guard = Self { saved };
        guard.clear();
        guard
    }

    fn clear(&self) {
        for (key, _) in &self.saved {
            env::remove_var(key);
        }
    }
}

impl Drop for EnvGuard {
    #[instrument(level = "trace")]
    fn drop(&mut self) {
        self.clear();
        for (key, value) in &self.saved {
            if let Some(val) = value {
                env::set_var(key, val);
            }
        }
    }
}

/// Creates a migrated store on a fresh database inside a temp dir.
///
/// Keep the `TempDir` alive for as long as the store is used.
pub fn setup_test_store() -> (TempDir, SqliteBookmarkStore) {
    let env_data = init_test_env();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join(env_data.db_file_name);
    let store = SqliteBookmarkStore::from_url(db_path.to_string_lossy().as_ref())
        .expect("Failed to create SqliteBookmarkStore");
    (dir, store)
}
