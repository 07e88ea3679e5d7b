// src/config.rs
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::event::InsertOrdering;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument, trace, warn};

pub const ENV_DB_URL: &str = "LINKSTASH_DB_URL";
pub const ENV_USER: &str = "LINKSTASH_USER";
pub const ENV_POLL_INTERVAL_MS: &str = "LINKSTASH_POLL_INTERVAL_MS";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeedOpts {
    /// How often a subscription polls the change log (default: 500)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Where newly inserted bookmarks land in a live list (default: "prepend")
    #[serde(default)]
    pub insert_ordering: InsertOrdering,
}

fn default_poll_interval_ms() -> u64 {
    500
}

impl FeedOpts {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Default for FeedOpts {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            insert_ordering: InsertOrdering::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    /// Path to the SQLite database file
    #[serde(default = "default_db_path")]
    pub db_url: String,

    /// User whose bookmarks are shown; unset means signed out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default)]
    pub feed: FeedOpts,
}

fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config/linkstash")
}

fn default_db_path() -> String {
    default_config_dir()
        .join("linkstash.db")
        .to_string_lossy()
        .into_owned()
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_url: default_db_path(),
            user: None,
            feed: FeedOpts::default(),
        }
    }
}

/// Expands `~` and environment variables; unexpandable input is kept as is
fn expand_path(raw: &str) -> String {
    match shellexpand::full(raw) {
        Ok(expanded) => expanded.into_owned(),
        Err(e) => {
            warn!("Cannot expand '{}': {}", raw, e);
            raw.to_string()
        }
    }
}

fn read_config_file(path: &Path) -> DomainResult<Settings> {
    let config_text = std::fs::read_to_string(path)?;
    toml::from_str::<Settings>(&config_text).map_err(|e| {
        DomainError::Other(format!("Invalid config file {}: {}", path.display(), e))
    })
}

/// Loads settings: defaults, then the config file, then environment variables.
///
/// An explicitly given `config_file` must exist and parse; problems with the
/// default config file are logged and ignored.
#[instrument(level = "debug")]
pub fn load_settings(config_file: Option<&Path>) -> DomainResult<Settings> {
    trace!("Loading settings");

    let mut settings = match config_file {
        Some(path) => {
            debug!("Loading config from: {:?}", path);
            read_config_file(path)?
        }
        None => {
            let path = default_config_path();
            if path.exists() {
                trace!("Loading config from: {:?}", path);
                read_config_file(&path).unwrap_or_else(|e| {
                    warn!("Ignoring config file: {}", e);
                    Settings::default()
                })
            } else {
                Settings::default()
            }
        }
    };

    // Override with environment variables
    if let Ok(db_url) = std::env::var(ENV_DB_URL) {
        trace!("Using {} from environment: {}", ENV_DB_URL, db_url);
        settings.db_url = db_url;
    }

    if let Ok(user) = std::env::var(ENV_USER) {
        trace!("Using {} from environment: {}", ENV_USER, user);
        settings.user = Some(user);
    }

    if let Ok(interval) = std::env::var(ENV_POLL_INTERVAL_MS) {
        match interval.trim().parse::<u64>() {
            Ok(ms) => settings.feed.poll_interval_ms = ms,
            Err(e) => warn!("Ignoring {}='{}': {}", ENV_POLL_INTERVAL_MS, interval, e),
        }
    }

    settings.db_url = expand_path(&settings.db_url);

    trace!("Settings loaded: {:?}", settings);
    Ok(settings)
}

pub fn generate_default_config() -> String {
    let default_settings = Settings::default();
    toml::to_string_pretty(&default_settings)
        .unwrap_or_else(|_| "# Error generating default configuration".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::EnvGuard;
    use serial_test::serial;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    fn create_temp_config_file(content: &str) -> (TempDir, PathBuf) {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, content).unwrap();
        (temp_dir, config_path)
    }

    #[test]
    #[serial]
    fn given_no_overrides_when_load_then_defaults() {
        let _guard = EnvGuard::new();
        let (_dir, path) = create_temp_config_file("");

        let settings = load_settings(Some(&path)).unwrap();

        assert!(settings.db_url.ends_with("linkstash.db"));
        assert_eq!(settings.user, None);
        assert_eq!(settings.feed.poll_interval_ms, 500);
        assert_eq!(settings.feed.insert_ordering, InsertOrdering::Prepend);
    }

    #[test]
    #[serial]
    fn given_config_file_when_load_then_values_used() {
        let _guard = EnvGuard::new();
        let (_dir, path) = create_temp_config_file(
            r#"
db_url = "/tmp/stash.db"
user = "alice"

[feed]
poll_interval_ms = 50
insert_ordering = "created_at_desc"
"#,
        );

        let settings = load_settings(Some(&path)).unwrap();

        assert_eq!(settings.db_url, "/tmp/stash.db");
        assert_eq!(settings.user.as_deref(), Some("alice"));
        assert_eq!(settings.feed.poll_interval(), Duration::from_millis(50));
        assert_eq!(settings.feed.insert_ordering, InsertOrdering::CreatedAtDesc);
    }

    #[test]
    #[serial]
    fn given_env_vars_when_load_then_override_file() {
        let _guard = EnvGuard::new();
        let (_dir, path) = create_temp_config_file("db_url = \"/tmp/file.db\"\nuser = \"alice\"\n");
        env::set_var(ENV_DB_URL, "/test/custom.db");
        env::set_var(ENV_USER, "bob");
        env::set_var(ENV_POLL_INTERVAL_MS, "25");

        let settings = load_settings(Some(&path)).unwrap();

        assert_eq!(settings.db_url, "/test/custom.db");
        assert_eq!(settings.user.as_deref(), Some("bob"));
        assert_eq!(settings.feed.poll_interval_ms, 25);
    }

    #[test]
    #[serial]
    fn given_bad_poll_interval_env_when_load_then_ignored() {
        let _guard = EnvGuard::new();
        let (_dir, path) = create_temp_config_file("[feed]\npoll_interval_ms = 80\n");
        env::set_var(ENV_POLL_INTERVAL_MS, "soon");

        let settings = load_settings(Some(&path)).unwrap();

        assert_eq!(settings.feed.poll_interval_ms, 80);
    }

    #[test]
    #[serial]
    fn given_tilde_in_db_url_when_load_then_expanded() {
        let _guard = EnvGuard::new();
        let (_dir, path) = create_temp_config_file("");
        env::set_var(ENV_DB_URL, "~/stash/links.db");

        let settings = load_settings(Some(&path)).unwrap();

        assert!(!settings.db_url.starts_with('~'));
        assert!(settings.db_url.ends_with("stash/links.db"));
    }

    #[test]
    #[serial]
    fn given_missing_explicit_config_when_load_then_error() {
        let _guard = EnvGuard::new();
        let dir = tempfile::tempdir().unwrap();

        let result = load_settings(Some(&dir.path().join("nope.toml")));

        assert!(matches!(result, Err(DomainError::Io(_))));
    }

    #[test]
    #[serial]
    fn given_malformed_config_when_load_then_error_names_file() {
        let _guard = EnvGuard::new();
        let (_dir, path) = create_temp_config_file("[feed\npoll_interval_ms = ");

        let err = load_settings(Some(&path)).unwrap_err();

        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn given_zero_interval_when_poll_interval_then_clamped() {
        let opts = FeedOpts {
            poll_interval_ms: 0,
            ..FeedOpts::default()
        };
        assert_eq!(opts.poll_interval(), Duration::from_millis(1));
    }

    #[test]
    fn given_default_settings_when_generate_config_then_parses_back() {
        let generated = generate_default_config();

        assert!(generated.contains("db_url"));
        assert!(generated.contains("[feed]"));
        assert!(!generated.contains("user ="));
        let parsed: Settings = toml::from_str(&generated).unwrap();
        assert_eq!(parsed, Settings::default());
    }
}
