// src/domain/url.rs
//! Normalization and validation of user-entered bookmark URLs.
//!
//! Input is free-form text from a form field or the command line. A missing
//! scheme is filled in with `https://`; anything that does not end up as an
//! absolute `http`/`https` URL with a plausible host is rejected before it
//! reaches the store.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{instrument, trace};
use url::Url;

/// Title used when no host can be extracted from a URL
pub const FALLBACK_TITLE: &str = "Link";

const DEFAULT_SCHEME_PREFIX: &str = "https://";

static WEB_SCHEME: OnceLock<Regex> = OnceLock::new();
static EXPLICIT_SCHEME: OnceLock<Regex> = OnceLock::new();

fn get_web_scheme() -> &'static Regex {
    WEB_SCHEME.get_or_init(|| Regex::new(r"(?i)^https?://").expect("compile web scheme regex"))
}

fn get_explicit_scheme() -> &'static Regex {
    EXPLICIT_SCHEME.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("compile explicit scheme regex")
    })
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlError {
    #[error("URL is required")]
    EmptyInput,

    #[error("Invalid URL")]
    InvalidUrl,

    #[error("URL must be http or https")]
    UnsupportedScheme,

    #[error("Enter a valid URL (e.g. example.com)")]
    InvalidHost,
}

/// Trims the input and prefixes `https://` unless it starts with `http://` or
/// `https://` (any case). Returns an empty string for blank input.
pub fn normalize(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if get_web_scheme().is_match(trimmed) {
        trimmed.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME_PREFIX, trimmed)
    }
}

/// Validates user input and returns the normalized URL.
///
/// The returned string is the normalized input itself, not a re-serialization
/// of the parsed URL: path, query, fragment and scheme casing stay exactly as
/// typed (`example.com` becomes `https://example.com`, no trailing slash).
///
/// Input that names another scheme (`ftp://example.com`) ends up with that
/// scheme as host after prefixing; when such input is rejected the error is
/// reported as [`UrlError::UnsupportedScheme`].
#[instrument(level = "trace")]
pub fn validate(input: &str) -> Result<String, UrlError> {
    let normalized = normalize(input);
    if normalized.is_empty() {
        return Err(UrlError::EmptyInput);
    }

    check_normalized(&normalized)
        .map(|_| normalized)
        .map_err(|e| {
            let trimmed = input.trim();
            if !get_web_scheme().is_match(trimmed) && get_explicit_scheme().is_match(trimmed) {
                trace!("Rejecting '{}' ({}): foreign scheme", trimmed, e);
                UrlError::UnsupportedScheme
            } else {
                e
            }
        })
}

fn check_normalized(normalized: &str) -> Result<(), UrlError> {
    let parsed = Url::parse(normalized).map_err(|e| {
        trace!("Parsing '{}' failed: {}", normalized, e);
        UrlError::InvalidUrl
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(UrlError::UnsupportedScheme);
    }

    // domain-shape heuristic only, no public suffix lookup
    match parsed.host_str() {
        Some(host) if host == "localhost" || host.contains('.') => Ok(()),
        _ => Err(UrlError::InvalidHost),
    }
}

/// Host part of `url`, or [`FALLBACK_TITLE`] if it has none.
pub fn derive_title(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(ToString::to_string))
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| FALLBACK_TITLE.to_string())
}

/// Picks the user's title when it has content, the URL's host otherwise.
pub fn resolve_title(user_title: Option<&str>, url: &str) -> String {
    match user_title.map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => derive_title(url),
    }
}
