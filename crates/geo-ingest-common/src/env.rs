//! Environment variable helpers
//!
//! Configuration in geo-ingest comes from process environment variables,
//! optionally seeded from a `.env` file. Unset variables fall back to
//! defaults; set-but-unparsable variables are configuration errors rather
//! than silently ignored.

use std::str::FromStr;

use crate::error::{Error, Result};

/// Load a `.env` file from the working directory (or a parent) if present.
///
/// Variables already present in the environment take precedence.
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }
}

/// Read an optional variable, treating an empty value as unset
pub fn var_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a variable or fall back to `default`
pub fn var_or(key: &str, default: &str) -> String {
    var_opt(key).unwrap_or_else(|| default.to_string())
}

/// Parse a variable into `T`, falling back to `default` when unset
pub fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var_opt(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::config(format!("{key}={raw:?} is invalid: {e}"))),
        None => Ok(default),
    }
}
