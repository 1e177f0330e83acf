//! Runtime configuration parsed from environment variables.
//!
//! SYSTEM CONTEXT
//! ==============
//! `main` loads a `.env` file (if present) and then builds a single
//! [`Config`] that is shared through `AppState`. Optional integrations
//! (object storage, admin login) are represented as `Option`s so a missing
//! secret disables the feature instead of aborting startup.

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_STORAGE_BUCKET: &str = "images";
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 12;
pub const DEFAULT_MATCH_DURATION_MINUTES: i64 = 120;
/// One year.
pub const MAX_SESSION_TTL_HOURS: i64 = 8760;
/// One week.
pub const MAX_MATCH_DURATION_MINUTES: i64 = 10_080;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub base_url: String,
    pub service_key: String,
    pub bucket: String,
    pub max_image_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    /// `None` disables image upload.
    pub storage: Option<StorageConfig>,
    /// `None` disables the admin back office.
    pub admin_password: Option<String>,
    pub session_ttl: time::Duration,
    pub cookie_secure: bool,
    /// Take the client address for login throttling from `X-Forwarded-For`.
    /// Only safe behind a proxy that overwrites the header.
    pub trust_forwarded_for: bool,
    pub match_duration: time::Duration,
    pub website_dir: Option<PathBuf>,
}

impl Config {
    /// Build configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or a numeric variable
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Empty values are
    /// treated as unset.
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let port = parse_or(get("PORT"), "PORT", DEFAULT_PORT)?;
        let db_max_connections = parse_or(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;

        let storage = match (get("STORAGE_URL"), get("STORAGE_SERVICE_KEY")) {
            (Some(base_url), Some(service_key)) => Some(StorageConfig {
                base_url: base_url.trim_end_matches('/').to_owned(),
                service_key,
                bucket: get("STORAGE_BUCKET").unwrap_or_else(|| DEFAULT_STORAGE_BUCKET.to_owned()),
                max_image_bytes: parse_or(get("STORAGE_MAX_IMAGE_BYTES"), "STORAGE_MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES)?,
            }),
            _ => None,
        };

        let ttl_hours = parse_or(get("ADMIN_SESSION_TTL_HOURS"), "ADMIN_SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS)?;
        let match_minutes = parse_or(
            get("MATCH_DEFAULT_DURATION_MINUTES"),
            "MATCH_DEFAULT_DURATION_MINUTES",
            DEFAULT_MATCH_DURATION_MINUTES,
        )?;
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&ttl_hours) {
            return Err(ConfigError::Invalid { key: "ADMIN_SESSION_TTL_HOURS", value: ttl_hours.to_string() });
        }
        if !(1..=MAX_MATCH_DURATION_MINUTES).contains(&match_minutes) {
            return Err(ConfigError::Invalid { key: "MATCH_DEFAULT_DURATION_MINUTES", value: match_minutes.to_string() });
        }

        let cookie_secure = flag(get("COOKIE_SECURE"), "COOKIE_SECURE")?;
        let trust_forwarded_for = flag(get("TRUST_FORWARDED_FOR"), "TRUST_FORWARDED_FOR")?;

        Ok(Self {
            database_url,
            port,
            db_max_connections,
            storage,
            admin_password: get("ADMIN_PASSWORD"),
            session_ttl: time::Duration::hours(ttl_hours),
            cookie_secure,
            trust_forwarded_for,
            match_duration: time::Duration::minutes(match_minutes),
            website_dir: get("WEBSITE_DIR").map(PathBuf::from),
        })
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value.parse::<T>().map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn flag(raw: Option<String>, key: &'static str) -> Result<bool, ConfigError> {
    match raw {
        Some(value) => parse_bool(&value).ok_or(ConfigError::Invalid { key, value }),
        None => Ok(false),
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
