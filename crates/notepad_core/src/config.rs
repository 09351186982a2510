//! Runtime configuration resolved from the environment.
//!
//! | Variable             | Default                        |
//! |----------------------|--------------------------------|
//! | `NOTEPAD_DB_PATH`    | `<temp_dir>/Notes.db`          |
//! | `NOTEPAD_AUTHORITY`  | `com.example.android.notepad`  |
//! | `NOTEPAD_LOG_LEVEL`  | `default_log_level()`          |
//! | `NOTEPAD_LOG_DIR`    | unset (file logging disabled)  |
//!
//! Blank values count as unset.

use crate::contract::DEFAULT_AUTHORITY;
use crate::db::DATABASE_NAME;
use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "NOTEPAD_DB_PATH";
pub const ENV_AUTHORITY: &str = "NOTEPAD_AUTHORITY";
pub const ENV_LOG_LEVEL: &str = "NOTEPAD_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "NOTEPAD_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Authority is empty or contains a path separator.
    InvalidAuthority(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAuthority(value) => write!(f, "invalid authority `{value}`"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotepadConfig {
    pub db_path: PathBuf,
    pub authority: String,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl NotepadConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };

        let authority = value(ENV_AUTHORITY).unwrap_or_else(|| DEFAULT_AUTHORITY.to_string());
        if authority.contains('/') {
            return Err(ConfigError::InvalidAuthority(authority));
        }

        Ok(Self {
            db_path: value(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DATABASE_NAME)),
            authority,
            log_level: value(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: value(ENV_LOG_DIR).map(PathBuf::from),
        })
    }
}
