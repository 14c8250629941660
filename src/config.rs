//! Startup configuration. Every setting is resolved once, before any query
//! runs; a missing value aborts the whole run.

use std::path::{Path, PathBuf};

use crate::error::LitSyncError;

pub const NOTION_TOKEN_ENV: &str = "LITSYNC_NOTION_TOKEN";
pub const NOTION_DATABASE_ID_ENV: &str = "LITSYNC_NOTION_DATABASE_ID";
pub const QUERIES_FILE_ENV: &str = "LITSYNC_QUERIES_FILE";

#[derive(Debug, Clone)]
pub struct Config {
    pub notion_token: String,
    pub notion_database_id: String,
    pub queries_path: PathBuf,
}

impl Config {
    pub fn from_env(queries_override: Option<PathBuf>) -> Result<Self, LitSyncError> {
        let queries_path = match queries_override {
            Some(path) => path,
            None => PathBuf::from(required_env(QUERIES_FILE_ENV)?),
        };
        Ok(Self {
            notion_token: required_env(NOTION_TOKEN_ENV)?,
            notion_database_id: required_env(NOTION_DATABASE_ID_ENV)?,
            queries_path,
        })
    }
}

fn required_env(key: &str) -> Result<String, LitSyncError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(LitSyncError::MissingConfig(key.to_string())),
    }
}

/// Read the query list: one query per line. Blank lines and `#` comments are
/// dropped here, before the runner ever sees them.
pub fn load_queries(path: &Path) -> Result<Vec<String>, LitSyncError> {
    let contents = std::fs::read_to_string(path).map_err(|source| LitSyncError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
