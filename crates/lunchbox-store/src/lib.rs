//! Lunchbox Storage Layer
//!
//! Implements the `MenuCache` trait on top of a SQLite file.
//!
//! # Architecture
//!
//! - One row per (source URL, ISO date), primary key on both
//! - The menu document is stored as JSON text next to a write timestamp
//! - Every operation opens its own connection; nothing is shared between
//!   requests, so a store value can be used from any thread
//!
//! # Examples
//!
//! ```no_run
//! use lunchbox_store::SqliteMenuCache;
//! use lunchbox_domain::MenuCache;
//!
//! let cache = SqliteMenuCache::new("menu_cache.db").unwrap();
//! let removed = cache.prune("2030-01-01").unwrap();
//! println!("pruned {removed} stale menus");
//! ```

#![warn(missing_docs)]

use chrono::Utc;
use lunchbox_domain::{MenuCache, MenuResponse};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// How long a connection waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored document could not be encoded or decoded
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// SQLite-backed menu cache
///
/// Holds only the database path. Each call to [`MenuCache`] methods opens a
/// fresh connection and closes it before returning.
#[derive(Debug, Clone)]
pub struct SqliteMenuCache {
    path: PathBuf,
}

impl SqliteMenuCache {
    /// Create a cache at the given database path, creating the schema if needed
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use lunchbox_store::SqliteMenuCache;
    ///
    /// let cache = SqliteMenuCache::new("menu_cache.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let cache = Self {
            path: path.as_ref().to_path_buf(),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Path of the underlying database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<(), StoreError> {
        let conn = self.connect()?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    /// When the entry for (url, date) was last written, as RFC 3339 UTC
    pub fn written_at(&self, url: &str, date_iso: &str) -> Result<Option<String>, StoreError> {
        let conn = self.connect()?;
        let created_at = conn
            .query_row(
                "SELECT created_at FROM menu_cache WHERE url = ?1 AND date = ?2",
                params![url, date_iso],
                |row| row.get(0),
            )
            .optional()?;
        Ok(created_at)
    }

    /// Number of cached menus
    pub fn len(&self) -> Result<usize, StoreError> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM menu_cache", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Whether the cache holds no menus
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

/// Whether the error says the cache table has not been created yet
fn is_missing_table(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("no such table")
    )
}

impl MenuCache for SqliteMenuCache {
    type Error = StoreError;

    fn prune(&self, today_iso: &str) -> Result<usize, Self::Error> {
        let conn = self.connect()?;

        // ISO dates are fixed-width, so text order is date order.
        match conn.execute("DELETE FROM menu_cache WHERE date < ?1", params![today_iso]) {
            Ok(removed) => {
                if removed > 0 {
                    info!("Pruned {} cached menus dated before {}", removed, today_iso);
                }
                Ok(removed)
            }
            Err(e) if is_missing_table(&e) => {
                debug!("Cache table missing at {}, recreating", self.path.display());
                drop(conn);
                self.initialize_schema()?;
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn get(&self, url: &str, date_iso: &str) -> Result<Option<MenuResponse>, Self::Error> {
        let conn = self.connect()?;

        let menu_json: Option<String> = conn
            .query_row(
                "SELECT menu_json FROM menu_cache WHERE url = ?1 AND date = ?2",
                params![url, date_iso],
                |row| row.get(0),
            )
            .optional()?;

        menu_json
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| {
                    StoreError::InvalidData(format!("Cached menu for {} on {}: {}", url, date_iso, e))
                })
            })
            .transpose()
    }

    fn put(&self, url: &str, date_iso: &str, menu: &MenuResponse) -> Result<(), Self::Error> {
        let menu_json = serde_json::to_string(menu)
            .map_err(|e| StoreError::InvalidData(format!("Failed to encode menu: {}", e)))?;

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO menu_cache (url, date, menu_json, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(url, date) DO UPDATE SET
             menu_json = excluded.menu_json, created_at = excluded.created_at",
            params![url, date_iso, menu_json, Utc::now().to_rfc3339()],
        )?;

        debug!("Cached {} items for {} on {}", menu.menu_items.len(), url, date_iso);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_table_detection() {
        let conn = Connection::open_in_memory().unwrap();
        let err = conn.execute("DELETE FROM menu_cache", []).unwrap_err();
        assert!(is_missing_table(&err));

        let err = conn.execute("NOT SQL", []).unwrap_err();
        assert!(!is_missing_table(&err));
    }
}
