//! SQLite persistence gateway.
//!
//! [`Database`] is a cheap, cloneable handle around one shared connection.
//! The HTTP handlers and the reminder scheduler each hold their own clone.
//! Every multi-statement write runs in a single transaction that is rolled
//! back when any step fails.

mod default_tasks;
mod events;
mod holdings;
mod reminders;
mod schema;
mod tasks;
mod template;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use directories::ProjectDirs;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};

use crate::error::{Error, Result};

pub use holdings::HoldingFilter;
pub use schema::SCHEMA;
pub use template::TemplatePolicy;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        tracing::debug!("opening database at {}", path.display());
        Self::from_connection(Connection::open(path)?)
    }

    /// Open the database in the platform data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    /// In-memory database, used by tests.
    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "event-reminder").ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine data directory",
            )
        })?;
        Ok(dirs.data_dir().join("reminder.db"))
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create missing tables and indexes. Safe to run on every start.
    pub fn migrate(&self) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
    }

    /// Run `f` with exclusive access to the underlying connection.
    pub fn with_connection<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut conn = self.conn.lock();
        f(&mut conn)
    }
}

/// Fail with [`Error::NotFound`] unless a row with `id` exists in `table`.
fn ensure_exists(conn: &Connection, table: &'static str, entity: &'static str, id: i64) -> Result<()> {
    let found = conn
        .query_row(
            &format!("SELECT 1 FROM {table} WHERE id = ?1"),
            [id],
            |_| Ok(()),
        )
        .optional()?;
    found.ok_or_else(|| Error::not_found(entity, id))
}
