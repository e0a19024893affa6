pub mod auth;
pub mod error;
pub mod migrations;
pub mod models;
pub mod queries;

pub use error::{DbError, Result};
pub use models::{FollowRow, LikeRow, MessageRow, NewUser, ProfileUpdate, UserRow, UserStats};

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

/// Where a `DATABASE_URL` points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUrl {
    Memory,
    File(PathBuf),
}

impl DatabaseUrl {
    /// Accepts `sqlite::memory:`, `:memory:`, `sqlite://<path>`, `sqlite:<path>`
    /// or a bare path. Other schemes are rejected.
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(DbError::UnsupportedUrl(url.to_string()));
        }
        if url == ":memory:" || url == "sqlite::memory:" || url == "sqlite://:memory:" {
            return Ok(DatabaseUrl::Memory);
        }

        let path = if let Some(rest) = url.strip_prefix("sqlite://") {
            rest
        } else if let Some(rest) = url.strip_prefix("sqlite:") {
            rest
        } else if url.contains("://") {
            return Err(DbError::UnsupportedUrl(url.to_string()));
        } else {
            url
        };

        if path.is_empty() {
            return Err(DbError::UnsupportedUrl(url.to_string()));
        }
        Ok(DatabaseUrl::File(PathBuf::from(path)))
    }
}

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent readers from other processes
        conn.pragma_update(None, "journal_mode", "WAL")?;
        let db = Self::init(conn)?;

        info!("Database opened at {}", path.display());
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let db = Self::init(Connection::open_in_memory()?)?;
        info!("In-memory database opened");
        Ok(db)
    }

    pub fn connect(url: &str) -> Result<Self> {
        match DatabaseUrl::parse(url)? {
            DatabaseUrl::Memory => Self::open_in_memory(),
            DatabaseUrl::File(path) => Self::open(&path),
        }
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Drop every table and recreate the schema from scratch.
    pub fn reset(&self) -> Result<()> {
        self.with_conn_mut(|conn| {
            migrations::drop_all(conn)?;
            migrations::run(conn)
        })?;
        info!("Database reset");
        Ok(())
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DbError::LockPoisoned(e.to_string()))?;
        f(&conn)
    }

    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| DbError::LockPoisoned(e.to_string()))?;
        f(&mut conn)
    }
}
