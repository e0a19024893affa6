use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// A uniqueness, not-null, foreign-key or check constraint rejected a write.
    #[error("integrity error: {0}")]
    Integrity(String),

    #[error("password must not be empty")]
    MissingPassword,

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unsupported database url: {0}")]
    UnsupportedUrl(String),

    #[error("database lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("sqlite error: {0}")]
    Sqlite(rusqlite::Error),
}

impl DbError {
    pub fn is_integrity(&self) -> bool {
        matches!(self, DbError::Integrity(_))
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(err, msg) if err.code == ErrorCode::ConstraintViolation => {
                DbError::Integrity(msg.clone().unwrap_or_else(|| err.to_string()))
            }
            _ => DbError::Sqlite(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
