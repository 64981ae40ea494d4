//! Database error type

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The database could not be reached (pool timeout, refused connection,
    /// unreadable file). Maps to 503.
    #[error("database unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    #[error("database error: {0}")]
    Sqlx(#[source] sqlx::Error),
}

impl DbError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// SQLite primary result code for "unable to open database file"
const SQLITE_CANTOPEN: i32 = 14;

/// Database-reported errors that mean the server or file cannot be reached:
/// SQLite CANTOPEN (any extended variant), PostgreSQL class 08 (connection
/// exception), admin shutdown and cannot-connect-now.
fn is_unreachable(db: &dyn sqlx::error::DatabaseError) -> bool {
    let code = db.code();
    let code = code.as_deref().unwrap_or_default();

    if db.try_downcast_ref::<sqlx::sqlite::SqliteError>().is_some() {
        code.parse::<i32>()
            .is_ok_and(|c| c & 0xff == SQLITE_CANTOPEN)
    } else {
        code.starts_with("08") || matches!(code, "57P01" | "57P03")
    }
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        let unavailable = match &e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => true,
            sqlx::Error::Database(db) => is_unreachable(db.as_ref()),
            _ => false,
        };

        if unavailable {
            Self::Unavailable(e)
        } else {
            Self::Sqlx(e)
        }
    }
}
