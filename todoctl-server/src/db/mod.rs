//! Database layer - connection pool, dialect stores, schema bootstrap
//!
//! # Design Principles
//!
//! - One pool per process, built at startup and passed by handle
//! - One `TodoStore` impl per SQL dialect, chosen once from config
//! - One pooled connection per operation, released on drop
//! - Rely on DB constraints as a second line behind model validation

pub mod error;
pub mod pool;
pub mod postgres;
pub mod schema;
pub mod sqlite;
pub mod store;

pub use error::DbError;
pub use pool::open_store;
pub use postgres::PgStore;
pub use schema::{bootstrap_schema, RetryPolicy};
pub use sqlite::SqliteStore;
pub use store::TodoStore;
