//! Storage contract shared by every dialect

use async_trait::async_trait;

use super::DbError;
use crate::config::Dialect;
use crate::models::{NewTodo, Todo, TodoPatch};

/// Persistence for todos.
///
/// One implementation per SQL dialect. Each call acquires its own pooled
/// connection and releases it before returning, on success or error.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Which backend this store talks to
    fn dialect(&self) -> Dialect;

    /// Create the `todos` table if it does not exist. Idempotent.
    async fn initialize_schema(&self) -> Result<(), DbError>;

    /// All todos, ascending by id.
    async fn list(&self) -> Result<Vec<Todo>, DbError>;

    /// Insert a todo and return the stored row with its assigned id.
    async fn create(&self, todo: &NewTodo) -> Result<Todo, DbError>;

    async fn get(&self, id: i64) -> Result<Option<Todo>, DbError>;

    /// Overwrite the fields set in `patch`. `None` if the id does not exist.
    async fn update(&self, id: i64, patch: &TodoPatch) -> Result<Option<Todo>, DbError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, DbError>;
}
