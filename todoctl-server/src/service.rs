//! Todo service - validation in front of the store
//!
//! Every input is validated before the store is touched, so a
//! `ValidationError` never follows a write.

use std::sync::Arc;

use crate::db::{DbError, TodoStore};
use crate::models::{CreateTodoRequest, Todo, UpdateTodoRequest, ValidationError};

/// Service error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] DbError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// CRUD operations over todos
#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    /// All todos, ascending by id.
    pub async fn list(&self) -> Result<Vec<Todo>> {
        Ok(self.store.list().await?)
    }

    /// Validate and insert a todo.
    ///
    /// Missing description becomes `""`, missing status becomes `pending`.
    pub async fn create(&self, req: CreateTodoRequest) -> Result<Todo> {
        let new = req.validate()?;
        let todo = self.store.create(&new).await?;
        tracing::debug!(id = todo.id, "todo created");
        Ok(todo)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Todo>> {
        Ok(self.store.get(id).await?)
    }

    /// Apply a partial update.
    ///
    /// A request with no recognized field writes nothing and returns the
    /// current row. `None` means the id does not exist.
    pub async fn update(&self, id: i64, req: UpdateTodoRequest) -> Result<Option<Todo>> {
        let patch = req.validate()?;

        if patch.is_empty() {
            return self.get(id).await;
        }

        let todo = self.store.update(id, &patch).await?;
        if todo.is_some() {
            tracing::debug!(id, "todo updated");
        }
        Ok(todo)
    }

    /// Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let deleted = self.store.delete(id).await?;
        if deleted {
            tracing::debug!(id, "todo deleted");
        }
        Ok(deleted)
    }
}
