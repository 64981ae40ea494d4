//! SQLite store
//!
//! No `RETURNING`: writes are followed by a read-back by id on the same
//! connection, inside one transaction.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{Connection, Sqlite, SqliteConnection, SqlitePool};

use super::{DbError, TodoStore};
use crate::config::Dialect;
use crate::models::{NewTodo, Todo, TodoPatch};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS todos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title VARCHAR(255) NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        status VARCHAR(20) NOT NULL DEFAULT 'pending'
            CHECK (status IN ('pending', 'done'))
    )
"#;

/// Todo store backed by a single SQLite file
pub struct SqliteStore {
    pool: SqlitePool,
    /// Set once `todos` is known to exist
    schema_ready: AtomicBool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            schema_ready: AtomicBool::new(false),
        }
    }

    async fn acquire(&self) -> Result<PoolConnection<Sqlite>, DbError> {
        self.pool.acquire().await.map_err(|e| {
            tracing::debug!(error = %e, "sqlite session unavailable");
            DbError::Unavailable(e)
        })
    }

    /// Acquire a scoped session. The connection returns to the pool on drop.
    ///
    /// Until the table has been created once, the session creates it first,
    /// so a startup bootstrap that gave up does not leave CRUD broken.
    async fn session(&self) -> Result<PoolConnection<Sqlite>, DbError> {
        let mut conn = self.acquire().await?;

        if !self.schema_ready.load(Ordering::Acquire) {
            sqlx::query(CREATE_TABLE)
                .execute(&mut *conn)
                .await
                .map_err(|e| {
                    tracing::warn!(error = %e, "todos table not ready");
                    DbError::Unavailable(e)
                })?;
            self.schema_ready.store(true, Ordering::Release);
            tracing::info!("todos table created on first use");
        }

        Ok(conn)
    }
}

async fn fetch_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<Todo>, DbError> {
    let todo = sqlx::query_as::<_, Todo>(
        "SELECT id, title, description, status FROM todos WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(todo)
}

#[async_trait]
impl TodoStore for SqliteStore {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn initialize_schema(&self) -> Result<(), DbError> {
        let mut conn = self.acquire().await?;
        sqlx::query(CREATE_TABLE).execute(&mut *conn).await?;
        self.schema_ready.store(true, Ordering::Release);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Todo>, DbError> {
        let mut conn = self.session().await?;

        let todos = sqlx::query_as::<_, Todo>(
            "SELECT id, title, description, status FROM todos ORDER BY id ASC",
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(todos)
    }

    async fn create(&self, todo: &NewTodo) -> Result<Todo, DbError> {
        let mut conn = self.session().await?;
        let mut tx = conn.begin().await?;

        let id = sqlx::query("INSERT INTO todos (title, description, status) VALUES (?, ?, ?)")
            .bind(todo.title.as_str())
            .bind(&todo.description)
            .bind(todo.status.as_str())
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        let created = fetch_by_id(&mut tx, id).await?.unwrap_or_else(|| Todo {
            id,
            title: todo.title.as_str().to_owned(),
            description: todo.description.clone(),
            status: todo.status,
        });

        tx.commit().await?;
        Ok(created)
    }

    async fn get(&self, id: i64) -> Result<Option<Todo>, DbError> {
        let mut conn = self.session().await?;
        fetch_by_id(&mut conn, id).await
    }

    async fn update(&self, id: i64, patch: &TodoPatch) -> Result<Option<Todo>, DbError> {
        let mut conn = self.session().await?;
        let mut tx = conn.begin().await?;

        let affected = sqlx::query(
            r#"
            UPDATE todos
            SET title = COALESCE(?, title),
                description = COALESCE(?, description),
                status = COALESCE(?, status)
            WHERE id = ?
            "#,
        )
        .bind(patch.title.as_ref().map(|t| t.as_str()))
        .bind(patch.description.as_deref())
        .bind(patch.status.map(|s| s.as_str()))
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if affected == 0 {
            return Ok(None);
        }

        let updated = fetch_by_id(&mut tx, id).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<bool, DbError> {
        let mut conn = self.session().await?;

        let affected = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::sqlite_connect_options;
    use crate::models::{TodoStatus, TodoTitle};
    use sqlx::sqlite::SqlitePoolOptions;
    use tempfile::TempDir;

    async fn store() -> (SqliteStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .connect_with(sqlite_connect_options(&dir.path().join("todos.db")))
            .await
            .unwrap();
        let store = SqliteStore::new(pool);
        store.initialize_schema().await.unwrap();
        (store, dir)
    }

    fn new_todo(title: &str) -> NewTodo {
        NewTodo {
            title: TodoTitle::new(title).unwrap(),
            description: String::new(),
            status: TodoStatus::Pending,
        }
    }

    #[tokio::test]
    async fn schema_init_is_idempotent() {
        let (store, _dir) = store().await;
        store.initialize_schema().await.unwrap();
        store.initialize_schema().await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_assigns_increasing_ids() {
        let (store, _dir) = store().await;
        let a = store.create(&new_todo("a")).await.unwrap();
        let b = store.create(&new_todo("b")).await.unwrap();
        assert!(b.id > a.id);
        assert_eq!(store.get(a.id).await.unwrap(), Some(a));
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let (store, _dir) = store().await;
        let a = store.create(&new_todo("a")).await.unwrap();
        assert!(store.delete(a.id).await.unwrap());
        let b = store.create(&new_todo("b")).await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn update_only_touches_supplied_columns() {
        let (store, _dir) = store().await;
        let mut todo = new_todo("a");
        todo.description = "keep me".into();
        let created = store.create(&todo).await.unwrap();

        let patch = TodoPatch {
            status: Some(TodoStatus::Done),
            ..TodoPatch::default()
        };
        let updated = store.update(created.id, &patch).await.unwrap().unwrap();

        assert_eq!(updated.title, "a");
        assert_eq!(updated.description, "keep me");
        assert_eq!(updated.status, TodoStatus::Done);
    }

    #[tokio::test]
    async fn update_missing_row_is_none() {
        let (store, _dir) = store().await;
        let patch = TodoPatch {
            title: Some(TodoTitle::new("x").unwrap()),
            ..TodoPatch::default()
        };
        assert_eq!(store.update(42, &patch).await.unwrap(), None);
    }

    #[tokio::test]
    async fn check_constraint_rejects_bad_status() {
        let (store, _dir) = store().await;
        let mut conn = store.session().await.unwrap();
        let result = sqlx::query("INSERT INTO todos (title, status) VALUES ('x', 'archived')")
            .execute(&mut *conn)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn unopenable_file_is_unavailable() {
        let dir = TempDir::new().unwrap();
        // Parent directory does not exist, so the file cannot be created
        let path = dir.path().join("missing").join("todos.db");
        let pool = SqlitePoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy_with(sqlite_connect_options(&path));
        let store = SqliteStore::new(pool);

        let err = store.list().await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn table_is_created_once_the_file_becomes_reachable() {
        let dir = TempDir::new().unwrap();
        let parent = dir.path().join("later");
        let pool = SqlitePoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy_with(sqlite_connect_options(&parent.join("todos.db")));
        let store = SqliteStore::new(pool);

        assert!(store.initialize_schema().await.unwrap_err().is_unavailable());

        std::fs::create_dir(&parent).unwrap();
        assert!(store.list().await.unwrap().is_empty());
        let created = store.create(&new_todo("after outage")).await.unwrap();
        assert_eq!(store.get(created.id).await.unwrap(), Some(created));
    }
}
