//! PostgreSQL store
//!
//! Writes use `RETURNING`, so every operation is a single round trip.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};

use super::{DbError, TodoStore};
use crate::config::Dialect;
use crate::models::{NewTodo, Todo, TodoPatch};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS todos (
        id BIGSERIAL PRIMARY KEY,
        title VARCHAR(255) NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        status VARCHAR(20) NOT NULL DEFAULT 'pending'
            CHECK (status IN ('pending', 'done'))
    )
"#;

/// Todo store backed by a PostgreSQL server
pub struct PgStore {
    pool: PgPool,
    schema_ready: AtomicBool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            schema_ready: AtomicBool::new(false),
        }
    }

    async fn acquire(&self) -> Result<PoolConnection<Postgres>, DbError> {
        self.pool.acquire().await.map_err(|e| {
            tracing::debug!(error = %e, "postgres session unavailable");
            DbError::Unavailable(e)
        })
    }

    /// Acquire a scoped session, creating `todos` first if no earlier
    /// `initialize_schema` succeeded. The connection returns to the pool on drop.
    async fn session(&self) -> Result<PoolConnection<Postgres>, DbError> {
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

#[async_trait]
impl TodoStore for PgStore {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
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

        let created = sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (title, description, status)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, status
            "#,
        )
        .bind(todo.title.as_str())
        .bind(&todo.description)
        .bind(todo.status.as_str())
        .fetch_one(&mut *conn)
        .await?;

        Ok(created)
    }

    async fn get(&self, id: i64) -> Result<Option<Todo>, DbError> {
        let mut conn = self.session().await?;

        let todo = sqlx::query_as::<_, Todo>(
            "SELECT id, title, description, status FROM todos WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(todo)
    }

    async fn update(&self, id: i64, patch: &TodoPatch) -> Result<Option<Todo>, DbError> {
        let mut conn = self.session().await?;

        let updated = sqlx::query_as::<_, Todo>(
            r#"
            UPDATE todos
            SET title = COALESCE($1, title),
                description = COALESCE($2, description),
                status = COALESCE($3, status)
            WHERE id = $4
            RETURNING id, title, description, status
            "#,
        )
        .bind(patch.title.as_ref().map(|t| t.as_str()))
        .bind(patch.description.as_deref())
        .bind(patch.status.map(|s| s.as_str()))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<bool, DbError> {
        let mut conn = self.session().await?;

        let affected = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }
}
