use anyhow::{Context as _, Result};
use chrono::Utc;
use serde::Serialize;
use sqlx::{sqlite::SqliteConnectOptions, ConnectOptions, SqlitePool};
use std::{path::Path, str::FromStr};
use uuid::Uuid;

use crate::tasks::{Priority, TaskFilter, TaskSort};

/// A persisted task record. Serializes with the wire field names.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRow {
    pub id: i64,
    pub public_id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    /// RFC 3339, NULL when the task has no due date.
    pub due_date: Option<String>,
    pub is_completed: bool,
    pub is_critical: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(data_dir: &Path) -> Result<Self> {
        Self::new_with_slow_query(data_dir, 0).await
    }

    /// Create storage with slow-query logging enabled.
    ///
    /// `slow_query_ms` is the threshold in milliseconds — queries exceeding it
    /// are logged at WARN level. Set to 0 to disable slow-query logging.
    pub async fn new_with_slow_query(data_dir: &Path, slow_query_ms: u64) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let db_path = data_dir.join("taskd.db");
        let mut opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);

        if slow_query_ms > 0 {
            opts = opts.log_slow_statements(
                log::LevelFilter::Warn,
                std::time::Duration::from_millis(slow_query_ms),
            );
        }

        let pool = SqlitePool::connect_with(opts).await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> Result<()> {
        sqlx::migrate!("src/storage/migrations")
            .run(pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    // ─── Tasks ──────────────────────────────────────────────────────────────

    /// Insert a task and return the stored record with its server-assigned
    /// id, public id, and timestamps. `priority` must already be derived from
    /// the inserted state.
    pub async fn create_task(
        &self,
        title: &str,
        description: Option<&str>,
        due_date: Option<&str>,
        is_critical: bool,
        priority: Priority,
    ) -> Result<TaskRow> {
        let public_id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO tasks
             (public_id, title, description, priority, due_date, is_completed, is_critical, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, 0, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(title)
        .bind(description)
        .bind(priority.as_str())
        .bind(due_date)
        .bind(is_critical)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        self.get_task(result.last_insert_rowid())
            .await?
            .ok_or_else(|| anyhow::anyhow!("task not found after insert"))
    }

    pub async fn get_task(&self, id: i64) -> Result<Option<TaskRow>> {
        Ok(sqlx::query_as("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// List tasks under the resolved query policy. The fragments are static;
    /// the filter value is always a bound parameter.
    pub async fn list_tasks(&self, filter: &TaskFilter, sort: TaskSort) -> Result<Vec<TaskRow>> {
        let sql = format!(
            "SELECT * FROM tasks{}{}",
            filter.where_sql(),
            sort.order_sql()
        );
        let query = sqlx::query_as(&sql);
        let query = match filter {
            TaskFilter::Completed(done) => query.bind(*done),
            TaskFilter::Priority(label) => query.bind(label.clone()),
            TaskFilter::All => query,
        };
        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Rewrite the mutable columns of a task. The caller merges the requested
    /// changes into the stored state and re-derives `priority` first.
    pub async fn update_task(
        &self,
        id: i64,
        title: &str,
        description: Option<&str>,
        due_date: Option<&str>,
        is_completed: bool,
        is_critical: bool,
        priority: Priority,
    ) -> Result<TaskRow> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE tasks
             SET title = ?, description = ?, due_date = ?, is_completed = ?, is_critical = ?,
                 priority = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(title)
        .bind(description)
        .bind(due_date)
        .bind(is_completed)
        .bind(is_critical)
        .bind(priority.as_str())
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        self.get_task(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("task not found after update"))
    }

    /// Delete a task. Returns `true` if a row was removed, `false` when the
    /// id did not exist.
    pub async fn delete_task(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
