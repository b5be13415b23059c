//! Task repository

use crate::domain::entities::{Task, TaskStatus};
use propdesk_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

pub(crate) const TASK_COLUMNS: &str = "id, property_id, property, unit_id, title, description, \
     priority, status, due_date, assigned_to, created_by, completion_date, completion_file, \
     completed_by, approved_by, approved_at, rejection_reason, created_at, updated_at";

/// Optional narrowing applied in SQL before role filtering
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskQuery {
    pub property_id: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<Uuid>,
}

#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Task>> {
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        let row = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Newest first
    pub async fn list(&self, filter: TaskQuery) -> Result<Vec<Task>> {
        let query = format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE ($1::uuid IS NULL OR property_id = $1) \
               AND ($2::task_status IS NULL OR status = $2) \
               AND ($3::uuid IS NULL OR assigned_to = $3) \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, Task>(&query)
            .bind(filter.property_id)
            .bind(filter.status)
            .bind(filter.assigned_to)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
