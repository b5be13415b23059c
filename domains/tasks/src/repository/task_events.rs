//! Task event repository

use crate::domain::entities::TaskEventRecord;
use propdesk_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

pub(crate) const TASK_EVENT_COLUMNS: &str =
    "id, task_id, sequence, event_type, from_status, to_status, actor_id, payload, created_at";

#[derive(Clone)]
pub struct TaskEventRepository {
    pool: PgPool,
}

impl TaskEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// History of a task, oldest first
    pub async fn list_by_task(&self, task_id: Uuid) -> Result<Vec<TaskEventRecord>> {
        let query = format!(
            "SELECT {TASK_EVENT_COLUMNS} FROM task_events \
             WHERE task_id = $1 ORDER BY sequence ASC"
        );
        let rows = sqlx::query_as::<_, TaskEventRecord>(&query)
            .bind(task_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
