//! Transaction helpers for the tasks domain

use super::maintenance::MAINTENANCE_COLUMNS;
use super::task_events::TASK_EVENT_COLUMNS;
use super::tasks::TASK_COLUMNS;
use crate::domain::entities::{
    MaintenanceRequest, Task, TaskEventRecord, TaskEventType, TaskStatus,
};
use propdesk_common::RepositoryError;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

/// Create a task within a transaction
pub async fn create_task_tx(
    tx: &mut Transaction<'_, Postgres>,
    task: &Task,
) -> Result<Task, sqlx::Error> {
    let query = format!(
        "INSERT INTO tasks ({TASK_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, \
                 $11, $12, $13, $14, $15, $16, $17, $18, $19) \
         RETURNING {TASK_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Task>(&query)
        .bind(task.id)
        .bind(task.property_id)
        .bind(&task.property)
        .bind(task.unit_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority)
        .bind(task.status)
        .bind(task.due_date)
        .bind(task.assigned_to)
        .bind(task.created_by)
        .bind(task.completion_date)
        .bind(&task.completion_file)
        .bind(task.completed_by)
        .bind(task.approved_by)
        .bind(task.approved_at)
        .bind(&task.rejection_reason)
        .bind(task.created_at)
        .bind(task.updated_at)
        .fetch_one(&mut **tx)
        .await?;
    Ok(row)
}

/// Write a lifecycle transition computed on a loaded task.
///
/// The update only applies while the stored status still equals `prior`.
/// Returns `RepositoryError::StaleWrite` when another request moved the task
/// first.
pub async fn transition_task_tx(
    tx: &mut Transaction<'_, Postgres>,
    task: &Task,
    prior: TaskStatus,
) -> Result<Task, RepositoryError> {
    let query = format!(
        "UPDATE tasks SET \
            status = $3, completion_date = $4, completion_file = $5, completed_by = $6, \
            approved_by = $7, approved_at = $8, rejection_reason = $9, updated_at = NOW() \
         WHERE id = $1 AND status = $2 \
         RETURNING {TASK_COLUMNS}"
    );
    sqlx::query_as::<_, Task>(&query)
        .bind(task.id)
        .bind(prior)
        .bind(task.status)
        .bind(task.completion_date)
        .bind(&task.completion_file)
        .bind(task.completed_by)
        .bind(task.approved_by)
        .bind(task.approved_at)
        .bind(&task.rejection_reason)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(RepositoryError::StaleWrite)
}

/// Write edited details of a task loaded while its status was `prior`.
///
/// Like `transition_task_tx`, the update only applies while the stored
/// status still equals `prior`, so an edit racing a start or a submit fails
/// with `RepositoryError::StaleWrite` instead of overwriting the new status.
pub async fn update_task_details_tx(
    tx: &mut Transaction<'_, Postgres>,
    task: &Task,
    prior: TaskStatus,
) -> Result<Task, RepositoryError> {
    let query = format!(
        "UPDATE tasks SET \
            unit_id = $3, title = $4, description = $5, priority = $6, status = $7, \
            due_date = $8, assigned_to = $9, updated_at = NOW() \
         WHERE id = $1 AND status = $2 \
         RETURNING {TASK_COLUMNS}"
    );
    sqlx::query_as::<_, Task>(&query)
        .bind(task.id)
        .bind(prior)
        .bind(task.unit_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority)
        .bind(task.status)
        .bind(task.due_date)
        .bind(task.assigned_to)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(RepositoryError::StaleWrite)
}

/// Get the next sequence number for a task's history within a transaction
pub async fn next_sequence_tx(
    tx: &mut Transaction<'_, Postgres>,
    task_id: Uuid,
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(MAX(sequence), 0) + 1 FROM task_events WHERE task_id = $1",
    )
    .bind(task_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(row)
}

/// One history row to append
#[derive(Debug, Clone)]
pub struct NewTaskEvent {
    pub task_id: Uuid,
    pub event_type: TaskEventType,
    pub from_status: Option<TaskStatus>,
    pub to_status: TaskStatus,
    pub actor_id: Uuid,
    pub payload: serde_json::Value,
}

/// Append a task event within a transaction, taking the next sequence
pub async fn create_task_event_tx(
    tx: &mut Transaction<'_, Postgres>,
    event: NewTaskEvent,
) -> Result<TaskEventRecord, sqlx::Error> {
    let sequence = next_sequence_tx(tx, event.task_id).await?;
    let query = format!(
        "INSERT INTO task_events \
            (task_id, sequence, event_type, from_status, to_status, actor_id, payload) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {TASK_EVENT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, TaskEventRecord>(&query)
        .bind(event.task_id)
        .bind(sequence)
        .bind(event.event_type)
        .bind(event.from_status)
        .bind(event.to_status)
        .bind(event.actor_id)
        .bind(sqlx::types::Json(event.payload))
        .fetch_one(&mut **tx)
        .await?;
    Ok(row)
}

/// Record the review of a maintenance request.
///
/// Only applies to requests still pending; otherwise `StaleWrite`.
pub async fn review_maintenance_request_tx(
    tx: &mut Transaction<'_, Postgres>,
    request: &MaintenanceRequest,
) -> Result<MaintenanceRequest, RepositoryError> {
    let query = format!(
        "UPDATE maintenance_requests SET \
            status = $2, reviewed_by = $3, reviewed_at = $4, rejection_reason = $5, \
            task_id = $6, updated_at = NOW() \
         WHERE id = $1 AND status = 'pending' \
         RETURNING {MAINTENANCE_COLUMNS}"
    );
    sqlx::query_as::<_, MaintenanceRequest>(&query)
        .bind(request.id)
        .bind(request.status)
        .bind(request.reviewed_by)
        .bind(request.reviewed_at)
        .bind(&request.rejection_reason)
        .bind(request.task_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(RepositoryError::StaleWrite)
}
