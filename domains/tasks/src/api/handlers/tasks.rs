//! Task API handlers
//!
//! Task reads are filtered by the caller's access scope; a task outside the
//! scope is reported as missing.

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use propdesk_access::{filter_tasks_by_role, Capability};
use propdesk_auth::{AuthContext, AuthUser};
use propdesk_common::{Error, Pagination, Result, ValidatedJson};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::notify;
use crate::api::middleware::TasksState;
use crate::domain::entities::{
    Task, TaskDraft, TaskEventType, TaskFormStatus, TaskPriority, TaskStatus,
};
use crate::repository::{
    create_task_event_tx, create_task_tx, update_task_details_tx, NewTaskEvent, Notice,
    NotifyKind, TaskQuery,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    pub property_id: Uuid,
    pub unit_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    pub unit_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<Uuid>,
    /// Pending, In Progress, Hold or Overdue
    pub status: Option<TaskFormStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskFilter {
    pub property_id: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<Uuid>,
}

impl From<TaskFilter> for TaskQuery {
    fn from(filter: TaskFilter) -> Self {
        TaskQuery {
            property_id: filter.property_id,
            status: filter.status,
            assigned_to: filter.assigned_to,
        }
    }
}

pub(crate) fn task_not_found() -> Error {
    Error::NotFound("Task not found".to_string())
}

/// Load a task the caller may see; hidden tasks are 404.
pub(crate) async fn load_visible_task(
    state: &TasksState,
    ctx: &AuthContext,
    id: Uuid,
) -> Result<Task> {
    let task = state
        .repos
        .tasks
        .find(id)
        .await?
        .ok_or_else(task_not_found)?;
    if !ctx.can_see_property(task.property_id) {
        return Err(task_not_found());
    }
    Ok(task)
}

/// Unit and assignee must exist, and the unit must belong to the property.
async fn check_references(
    state: &TasksState,
    property_id: Uuid,
    unit_id: Option<Uuid>,
    assigned_to: Option<Uuid>,
) -> Result<()> {
    if let Some(unit_id) = unit_id {
        if !state.repos.unit_belongs_to(unit_id, property_id).await? {
            return Err(Error::Validation(format!(
                "Unit {} does not belong to property {}",
                unit_id, property_id
            )));
        }
    }
    if let Some(user_id) = assigned_to {
        if !state.repos.user_exists(user_id).await? {
            return Err(Error::Validation(format!(
                "Assignee {} does not exist",
                user_id
            )));
        }
    }
    Ok(())
}

fn assignment_notice(task: &Task) -> Option<Notice> {
    task.assigned_to.map(|user_id| Notice {
        user_id,
        kind: NotifyKind::TaskAssigned,
        title: "New task assigned".to_string(),
        message: format!("{} at {}", task.title, task.property),
        link: Some(format!("/tasks/{}", task.id)),
    })
}

/// **GET /v1/tasks**
pub async fn list_tasks(
    AuthUser(ctx): AuthUser,
    State(state): State<TasksState>,
    Query(filter): Query<TaskFilter>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Task>>> {
    let tasks = state.repos.tasks.list(filter.into()).await?;
    let members = ctx.member.as_slice();
    let visible = filter_tasks_by_role(Some(tasks), Some(&ctx.user), Some(members));
    Ok(Json(page.apply(visible)))
}

/// **GET /v1/tasks/{id}**
pub async fn get_task(
    AuthUser(ctx): AuthUser,
    State(state): State<TasksState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>> {
    Ok(Json(load_visible_task(&state, &ctx, id).await?))
}

/// **POST /v1/tasks**
///
/// **Business Rules:**
/// - Managers and approvers only
/// - The property must be visible to the caller
/// - The property title is copied onto the task
pub async fn create_task(
    AuthUser(ctx): AuthUser,
    State(state): State<TasksState>,
    ValidatedJson(req): ValidatedJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>)> {
    ctx.require(Capability::ApproveTaskCompletions, "create tasks")?;
    ctx.require_property(req.property_id)?;

    let property_title = state
        .repos
        .property_title(req.property_id)
        .await?
        .ok_or_else(|| Error::NotFound("Property not found".to_string()))?;
    check_references(&state, req.property_id, req.unit_id, req.assigned_to).await?;

    let task = Task::new(
        req.property_id,
        property_title,
        TaskDraft {
            unit_id: req.unit_id,
            title: req.title,
            description: req.description,
            priority: req.priority.unwrap_or_default(),
            due_date: req.due_date,
            assigned_to: req.assigned_to,
        },
        ctx.user.id,
    )?;

    let mut transaction = state
        .repos
        .begin()
        .await
        .context("Failed to acquire a Postgres connection from the pool")?;

    let created = create_task_tx(&mut transaction, &task).await?;
    create_task_event_tx(
        &mut transaction,
        NewTaskEvent {
            task_id: created.id,
            event_type: TaskEventType::Created,
            from_status: None,
            to_status: created.status,
            actor_id: ctx.user.id,
            payload: serde_json::json!({}),
        },
    )
    .await?;

    transaction
        .commit()
        .await
        .context("Failed to commit task creation transaction")?;

    tracing::info!(
        task_id = %created.id,
        property_id = %created.property_id,
        created_by = %ctx.user.id,
        "Task created"
    );

    if created.assigned_to != Some(ctx.user.id) {
        if let Some(notice) = assignment_notice(&created) {
            notify(&state, notice).await;
        }
    }

    Ok((StatusCode::CREATED, Json(created)))
}

/// **PATCH /v1/tasks/{id}**
///
/// **Business Rules:**
/// - Managers and approvers only
/// - Only pending or in-progress tasks can be edited
/// - `Hold` and `Overdue` are stored as Pending
/// - The write fails with 409 if the status moved since the task was loaded
/// - A status change is recorded in the task history
pub async fn update_task(
    AuthUser(ctx): AuthUser,
    State(state): State<TasksState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateTaskRequest>,
) -> Result<Json<Task>> {
    ctx.require(Capability::ApproveTaskCompletions, "edit tasks")?;
    let mut task = load_visible_task(&state, &ctx, id).await?;
    let previous_assignee = task.assigned_to;
    let prior = task.status;

    if let Some(title) = req.title.as_deref() {
        task.title = Task::validate_title(title)?;
    }
    if req.unit_id.is_some() {
        task.unit_id = req.unit_id;
    }
    if req.description.is_some() {
        task.description = req.description;
    }
    if let Some(priority) = req.priority {
        task.priority = priority;
    }
    if req.due_date.is_some() {
        task.due_date = req.due_date;
    }
    if req.assigned_to.is_some() {
        task.assigned_to = req.assigned_to;
    }
    task.edit(req.status)?;

    check_references(&state, task.property_id, req.unit_id, req.assigned_to).await?;

    let mut transaction = state
        .repos
        .begin()
        .await
        .context("Failed to acquire a Postgres connection from the pool")?;

    let updated = update_task_details_tx(&mut transaction, &task, prior).await?;
    if let Some(event_type) = TaskEventType::for_edit(prior, updated.status) {
        create_task_event_tx(
            &mut transaction,
            NewTaskEvent {
                task_id: id,
                event_type,
                from_status: Some(prior),
                to_status: updated.status,
                actor_id: ctx.user.id,
                payload: serde_json::json!({ "edited": true }),
            },
        )
        .await?;
    }

    transaction
        .commit()
        .await
        .context("Failed to commit task update")?;

    tracing::info!(
        task_id = %id,
        from = %prior.to_state(),
        to = %updated.status.to_state(),
        "Task updated"
    );

    if updated.assigned_to != previous_assignee && updated.assigned_to != Some(ctx.user.id) {
        if let Some(notice) = assignment_notice(&updated) {
            notify(&state, notice).await;
        }
    }

    Ok(Json(updated))
}

/// **DELETE /v1/tasks/{id}**
pub async fn delete_task(
    AuthUser(ctx): AuthUser,
    State(state): State<TasksState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    ctx.require(Capability::ManageProperties, "delete tasks")?;
    load_visible_task(&state, &ctx, id).await?;

    if !state.repos.tasks.delete(id).await? {
        return Err(task_not_found());
    }
    tracing::info!(task_id = %id, deleted_by = %ctx.user.id, "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}
