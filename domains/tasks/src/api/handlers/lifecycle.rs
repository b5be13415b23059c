//! Task lifecycle handlers
//!
//! Each transition is computed on the loaded task, then written with a
//! compare-and-set on the status it was loaded with. The history row goes
//! into the same transaction. Notifications are written after commit.

use anyhow::Context;
use axum::{
    extract::{Path, State},
    Json,
};
use propdesk_access::{Capability, Role};
use propdesk_auth::{AuthContext, AuthUser};
use propdesk_common::{Error, Result, ValidatedJson};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::notify;
use super::tasks::load_visible_task;
use crate::api::middleware::TasksState;
use crate::domain::entities::{Task, TaskEventRecord, TaskStatus};
use crate::domain::state::TaskEvent;
use crate::repository::{
    create_task_event_tx, transition_task_tx, NewTaskEvent, Notice, NotifyKind,
};

#[derive(Debug, Default, Deserialize, Validate)]
pub struct SubmitTaskRequest {
    /// Link to a photo or document showing the finished work
    #[validate(length(min = 1, max = 2048))]
    pub completion_file: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RejectTaskRequest {
    #[validate(length(min = 1, max = 1000))]
    pub reason: String,
}

/// Assignees work their own tasks; approvers may act on any task they see.
/// Unassigned tasks can be picked up by any staff member who sees them.
fn require_worker(ctx: &AuthContext, task: &Task) -> Result<()> {
    if ctx.role() == Role::Tenant {
        return Err(Error::forbidden("work on tasks"));
    }
    match task.assigned_to {
        Some(assignee) if assignee != ctx.user.id => ctx.require(
            Capability::ApproveTaskCompletions,
            "work on tasks assigned to others",
        ),
        _ => Ok(()),
    }
}

/// Persist a transition already applied to `task` in memory
async fn persist_transition(
    state: &TasksState,
    ctx: &AuthContext,
    task: &Task,
    prior: TaskStatus,
    event: TaskEvent,
    payload: serde_json::Value,
) -> Result<Task> {
    let mut transaction = state
        .repos
        .begin()
        .await
        .context("Failed to acquire a Postgres connection from the pool")?;

    let updated = transition_task_tx(&mut transaction, task, prior).await?;
    create_task_event_tx(
        &mut transaction,
        NewTaskEvent {
            task_id: task.id,
            event_type: event.into(),
            from_status: Some(prior),
            to_status: updated.status,
            actor_id: ctx.user.id,
            payload,
        },
    )
    .await?;

    transaction
        .commit()
        .await
        .context("Failed to commit task transition")?;

    tracing::info!(
        task_id = %task.id,
        actor_id = %ctx.user.id,
        event = %event,
        from = %prior.to_state(),
        to = %updated.status.to_state(),
        "Task transition applied"
    );
    Ok(updated)
}

/// **POST /v1/tasks/{id}/start**
pub async fn start_task(
    AuthUser(ctx): AuthUser,
    State(state): State<TasksState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>> {
    let mut task = load_visible_task(&state, &ctx, id).await?;
    require_worker(&ctx, &task)?;

    let prior = task.status;
    task.start()?;
    let updated = persist_transition(
        &state,
        &ctx,
        &task,
        prior,
        TaskEvent::Start,
        serde_json::json!({}),
    )
    .await?;
    Ok(Json(updated))
}

/// **POST /v1/tasks/{id}/submit**
///
/// **Business Rules:**
/// - Allowed from Pending, In Progress and Rejected
/// - Records completion date, file and submitter; clears any rejection reason
/// - The task's creator is notified
pub async fn submit_task(
    AuthUser(ctx): AuthUser,
    State(state): State<TasksState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<SubmitTaskRequest>,
) -> Result<Json<Task>> {
    let mut task = load_visible_task(&state, &ctx, id).await?;
    require_worker(&ctx, &task)?;

    let prior = task.status;
    task.submit(ctx.user.id, req.completion_file)?;
    let payload = serde_json::json!({ "completion_file": task.completion_file });
    let updated =
        persist_transition(&state, &ctx, &task, prior, TaskEvent::Submit, payload).await?;

    if updated.created_by != ctx.user.id {
        let who = ctx.user.name.as_deref().unwrap_or(&ctx.user.email);
        notify(
            &state,
            Notice {
                user_id: updated.created_by,
                kind: NotifyKind::TaskSubmitted,
                title: "Task awaiting approval".to_string(),
                message: format!("{} submitted \"{}\"", who, updated.title),
                link: Some(format!("/tasks/{}", updated.id)),
            },
        )
        .await;
    }

    Ok(Json(updated))
}

/// **POST /v1/tasks/{id}/approve**
///
/// **Business Rules:**
/// - Approvers only
/// - Only tasks awaiting approval; Completed is final, so a second approve is 409
pub async fn approve_task(
    AuthUser(ctx): AuthUser,
    State(state): State<TasksState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>> {
    ctx.require(Capability::ApproveTaskCompletions, "approve tasks")?;
    let mut task = load_visible_task(&state, &ctx, id).await?;

    let prior = task.status;
    task.approve(ctx.user.id)?;
    let updated = persist_transition(
        &state,
        &ctx,
        &task,
        prior,
        TaskEvent::Approve,
        serde_json::json!({}),
    )
    .await?;

    if let Some(worker) = updated.completed_by.filter(|w| *w != ctx.user.id) {
        notify(
            &state,
            Notice {
                user_id: worker,
                kind: NotifyKind::TaskApproved,
                title: "Task approved".to_string(),
                message: format!("\"{}\" was approved", updated.title),
                link: Some(format!("/tasks/{}", updated.id)),
            },
        )
        .await;
    }

    Ok(Json(updated))
}

/// **POST /v1/tasks/{id}/reject**
///
/// **Business Rules:**
/// - Approvers only
/// - Sends the task back to In Progress with a reason and clears the completion
pub async fn reject_task(
    AuthUser(ctx): AuthUser,
    State(state): State<TasksState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<RejectTaskRequest>,
) -> Result<Json<Task>> {
    ctx.require(Capability::ApproveTaskCompletions, "reject tasks")?;
    let mut task = load_visible_task(&state, &ctx, id).await?;
    let worker = task.completed_by;

    let prior = task.status;
    task.reject(req.reason)?;
    let payload = serde_json::json!({ "reason": task.rejection_reason });
    let updated =
        persist_transition(&state, &ctx, &task, prior, TaskEvent::Reject, payload).await?;

    if let Some(worker) = worker.filter(|w| *w != ctx.user.id) {
        notify(
            &state,
            Notice {
                user_id: worker,
                kind: NotifyKind::TaskRejected,
                title: "Task sent back".to_string(),
                message: format!(
                    "\"{}\": {}",
                    updated.title,
                    updated.rejection_reason.as_deref().unwrap_or_default()
                ),
                link: Some(format!("/tasks/{}", updated.id)),
            },
        )
        .await;
    }

    Ok(Json(updated))
}

/// **GET /v1/tasks/{id}/events**
pub async fn list_task_events(
    AuthUser(ctx): AuthUser,
    State(state): State<TasksState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TaskEventRecord>>> {
    load_visible_task(&state, &ctx, id).await?;
    let events = state.repos.task_events.list_by_task(id).await?;
    Ok(Json(events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use propdesk_auth::AuthIdentity;

    use crate::domain::entities::TaskDraft;

    fn ctx(role: Role) -> AuthContext {
        AuthContext::new(
            AuthIdentity {
                id: Uuid::new_v4(),
                email: "someone@example.com".to_string(),
                name: None,
                role,
                assigned_property_id: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            None,
        )
    }

    fn task(assigned_to: Option<Uuid>) -> Task {
        Task::new(
            Uuid::new_v4(),
            "Riverside Lofts".to_string(),
            TaskDraft {
                title: "Clear gutters".to_string(),
                assigned_to,
                ..TaskDraft::default()
            },
            Uuid::new_v4(),
        )
        .unwrap()
    }

    #[test]
    fn test_assignee_may_work_own_task() {
        let worker = ctx(Role::Maintenance);
        assert!(require_worker(&worker, &task(Some(worker.user.id))).is_ok());
    }

    #[test]
    fn test_unassigned_task_is_open_to_staff() {
        assert!(require_worker(&ctx(Role::Contractor), &task(None)).is_ok());
    }

    #[test]
    fn test_others_task_needs_approver() {
        let assigned = task(Some(Uuid::new_v4()));
        let err = require_worker(&ctx(Role::Maintenance), &assigned).unwrap_err();
        assert!(matches!(err, Error::Authorization(_)));
        assert!(require_worker(&ctx(Role::MaintenanceLead), &assigned).is_ok());
    }

    #[test]
    fn test_tenants_never_work_tasks() {
        let tenant = ctx(Role::Tenant);
        let err = require_worker(&tenant, &task(Some(tenant.user.id))).unwrap_err();
        assert!(matches!(err, Error::Authorization(_)));
    }

    #[test]
    fn test_submit_body_is_optional_file() {
        let req: SubmitTaskRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(req.validate().is_ok());
        assert!(req.completion_file.is_none());

        let req: SubmitTaskRequest =
            serde_json::from_value(serde_json::json!({ "completion_file": "" })).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_reject_requires_reason() {
        let req: RejectTaskRequest =
            serde_json::from_value(serde_json::json!({ "reason": "" })).unwrap();
        assert!(req.validate().is_err());
        assert!(serde_json::from_value::<RejectTaskRequest>(serde_json::json!({})).is_err());
    }
}
