//! Maintenance request handlers
//!
//! Tenants file requests for the property they live in and see only their
//! own requests. Staff see requests for the properties in their scope.
//! Approving a request creates the task that carries out the work.

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use propdesk_access::{Capability, Role};
use propdesk_auth::{AuthContext, AuthUser};
use propdesk_common::{Error, Pagination, Result, ValidatedJson};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::notify;
use crate::api::middleware::TasksState;
use crate::domain::entities::{
    MaintenanceRequest, MaintenanceStatus, Task, TaskEventType, TaskPriority,
};
use crate::repository::{
    create_task_event_tx, create_task_tx, review_maintenance_request_tx, NewTaskEvent, Notice,
    NotifyKind,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMaintenanceRequest {
    /// Defaults to the tenant's assigned property
    pub property_id: Option<Uuid>,
    pub unit_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    pub priority: Option<TaskPriority>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct RejectMaintenanceRequest {
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MaintenanceFilter {
    pub property_id: Option<Uuid>,
    pub status: Option<MaintenanceStatus>,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub request: MaintenanceRequest,
    /// Task created by an approval
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
}

fn request_not_found() -> Error {
    Error::NotFound("Maintenance request not found".to_string())
}

/// Property a new request is filed against.
///
/// Tenants may only file for their assigned property; staff must name a
/// property they can see.
fn filing_property(ctx: &AuthContext, requested: Option<Uuid>) -> Result<Uuid> {
    if ctx.role() == Role::Tenant {
        let home = ctx.user.assigned_property_id.ok_or_else(|| {
            Error::Validation("You are not assigned to a property".to_string())
        })?;
        return match requested {
            Some(id) if id != home => Err(Error::forbidden(
                "file requests for properties other than your own",
            )),
            _ => Ok(home),
        };
    }
    let property_id = requested
        .ok_or_else(|| Error::Validation("property_id is required".to_string()))?;
    ctx.require_property(property_id)?;
    Ok(property_id)
}

/// Whether the caller may read this request
fn can_read(ctx: &AuthContext, request: &MaintenanceRequest) -> bool {
    if ctx.role() == Role::Tenant {
        request.requested_by == ctx.user.id
    } else {
        ctx.can_see_property(request.property_id)
    }
}

async fn load_visible_request(
    state: &TasksState,
    ctx: &AuthContext,
    id: Uuid,
) -> Result<MaintenanceRequest> {
    let request = state
        .repos
        .maintenance
        .find(id)
        .await?
        .ok_or_else(request_not_found)?;
    if !can_read(ctx, &request) {
        return Err(request_not_found());
    }
    Ok(request)
}

/// Outcome notice for the requester; `None` when they reviewed it themselves.
fn review_notice(request: &MaintenanceRequest, reviewer: Uuid) -> Option<Notice> {
    if request.requested_by == reviewer {
        return None;
    }
    let (kind, title, message) = match request.status {
        MaintenanceStatus::Approved => (
            NotifyKind::MaintenanceApproved,
            "Maintenance request approved",
            format!("\"{}\" has been scheduled", request.title),
        ),
        _ => (
            NotifyKind::MaintenanceRejected,
            "Maintenance request declined",
            match request.rejection_reason.as_deref() {
                Some(reason) => format!("\"{}\": {}", request.title, reason),
                None => format!("\"{}\" was declined", request.title),
            },
        ),
    };
    Some(Notice {
        user_id: request.requested_by,
        kind,
        title: title.to_string(),
        message,
        link: Some(format!("/maintenance-requests/{}", request.id)),
    })
}

/// **GET /v1/maintenance-requests**
pub async fn list_requests(
    AuthUser(ctx): AuthUser,
    State(state): State<TasksState>,
    Query(filter): Query<MaintenanceFilter>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<MaintenanceRequest>>> {
    let requests = if ctx.role() == Role::Tenant {
        state
            .repos
            .maintenance
            .list_by_requester(ctx.user.id)
            .await?
            .into_iter()
            .filter(|r| filter.property_id.map_or(true, |p| r.property_id == p))
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .collect()
    } else {
        let requests = state
            .repos
            .maintenance
            .list(filter.property_id, filter.status)
            .await?;
        ctx.scope().filter(requests)
    };
    Ok(Json(page.apply(requests)))
}

/// **GET /v1/maintenance-requests/{id}**
pub async fn get_request(
    AuthUser(ctx): AuthUser,
    State(state): State<TasksState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MaintenanceRequest>> {
    Ok(Json(load_visible_request(&state, &ctx, id).await?))
}

/// **POST /v1/maintenance-requests**
///
/// **Business Rules:**
/// - Tenants file for their assigned property only
/// - Full-access reviewers are notified
pub async fn create_request(
    AuthUser(ctx): AuthUser,
    State(state): State<TasksState>,
    ValidatedJson(req): ValidatedJson<CreateMaintenanceRequest>,
) -> Result<(StatusCode, Json<MaintenanceRequest>)> {
    let property_id = filing_property(&ctx, req.property_id)?;
    let property_title = state
        .repos
        .property_title(property_id)
        .await?
        .ok_or_else(|| Error::NotFound("Property not found".to_string()))?;
    if let Some(unit_id) = req.unit_id {
        if !state.repos.unit_belongs_to(unit_id, property_id).await? {
            return Err(Error::Validation(format!(
                "Unit {} does not belong to this property",
                unit_id
            )));
        }
    }

    let request = MaintenanceRequest::new(
        property_id,
        req.unit_id,
        ctx.user.id,
        req.title,
        req.description,
        req.priority.unwrap_or_default(),
    )?;
    let created = state.repos.maintenance.create(&request).await?;

    tracing::info!(
        request_id = %created.id,
        property_id = %property_id,
        requested_by = %ctx.user.id,
        "Maintenance request filed"
    );

    match state.repos.reviewer_ids().await {
        Ok(reviewers) => {
            for user_id in reviewers.into_iter().filter(|id| *id != ctx.user.id) {
                notify(
                    &state,
                    Notice {
                        user_id,
                        kind: NotifyKind::MaintenanceRequested,
                        title: "New maintenance request".to_string(),
                        message: format!("{} at {}", created.title, property_title),
                        link: Some(format!("/maintenance-requests/{}", created.id)),
                    },
                )
                .await;
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, request_id = %created.id, "Failed to load reviewers")
        }
    }

    Ok((StatusCode::CREATED, Json(created)))
}

/// **POST /v1/maintenance-requests/{id}/approve**
///
/// **Business Rules:**
/// - Reviewers only
/// - Creates a Pending task for the same property in the same transaction
pub async fn approve_request(
    AuthUser(ctx): AuthUser,
    State(state): State<TasksState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReviewResponse>> {
    ctx.require(
        Capability::ApproveMaintenanceRequests,
        "review maintenance requests",
    )?;
    let mut request = load_visible_request(&state, &ctx, id).await?;
    let property_title = state
        .repos
        .property_title(request.property_id)
        .await?
        .ok_or_else(|| Error::NotFound("Property not found".to_string()))?;

    let task = request.approve(ctx.user.id, property_title)?;

    let mut transaction = state
        .repos
        .begin()
        .await
        .context("Failed to acquire a Postgres connection from the pool")?;

    let task = create_task_tx(&mut transaction, &task).await?;
    create_task_event_tx(
        &mut transaction,
        NewTaskEvent {
            task_id: task.id,
            event_type: TaskEventType::Created,
            from_status: None,
            to_status: task.status,
            actor_id: ctx.user.id,
            payload: serde_json::json!({ "maintenance_request_id": request.id }),
        },
    )
    .await?;
    let request = review_maintenance_request_tx(&mut transaction, &request).await?;

    transaction
        .commit()
        .await
        .context("Failed to commit maintenance approval transaction")?;

    tracing::info!(
        request_id = %id,
        task_id = %task.id,
        reviewed_by = %ctx.user.id,
        "Maintenance request approved"
    );

    if let Some(notice) = review_notice(&request, ctx.user.id) {
        notify(&state, notice).await;
    }

    Ok(Json(ReviewResponse {
        request,
        task: Some(task),
    }))
}

/// **POST /v1/maintenance-requests/{id}/reject**
pub async fn reject_request(
    AuthUser(ctx): AuthUser,
    State(state): State<TasksState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<RejectMaintenanceRequest>,
) -> Result<Json<ReviewResponse>> {
    ctx.require(
        Capability::ApproveMaintenanceRequests,
        "review maintenance requests",
    )?;
    let mut request = load_visible_request(&state, &ctx, id).await?;
    request.reject(ctx.user.id, req.reason)?;

    let mut transaction = state
        .repos
        .begin()
        .await
        .context("Failed to acquire a Postgres connection from the pool")?;
    let request = review_maintenance_request_tx(&mut transaction, &request).await?;
    transaction
        .commit()
        .await
        .context("Failed to commit maintenance rejection")?;

    tracing::info!(request_id = %id, reviewed_by = %ctx.user.id, "Maintenance request rejected");

    if let Some(notice) = review_notice(&request, ctx.user.id) {
        notify(&state, notice).await;
    }

    Ok(Json(ReviewResponse {
        request,
        task: None,
    }))
}
