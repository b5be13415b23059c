//! Notification API handlers. Every route is limited to the caller's own notifications.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use propdesk_auth::AuthUser;
use propdesk_common::{Error, Pagination, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::middleware::TeamState;
use crate::domain::entities::Notification;

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread: bool,
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

fn notification_not_found() -> Error {
    Error::NotFound("Notification not found".to_string())
}

/// **GET /v1/notifications**
pub async fn list_notifications(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
    Query(query): Query<NotificationQuery>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Notification>>> {
    let notifications = state
        .repos
        .notifications
        .list_for_user(ctx.user.id, query.unread, page.limit(), page.offset())
        .await?;
    Ok(Json(notifications))
}

/// **GET /v1/notifications/unread-count**
pub async fn unread_count(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
) -> Result<Json<UnreadCountResponse>> {
    let unread = state.repos.notifications.unread_count(ctx.user.id).await?;
    Ok(Json(UnreadCountResponse { unread }))
}

/// **POST /v1/notifications/{id}/read**
pub async fn mark_read(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>> {
    let notification = state
        .repos
        .notifications
        .mark_read(ctx.user.id, id)
        .await?
        .ok_or_else(notification_not_found)?;
    Ok(Json(notification))
}

/// **POST /v1/notifications/read-all**
pub async fn mark_all_read(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
) -> Result<Json<MarkAllReadResponse>> {
    let updated = state.repos.notifications.mark_all_read(ctx.user.id).await?;
    tracing::debug!(user_id = %ctx.user.id, updated, "Notifications marked read");
    Ok(Json(MarkAllReadResponse { updated }))
}

/// **DELETE /v1/notifications/{id}**
pub async fn delete_notification(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if !state.repos.notifications.delete(ctx.user.id, id).await? {
        return Err(notification_not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
