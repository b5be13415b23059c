//! Team group API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use propdesk_access::Capability;
use propdesk_auth::{AuthUser, ManagerUser};
use propdesk_common::{Error, Result, ValidatedJson};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::TeamState;
use crate::domain::entities::TeamGroup;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeamGroupRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTeamGroupRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

fn group_not_found() -> Error {
    Error::NotFound("Team group not found".to_string())
}

/// **GET /v1/team-groups**
pub async fn list_groups(
    ManagerUser(_ctx): ManagerUser,
    State(state): State<TeamState>,
) -> Result<Json<Vec<TeamGroup>>> {
    Ok(Json(state.repos.groups.list().await?))
}

/// **GET /v1/team-groups/{id}**
pub async fn get_group(
    ManagerUser(_ctx): ManagerUser,
    State(state): State<TeamState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TeamGroup>> {
    let group = state.repos.groups.find(id).await?.ok_or_else(group_not_found)?;
    Ok(Json(group))
}

/// **POST /v1/team-groups**
///
/// Group names are unique; a duplicate is a 409.
pub async fn create_group(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
    ValidatedJson(request): ValidatedJson<CreateTeamGroupRequest>,
) -> Result<(StatusCode, Json<TeamGroup>)> {
    ctx.require(Capability::ManageTeamMembers, "manage team members")?;

    let group = TeamGroup::new(request.name, request.description)?;
    let created = state.repos.groups.create(&group).await?;

    tracing::info!(team_group_id = %created.id, user_id = %ctx.user.id, "Team group created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// **PATCH /v1/team-groups/{id}**
pub async fn update_group(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateTeamGroupRequest>,
) -> Result<Json<TeamGroup>> {
    ctx.require(Capability::ManageTeamMembers, "manage team members")?;

    let name = request.name.as_deref().map(str::trim);
    if name.is_some_and(str::is_empty) {
        return Err(Error::Validation("Team group name is required".to_string()));
    }

    let updated = state
        .repos
        .groups
        .update(id, name, request.description.as_deref())
        .await?
        .ok_or_else(group_not_found)?;
    Ok(Json(updated))
}

/// **DELETE /v1/team-groups/{id}**
///
/// Members of the group stay on the team, ungrouped.
pub async fn delete_group(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    ctx.require(Capability::ManageTeamMembers, "manage team members")?;

    if !state.repos.groups.delete(id).await? {
        return Err(group_not_found());
    }
    tracing::info!(team_group_id = %id, user_id = %ctx.user.id, "Team group deleted");
    Ok(StatusCode::NO_CONTENT)
}
