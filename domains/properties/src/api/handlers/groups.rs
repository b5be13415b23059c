//! Property group API handlers

use std::collections::HashSet;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use propdesk_access::Capability;
use propdesk_auth::AuthUser;
use propdesk_common::{Error, Result, ValidatedJson};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::PropertiesState;
use crate::domain::entities::PropertyGroup;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateGroupRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// List property groups
///
/// **GET /v1/property-groups**
///
/// Limited-access callers only see groups that contain a property visible to them.
pub async fn list_groups(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
) -> Result<Json<Vec<PropertyGroup>>> {
    let groups = state.repos.groups.list().await?;
    let scope = ctx.scope();
    if scope.is_all() {
        return Ok(Json(groups));
    }

    let visible = scope.filter(state.repos.properties.list(None).await?);
    let group_ids: HashSet<Uuid> = visible.iter().filter_map(|p| p.group_id).collect();

    Ok(Json(
        groups
            .into_iter()
            .filter(|g| group_ids.contains(&g.id))
            .collect(),
    ))
}

/// **GET /v1/property-groups/{id}**
pub async fn get_group(
    AuthUser(_ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PropertyGroup>> {
    let group = state
        .repos
        .groups
        .find(id)
        .await?
        .ok_or_else(|| Error::NotFound("Property group not found".to_string()))?;
    Ok(Json(group))
}

/// **POST /v1/property-groups**
pub async fn create_group(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    ValidatedJson(request): ValidatedJson<CreateGroupRequest>,
) -> Result<(StatusCode, Json<PropertyGroup>)> {
    ctx.require(Capability::ManageProperties, "manage properties")?;

    let group = PropertyGroup::new(request.name, request.description, ctx.user.id)?;
    let created = state.repos.groups.create(&group).await?;

    tracing::info!(group_id = %created.id, user_id = %ctx.user.id, "Property group created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// **PATCH /v1/property-groups/{id}**
pub async fn update_group(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateGroupRequest>,
) -> Result<Json<PropertyGroup>> {
    ctx.require(Capability::ManageProperties, "manage properties")?;

    let name = request.name.as_deref().map(str::trim);
    if name.is_some_and(str::is_empty) {
        return Err(Error::Validation("Group name is required".to_string()));
    }

    let updated = state
        .repos
        .groups
        .update(id, name, request.description.as_deref())
        .await?
        .ok_or_else(|| Error::NotFound("Property group not found".to_string()))?;
    Ok(Json(updated))
}

/// Delete a group
///
/// **DELETE /v1/property-groups/{id}**
///
/// Properties in the group are kept and become ungrouped.
pub async fn delete_group(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    ctx.require(Capability::ManageProperties, "manage properties")?;

    if !state.repos.groups.delete(id).await? {
        return Err(Error::NotFound("Property group not found".to_string()));
    }
    tracing::info!(group_id = %id, user_id = %ctx.user.id, "Property group deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_group_request_validation() {
        let ok = CreateGroupRequest {
            name: "North Portfolio".to_string(),
            description: None,
        };
        assert!(ok.validate().is_ok());

        let empty = CreateGroupRequest {
            name: String::new(),
            description: None,
        };
        assert!(empty.validate().is_err());
    }
}
