//! User management API handlers
//!
//! - GET /v1/account - Current user profile with team-member record
//! - PATCH /v1/account - Update display name
//! - GET /v1/users - List users (team managers)
//! - PUT /v1/users/{id}/role - Change a user's role
//! - PUT /v1/users/{id}/assigned-property - Assign a tenant to a property

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use propdesk_access::{Capability, Role};
use propdesk_auth::AuthUser;
use propdesk_common::{Error, Pagination, Result, ValidatedJson};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::TeamState;
use crate::domain::entities::{TeamMember, UserProfile};
use crate::repository::{set_user_role_tx, sync_member_role_tx};

/// Current user plus the team-member record that scopes their data
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub team_member: Option<TeamMember>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAccountRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct AssignPropertyRequest {
    /// `null` clears the assignment
    pub property_id: Option<Uuid>,
}

/// **GET /v1/account**
pub async fn get_account(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
) -> Result<Json<AccountResponse>> {
    let user = state
        .repos
        .users
        .find(ctx.user.id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
    let team_member = state.repos.members.find_by_user(user.id).await?;

    Ok(Json(AccountResponse {
        profile: user.into(),
        team_member,
    }))
}

/// **PATCH /v1/account**
pub async fn update_account(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
    ValidatedJson(request): ValidatedJson<UpdateAccountRequest>,
) -> Result<Json<UserProfile>> {
    let name = request.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let user = state
        .repos
        .users
        .update_name(ctx.user.id, name)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
    Ok(Json(user.into()))
}

/// **GET /v1/users**
pub async fn list_users(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
    Query(query): Query<UserListQuery>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<UserProfile>>> {
    ctx.require(Capability::ManageTeamMembers, "manage team members")?;

    let users = state.repos.users.list(query.role).await?;
    Ok(Json(
        page.apply(users).into_iter().map(UserProfile::from).collect(),
    ))
}

/// Change another user's role
///
/// **PUT /v1/users/{id}/role**
///
/// The caller must be able to assign both the user's current role and the
/// new one, so nobody can promote past, or demote, their own level.
pub async fn set_user_role(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<SetRoleRequest>,
) -> Result<Json<UserProfile>> {
    ctx.require(Capability::ManageTeamMembers, "manage team members")?;

    if user_id == ctx.user.id {
        return Err(Error::Validation("You cannot change your own role".to_string()));
    }

    let target = state
        .repos
        .users
        .find(user_id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    let actor = ctx.role();
    if !actor.can_assign(target.role) || !actor.can_assign(request.role) {
        return Err(Error::forbidden("assign this role"));
    }

    let mut transaction = state
        .repos
        .begin()
        .await
        .context("Failed to acquire a Postgres connection from the pool")?;

    set_user_role_tx(&mut transaction, user_id, request.role).await?;
    sync_member_role_tx(&mut transaction, user_id, request.role).await?;

    transaction
        .commit()
        .await
        .context("Failed to commit role change")?;

    tracing::info!(
        user_id = %user_id,
        from = %target.role,
        to = %request.role,
        changed_by = %ctx.user.id,
        "User role changed"
    );

    let updated = state
        .repos
        .users
        .find(user_id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
    Ok(Json(updated.into()))
}

/// **PUT /v1/users/{id}/assigned-property**
pub async fn set_assigned_property(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<AssignPropertyRequest>,
) -> Result<Json<UserProfile>> {
    ctx.require(Capability::ManageTeamMembers, "manage team members")?;

    let target = state
        .repos
        .users
        .find(user_id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    if request.property_id.is_some() && target.role != Role::Tenant {
        return Err(Error::Validation(
            "Only tenants can be assigned to a property".to_string(),
        ));
    }

    if let Some(property_id) = request.property_id {
        if !state.repos.unknown_properties(&[property_id]).await?.is_empty() {
            return Err(Error::Validation(format!(
                "Property {} does not exist",
                property_id
            )));
        }
    }

    let updated = state
        .repos
        .users
        .set_assigned_property(user_id, request.property_id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    tracing::info!(
        user_id = %user_id,
        property_id = ?request.property_id,
        "Tenant property assignment changed"
    );
    Ok(Json(updated.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_role_request_rejects_unknown_role() {
        let ok: SetRoleRequest = serde_json::from_str(r#"{"role": "contractor"}"#).unwrap();
        assert_eq!(ok.role, Role::Contractor);
        assert!(serde_json::from_str::<SetRoleRequest>(r#"{"role": "owner"}"#).is_err());
    }

    #[test]
    fn test_assign_property_accepts_null() {
        let req: AssignPropertyRequest =
            serde_json::from_str(r#"{"property_id": null}"#).unwrap();
        assert!(req.property_id.is_none());
    }

    #[test]
    fn test_update_account_validation() {
        let req = UpdateAccountRequest {
            name: Some(String::new()),
        };
        assert!(req.validate().is_err());
    }
}
