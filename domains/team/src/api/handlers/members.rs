//! Team member API handlers
//!
//! A member record's `linked_properties` decide what a limited-access user
//! sees, so every write here is gated on managing team members and on the
//! caller outranking the role involved.

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use propdesk_access::{Capability, Role};
use propdesk_auth::{AuthContext, AuthUser};
use propdesk_common::{Error, Pagination, Result, ValidatedJson};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::TeamState;
use crate::domain::entities::TeamMember;
use crate::repository::{set_user_role_tx, update_member_tx};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMemberRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    pub role: Role,
    pub group_id: Option<Uuid>,
    #[serde(default)]
    pub linked_properties: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMemberRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub group_id: Option<Uuid>,
    pub linked_properties: Option<Vec<Uuid>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MemberListQuery {
    pub group_id: Option<Uuid>,
    /// Only members linked to this property
    pub property_id: Option<Uuid>,
}

fn member_not_found() -> Error {
    Error::NotFound("Team member not found".to_string())
}

fn require_assignable(ctx: &AuthContext, role: Role) -> Result<()> {
    if ctx.role().can_assign(role) {
        Ok(())
    } else {
        Err(Error::forbidden("manage members with this role"))
    }
}

async fn check_links(state: &TeamState, group_id: Option<Uuid>, links: &[Uuid]) -> Result<()> {
    if let Some(group_id) = group_id {
        if state.repos.groups.find(group_id).await?.is_none() {
            return Err(Error::Validation(format!(
                "Team group {} does not exist",
                group_id
            )));
        }
    }
    let unknown = state.repos.unknown_properties(links).await?;
    if !unknown.is_empty() {
        return Err(Error::Validation(format!(
            "Unknown properties: {}",
            unknown
                .iter()
                .map(Uuid::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }
    Ok(())
}

/// **GET /v1/team-members**
pub async fn list_members(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
    Query(query): Query<MemberListQuery>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<TeamMember>>> {
    ctx.require(Capability::ViewAllPages, "view the team")?;

    let members = match query.property_id {
        Some(property_id) => state
            .repos
            .members
            .list_linked_to(property_id)
            .await?
            .into_iter()
            .filter(|m| query.group_id.is_none() || m.group_id == query.group_id)
            .collect(),
        None => state.repos.members.list(query.group_id).await?,
    };
    Ok(Json(page.apply(members)))
}

/// The caller's own member record
///
/// **GET /v1/team-members/me**
pub async fn get_my_member(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
) -> Result<Json<TeamMember>> {
    let member = match &ctx.member {
        Some(link) => state.repos.members.find(link.id).await?,
        None => None,
    };
    Ok(Json(member.ok_or_else(member_not_found)?))
}

/// **GET /v1/team-members/{id}**
pub async fn get_member(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TeamMember>> {
    let own = ctx.member.as_ref().is_some_and(|m| m.id == id);
    if !own {
        ctx.require(Capability::ViewAllPages, "view the team")?;
    }
    let member = state.repos.members.find(id).await?.ok_or_else(member_not_found)?;
    Ok(Json(member))
}

/// Add a staff member ahead of their first sign-in
///
/// **POST /v1/team-members**
///
/// The record binds to an account when someone signs in with the same email.
pub async fn create_member(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
    ValidatedJson(request): ValidatedJson<CreateMemberRequest>,
) -> Result<(StatusCode, Json<TeamMember>)> {
    ctx.require(Capability::ManageTeamMembers, "manage team members")?;
    require_assignable(&ctx, request.role)?;
    check_links(&state, request.group_id, &request.linked_properties).await?;

    let member = TeamMember::new(
        request.email,
        request.name,
        request.phone,
        request.role,
        request.group_id,
        request.linked_properties,
    )?;
    let created = state.repos.members.create(&member).await?;

    tracing::info!(
        member_id = %created.id,
        role = %created.role,
        linked = created.linked_properties.len(),
        "Team member created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// **PATCH /v1/team-members/{id}**
///
/// A role change on a member bound to an account changes the account's role too.
pub async fn update_member(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateMemberRequest>,
) -> Result<Json<TeamMember>> {
    ctx.require(Capability::ManageTeamMembers, "manage team members")?;

    let mut member = state.repos.members.find(id).await?.ok_or_else(member_not_found)?;
    require_assignable(&ctx, member.role)?;

    let role_change = request.role.filter(|r| *r != member.role);
    if let Some(role) = role_change {
        if member.user_id == Some(ctx.user.id) {
            return Err(Error::Validation("You cannot change your own role".to_string()));
        }
        require_assignable(&ctx, role)?;
        member.role = role;
    }

    if request.group_id.is_some() {
        member.group_id = request.group_id;
    }
    if let Some(links) = request.linked_properties {
        member.link_properties(links);
    }
    check_links(&state, request.group_id, &member.linked_properties).await?;

    if let Some(name) = request.name {
        member.name = Some(name);
    }
    if let Some(phone) = request.phone {
        member.phone = Some(phone);
    }

    let mut transaction = state
        .repos
        .begin()
        .await
        .context("Failed to acquire a Postgres connection from the pool")?;

    let updated = update_member_tx(&mut transaction, &member).await?;
    if let (Some(role), Some(user_id)) = (role_change, updated.user_id) {
        set_user_role_tx(&mut transaction, user_id, role).await?;
    }

    transaction
        .commit()
        .await
        .context("Failed to commit team member update")?;

    Ok(Json(updated))
}

/// **DELETE /v1/team-members/{id}**
///
/// The account, if any, keeps its role but loses its property links.
pub async fn delete_member(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    ctx.require(Capability::ManageTeamMembers, "manage team members")?;

    let member = state.repos.members.find(id).await?.ok_or_else(member_not_found)?;
    if member.user_id == Some(ctx.user.id) {
        return Err(Error::Validation(
            "You cannot remove your own team member record".to_string(),
        ));
    }
    require_assignable(&ctx, member.role)?;

    if !state.repos.members.delete(id).await? {
        return Err(member_not_found());
    }
    tracing::info!(member_id = %id, removed_by = %ctx.user.id, "Team member removed");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_member_request_validation() {
        let request: CreateMemberRequest = serde_json::from_value(serde_json::json!({
            "email": "fixit@example.com",
            "role": "contractor"
        }))
        .unwrap();
        assert!(request.validate().is_ok());
        assert!(request.linked_properties.is_empty());

        let request: CreateMemberRequest = serde_json::from_value(serde_json::json!({
            "email": "not an email",
            "role": "contractor"
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_member_request_is_partial() {
        let request: UpdateMemberRequest =
            serde_json::from_value(serde_json::json!({ "linked_properties": [] })).unwrap();
        assert!(request.role.is_none());
        assert_eq!(request.linked_properties, Some(vec![]));
    }
}
