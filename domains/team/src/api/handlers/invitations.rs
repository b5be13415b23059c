//! Invitation API handlers
//!
//! Managers invite staff by email with a role and a set of linked
//! properties. The invitee accepts from the emailed link while signed in
//! with the invited address.

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use propdesk_access::{role_display_name, Capability, Role};
use propdesk_auth::{AuthContext, AuthUser};
use propdesk_common::{Error, Result, ValidatedJson};
use propdesk_email::InvitationEmail;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::TeamState;
use crate::domain::entities::{Invitation, Notification, NotificationKind, TeamMember};
use crate::domain::state::InvitationState;
use crate::repository::{
    bind_member_tx, find_member_for_user_tx, insert_member_tx, mark_invitation_accepted_tx,
    set_assigned_property_tx, set_user_role_tx,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvitationRequest {
    #[validate(email)]
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub linked_properties: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InvitationListQuery {
    pub state: Option<InvitationState>,
}

#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub role_name: &'static str,
    pub linked_properties: Vec<Uuid>,
    pub invited_by: Uuid,
    pub state: InvitationState,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// Set on create and resend; `false` when the email could not be delivered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent: Option<bool>,
}

impl From<Invitation> for InvitationResponse {
    fn from(invitation: Invitation) -> Self {
        Self {
            state: invitation.state(),
            role_name: role_display_name(Some(invitation.role)),
            id: invitation.id,
            email: invitation.email,
            role: invitation.role,
            linked_properties: invitation.linked_properties,
            invited_by: invitation.invited_by,
            expires_at: invitation.expires_at,
            created_at: invitation.created_at,
            email_sent: None,
        }
    }
}

fn invitation_not_found() -> Error {
    Error::NotFound("Invitation not found".to_string())
}

async fn load_invitation(state: &TeamState, id: Uuid) -> Result<Invitation> {
    state
        .repos
        .invitations
        .find(id)
        .await?
        .ok_or_else(invitation_not_found)
}

fn require_addressee(ctx: &AuthContext, invitation: &Invitation) -> Result<()> {
    if invitation.is_addressed_to(&ctx.user.email) {
        Ok(())
    } else {
        Err(Error::Authorization(
            "Access denied: Invitation is for a different email".to_string(),
        ))
    }
}

/// Send the invitation email. Delivery failures are logged and reported to
/// the caller rather than failing the request; the invitation can be resent.
async fn deliver(state: &TeamState, ctx: &AuthContext, invitation: &Invitation) -> bool {
    let titles = match state
        .repos
        .property_titles(&invitation.linked_properties)
        .await
    {
        Ok(titles) => titles,
        Err(e) => {
            tracing::warn!(
                error = %e,
                invitation_id = %invitation.id,
                "Failed to load property titles"
            );
            Vec::new()
        }
    };
    let inviter_name = ctx.user.name.as_deref().unwrap_or(&ctx.user.email);

    let result = state
        .email
        .send_staff_invitation(InvitationEmail {
            invitation_id: invitation.id,
            recipient_email: &invitation.email,
            inviter_name,
            role_name: role_display_name(Some(invitation.role)),
            property_titles: &titles,
            expires_in_days: state.invitation_ttl_days,
        })
        .await;

    match result {
        Ok(receipt) => {
            tracing::info!(
                invitation_id = %invitation.id,
                message_id = %receipt.message_id,
                "Invitation email sent"
            );
            true
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                invitation_id = %invitation.id,
                "Failed to send invitation email"
            );
            false
        }
    }
}

/// Invite someone to the staff
///
/// **POST /v1/invitations**
///
/// **Business Rules:**
/// - Admin can never be granted by invitation
/// - The inviter must outrank the invited role (admins excepted)
/// - One pending invitation per email; resend the existing one instead
pub async fn create_invitation(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
    ValidatedJson(request): ValidatedJson<CreateInvitationRequest>,
) -> Result<(StatusCode, Json<InvitationResponse>)> {
    ctx.require(Capability::ManageTeamMembers, "manage team members")?;

    if request.email.trim().eq_ignore_ascii_case(&ctx.user.email) {
        return Err(Error::Validation("Cannot invite yourself".to_string()));
    }
    if request.role != Role::Admin && !ctx.role().can_assign(request.role) {
        return Err(Error::forbidden("invite members with this role"));
    }

    let unknown = state
        .repos
        .unknown_properties(&request.linked_properties)
        .await?;
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

    let invitation = Invitation::new(
        request.email,
        request.role,
        request.linked_properties,
        ctx.user.id,
        state.invitation_ttl_days,
    )?;

    if state
        .repos
        .invitations
        .find_pending_by_email(&invitation.email)
        .await?
        .is_some()
    {
        return Err(Error::Conflict(
            "A pending invitation already exists for this email".to_string(),
        ));
    }

    let created = state.repos.invitations.create(&invitation).await?;
    tracing::info!(
        invitation_id = %created.id,
        role = %created.role,
        invited_by = %ctx.user.id,
        "Invitation created"
    );

    let email_sent = deliver(&state, &ctx, &created).await;
    let mut response = InvitationResponse::from(created);
    response.email_sent = Some(email_sent);
    Ok((StatusCode::CREATED, Json(response)))
}

/// **GET /v1/invitations**
pub async fn list_invitations(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
    Query(query): Query<InvitationListQuery>,
) -> Result<Json<Vec<InvitationResponse>>> {
    ctx.require(Capability::ManageTeamMembers, "manage team members")?;

    let invitations = state.repos.invitations.list(query.state).await?;
    Ok(Json(
        invitations
            .into_iter()
            .map(InvitationResponse::from)
            .collect(),
    ))
}

/// Invitations addressed to the caller
///
/// **GET /v1/invitations/mine**
pub async fn list_my_invitations(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
) -> Result<Json<Vec<InvitationResponse>>> {
    let invitations = state
        .repos
        .invitations
        .list_for_email(&ctx.user.email)
        .await?;
    Ok(Json(
        invitations
            .into_iter()
            .map(InvitationResponse::from)
            .collect(),
    ))
}

/// **GET /v1/invitations/{id}**
///
/// Visible to team managers and to the addressee; anyone else gets 404.
pub async fn get_invitation(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvitationResponse>> {
    let invitation = load_invitation(&state, id).await?;
    if !ctx.can(Capability::ManageTeamMembers) && !invitation.is_addressed_to(&ctx.user.email) {
        return Err(invitation_not_found());
    }
    Ok(Json(invitation.into()))
}

/// **POST /v1/invitations/{id}/revoke**
pub async fn revoke_invitation(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    ctx.require(Capability::ManageTeamMembers, "manage team members")?;

    let mut invitation = load_invitation(&state, id).await?;
    invitation.revoke()?;
    state.repos.invitations.mark_revoked(id).await?;

    tracing::info!(invitation_id = %id, revoked_by = %ctx.user.id, "Invitation revoked");
    Ok(StatusCode::NO_CONTENT)
}

/// Resend the email and push the expiry out again
///
/// **POST /v1/invitations/{id}/resend**
pub async fn resend_invitation(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvitationResponse>> {
    ctx.require(Capability::ManageTeamMembers, "manage team members")?;

    let mut invitation = load_invitation(&state, id).await?;
    invitation.renew(state.invitation_ttl_days)?;
    let updated = state
        .repos
        .invitations
        .set_expiry(id, invitation.expires_at)
        .await?;

    let email_sent = deliver(&state, &ctx, &updated).await;
    let mut response = InvitationResponse::from(updated);
    response.email_sent = Some(email_sent);
    Ok(Json(response))
}

/// Accept an invitation
///
/// **POST /v1/invitations/{id}/accept**
///
/// In one transaction: the invitation is closed, the caller takes on the
/// invited role, and their team-member record is bound (or created) with the
/// invited property links. The inviter is notified afterwards.
pub async fn accept_invitation(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TeamMember>> {
    let mut invitation = load_invitation(&state, id).await?;
    require_addressee(&ctx, &invitation)?;
    invitation.accept()?;

    if ctx.role().outranks(invitation.role) {
        return Err(Error::Conflict(format!(
            "You already hold the {} role",
            role_display_name(Some(ctx.role()))
        )));
    }

    let mut transaction = state
        .repos
        .begin()
        .await
        .context("Failed to acquire a Postgres connection from the pool")?;

    mark_invitation_accepted_tx(&mut transaction, id).await?;
    set_user_role_tx(&mut transaction, ctx.user.id, invitation.role).await?;

    if invitation.role == Role::Tenant {
        if let Some(home) = invitation.linked_properties.first() {
            set_assigned_property_tx(&mut transaction, ctx.user.id, Some(*home)).await?;
        }
    }

    let member = match find_member_for_user_tx(&mut transaction, ctx.user.id, &ctx.user.email)
        .await?
    {
        Some(existing) => {
            bind_member_tx(
                &mut transaction,
                existing.id,
                ctx.user.id,
                invitation.role,
                &invitation.linked_properties,
            )
            .await?
        }
        None => {
            let mut member = TeamMember::new(
                ctx.user.email.clone(),
                ctx.user.name.clone(),
                None,
                invitation.role,
                None,
                invitation.linked_properties.clone(),
            )?;
            member.user_id = Some(ctx.user.id);
            insert_member_tx(&mut transaction, &member).await?
        }
    };

    transaction
        .commit()
        .await
        .context("Failed to commit invitation acceptance transaction")?;

    tracing::info!(
        invitation_id = %id,
        user_id = %ctx.user.id,
        role = %invitation.role,
        member_id = %member.id,
        "Invitation accepted"
    );

    let who = ctx.user.name.as_deref().unwrap_or(&ctx.user.email);
    let notification = Notification::new(
        invitation.invited_by,
        NotificationKind::InvitationAccepted,
        "Invitation accepted",
        format!(
            "{} joined as {}",
            who,
            role_display_name(Some(invitation.role))
        ),
        Some(format!("/team/{}", member.id)),
    );
    if let Err(e) = state.repos.notifications.create(&notification).await {
        tracing::warn!(error = %e, invitation_id = %id, "Failed to notify inviter");
    }

    Ok(Json(member))
}

/// **POST /v1/invitations/{id}/decline**
pub async fn decline_invitation(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let mut invitation = load_invitation(&state, id).await?;
    require_addressee(&ctx, &invitation)?;
    invitation.decline()?;
    state.repos.invitations.mark_declined(id).await?;

    tracing::info!(invitation_id = %id, user_id = %ctx.user.id, "Invitation declined");
    Ok(StatusCode::NO_CONTENT)
}
