//! Invitation repository

use crate::domain::entities::Invitation;
use crate::domain::state::InvitationState;
use chrono::{DateTime, Utc};
use propdesk_common::{RepositoryError, Result};
use sqlx::PgPool;
use uuid::Uuid;

pub(crate) const INVITATION_COLUMNS: &str = "id, email, role, linked_properties, invited_by, \
     token, expires_at, accepted_at, declined_at, revoked_at, created_at";

/// Untouched: not accepted, declined or revoked
const OPEN: &str = "accepted_at IS NULL AND declined_at IS NULL AND revoked_at IS NULL";

#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Invitation>> {
        let query = format!("SELECT {INVITATION_COLUMNS} FROM invitations WHERE id = $1");
        let row = sqlx::query_as::<_, Invitation>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Latest pending invitation for an address
    pub async fn find_pending_by_email(&self, email: &str) -> Result<Option<Invitation>> {
        let query = format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations \
             WHERE lower(email) = lower($1) AND {OPEN} AND expires_at > NOW() \
             ORDER BY created_at DESC LIMIT 1"
        );
        let row = sqlx::query_as::<_, Invitation>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Invitations addressed to `email`, newest first
    pub async fn list_for_email(&self, email: &str) -> Result<Vec<Invitation>> {
        let query = format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations \
             WHERE lower(email) = lower($1) ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, Invitation>(&query)
            .bind(email)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// All invitations, optionally filtered by derived state
    pub async fn list(&self, state: Option<InvitationState>) -> Result<Vec<Invitation>> {
        let condition = match state {
            None => "TRUE".to_string(),
            Some(InvitationState::Pending) => format!("{OPEN} AND expires_at > NOW()"),
            Some(InvitationState::Expired) => format!("{OPEN} AND expires_at <= NOW()"),
            Some(InvitationState::Accepted) => "accepted_at IS NOT NULL".to_string(),
            Some(InvitationState::Declined) => "declined_at IS NOT NULL".to_string(),
            Some(InvitationState::Revoked) => "revoked_at IS NOT NULL".to_string(),
        };
        let query = format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE {condition} \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, Invitation>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn create(&self, invitation: &Invitation) -> Result<Invitation> {
        let query = format!(
            "INSERT INTO invitations ({INVITATION_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {INVITATION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Invitation>(&query)
            .bind(invitation.id)
            .bind(&invitation.email)
            .bind(invitation.role)
            .bind(&invitation.linked_properties)
            .bind(invitation.invited_by)
            .bind(&invitation.token)
            .bind(invitation.expires_at)
            .bind(invitation.accepted_at)
            .bind(invitation.declined_at)
            .bind(invitation.revoked_at)
            .bind(invitation.created_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Invitee-initiated. Fails with `StaleWrite` if the invitation was
    /// closed in the meantime.
    pub async fn mark_declined(&self, id: Uuid) -> Result<()> {
        self.close(id, "declined_at").await
    }

    /// Manager-initiated. Fails with `StaleWrite` if the invitation was
    /// closed in the meantime.
    pub async fn mark_revoked(&self, id: Uuid) -> Result<()> {
        self.close(id, "revoked_at").await
    }

    async fn close(&self, id: Uuid, column: &'static str) -> Result<()> {
        let query =
            format!("UPDATE invitations SET {column} = NOW() WHERE id = $1 AND {OPEN}");
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::StaleWrite.into());
        }
        Ok(())
    }

    pub async fn set_expiry(&self, id: Uuid, expires_at: DateTime<Utc>) -> Result<Invitation> {
        let query = format!(
            "UPDATE invitations SET expires_at = $2 WHERE id = $1 AND {OPEN} \
             RETURNING {INVITATION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Invitation>(&query)
            .bind(id)
            .bind(expires_at)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::StaleWrite)?;
        Ok(row)
    }
}
