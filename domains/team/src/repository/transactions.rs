//! Transactional free functions for the team domain

use crate::domain::entities::TeamMember;
use propdesk_access::Role;
use propdesk_common::RepositoryError;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::members::MEMBER_COLUMNS;

/// Change a user's role within an existing transaction.
pub async fn set_user_role_tx(
    transaction: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    role: Role,
) -> std::result::Result<(), RepositoryError> {
    let result = sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(role)
        .execute(&mut **transaction)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Mark an invitation as accepted within an existing transaction.
///
/// Returns `RepositoryError::StaleWrite` if the invitation is no longer
/// pending (closed or lapsed since it was read).
pub async fn mark_invitation_accepted_tx(
    transaction: &mut Transaction<'_, Postgres>,
    invitation_id: Uuid,
) -> std::result::Result<(), RepositoryError> {
    let result = sqlx::query(
        r#"
        UPDATE invitations
        SET accepted_at = NOW()
        WHERE id = $1
          AND accepted_at IS NULL
          AND declined_at IS NULL
          AND revoked_at IS NULL
          AND expires_at > NOW()
        "#,
    )
    .bind(invitation_id)
    .execute(&mut **transaction)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::StaleWrite);
    }
    Ok(())
}

/// Lock the member record belonging to a user: the one bound to their id,
/// else an unbound record with their email.
pub async fn find_member_for_user_tx(
    transaction: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    email: &str,
) -> std::result::Result<Option<TeamMember>, sqlx::Error> {
    let query = format!(
        "SELECT {MEMBER_COLUMNS} FROM team_members \
         WHERE user_id = $1 OR (user_id IS NULL AND lower(email) = lower($2)) \
         ORDER BY (user_id IS NULL) ASC \
         LIMIT 1 \
         FOR UPDATE"
    );
    sqlx::query_as::<_, TeamMember>(&query)
        .bind(user_id)
        .bind(email)
        .fetch_optional(&mut **transaction)
        .await
}

/// Bind a member record to a user and give it a role and property links.
pub async fn bind_member_tx(
    transaction: &mut Transaction<'_, Postgres>,
    member_id: Uuid,
    user_id: Uuid,
    role: Role,
    linked_properties: &[Uuid],
) -> std::result::Result<TeamMember, sqlx::Error> {
    let query = format!(
        "UPDATE team_members SET \
            user_id = $2, role = $3, linked_properties = $4, updated_at = NOW() \
         WHERE id = $1 RETURNING {MEMBER_COLUMNS}"
    );
    sqlx::query_as::<_, TeamMember>(&query)
        .bind(member_id)
        .bind(user_id)
        .bind(role)
        .bind(linked_properties)
        .fetch_one(&mut **transaction)
        .await
}

/// Create a member record within an existing transaction.
pub async fn insert_member_tx(
    transaction: &mut Transaction<'_, Postgres>,
    member: &TeamMember,
) -> std::result::Result<TeamMember, sqlx::Error> {
    let query = format!(
        "INSERT INTO team_members ({MEMBER_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING {MEMBER_COLUMNS}"
    );
    sqlx::query_as::<_, TeamMember>(&query)
        .bind(member.id)
        .bind(member.user_id)
        .bind(member.group_id)
        .bind(&member.email)
        .bind(&member.name)
        .bind(&member.phone)
        .bind(member.role)
        .bind(&member.linked_properties)
        .bind(member.created_at)
        .bind(member.updated_at)
        .fetch_one(&mut **transaction)
        .await
}

/// Persist the editable columns of a member within an existing transaction.
pub async fn update_member_tx(
    transaction: &mut Transaction<'_, Postgres>,
    member: &TeamMember,
) -> std::result::Result<TeamMember, sqlx::Error> {
    let query = format!(
        "UPDATE team_members SET \
            group_id = $2, name = $3, phone = $4, role = $5, \
            linked_properties = $6, updated_at = NOW() \
         WHERE id = $1 RETURNING {MEMBER_COLUMNS}"
    );
    sqlx::query_as::<_, TeamMember>(&query)
        .bind(member.id)
        .bind(member.group_id)
        .bind(&member.name)
        .bind(&member.phone)
        .bind(member.role)
        .bind(&member.linked_properties)
        .fetch_one(&mut **transaction)
        .await
}

/// Mirror a user's new role onto their bound member record, if any.
pub async fn sync_member_role_tx(
    transaction: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    role: Role,
) -> std::result::Result<(), sqlx::Error> {
    sqlx::query("UPDATE team_members SET role = $2, updated_at = NOW() WHERE user_id = $1")
        .bind(user_id)
        .bind(role)
        .execute(&mut **transaction)
        .await?;
    Ok(())
}

/// Set or clear the property a tenant lives in.
pub async fn set_assigned_property_tx(
    transaction: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    property_id: Option<Uuid>,
) -> std::result::Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE users SET assigned_property_id = $2, updated_at = NOW() WHERE id = $1",
    )
    .bind(user_id)
    .bind(property_id)
    .execute(&mut **transaction)
    .await?;
    Ok(())
}
