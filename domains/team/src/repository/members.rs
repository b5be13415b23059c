//! Team member repository

use crate::domain::entities::TeamMember;
use propdesk_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

use super::groups::map_unique;

pub(crate) const MEMBER_COLUMNS: &str = "id, user_id, group_id, email, name, phone, role, \
     linked_properties, created_at, updated_at";

#[derive(Clone)]
pub struct TeamMemberRepository {
    pool: PgPool,
}

impl TeamMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<TeamMember>> {
        let query = format!("SELECT {MEMBER_COLUMNS} FROM team_members WHERE id = $1");
        let row = sqlx::query_as::<_, TeamMember>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Option<TeamMember>> {
        let query = format!("SELECT {MEMBER_COLUMNS} FROM team_members WHERE user_id = $1");
        let row = sqlx::query_as::<_, TeamMember>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn list(&self, group_id: Option<Uuid>) -> Result<Vec<TeamMember>> {
        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM team_members \
             WHERE ($1::uuid IS NULL OR group_id = $1) \
             ORDER BY lower(email) ASC"
        );
        let rows = sqlx::query_as::<_, TeamMember>(&query)
            .bind(group_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Members linked to a property; used to address property notifications
    pub async fn list_linked_to(&self, property_id: Uuid) -> Result<Vec<TeamMember>> {
        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM team_members \
             WHERE $1 = ANY(linked_properties) ORDER BY lower(email) ASC"
        );
        let rows = sqlx::query_as::<_, TeamMember>(&query)
            .bind(property_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Insert a member; a duplicate email is `Conflict`
    pub async fn create(&self, member: &TeamMember) -> Result<TeamMember> {
        let query = format!(
            "INSERT INTO team_members ({MEMBER_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {MEMBER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, TeamMember>(&query)
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
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique)?;
        Ok(row)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM team_members WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
