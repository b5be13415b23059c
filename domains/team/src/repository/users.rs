//! User repository

use crate::domain::entities::User;
use propdesk_access::Role;
use propdesk_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

pub(crate) const USER_COLUMNS: &str =
    "id, email, name, role, assigned_property_id, created_at, updated_at";

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, user_id: Uuid) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Case-insensitive lookup
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)");
        let row = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn list(&self, role: Option<Role>) -> Result<Vec<User>> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE ($1::user_role IS NULL OR role = $1) \
             ORDER BY email ASC"
        );
        let rows = sqlx::query_as::<_, User>(&query)
            .bind(role)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn update_name(&self, user_id: Uuid, name: Option<&str>) -> Result<Option<User>> {
        let query = format!(
            "UPDATE users SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn set_assigned_property(
        &self,
        user_id: Uuid,
        property_id: Option<Uuid>,
    ) -> Result<Option<User>> {
        let query = format!(
            "UPDATE users SET assigned_property_id = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .bind(property_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
