//! Property group repository

use crate::domain::entities::PropertyGroup;
use propdesk_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

const GROUP_COLUMNS: &str = "id, name, description, created_by, created_at, updated_at";

#[derive(Clone)]
pub struct PropertyGroupRepository {
    pool: PgPool,
}

impl PropertyGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<PropertyGroup>> {
        let query = format!("SELECT {GROUP_COLUMNS} FROM property_groups WHERE id = $1");
        let row = sqlx::query_as::<_, PropertyGroup>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn list(&self) -> Result<Vec<PropertyGroup>> {
        let query = format!("SELECT {GROUP_COLUMNS} FROM property_groups ORDER BY name ASC");
        let rows = sqlx::query_as::<_, PropertyGroup>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn create(&self, group: &PropertyGroup) -> Result<PropertyGroup> {
        let query = format!(
            "INSERT INTO property_groups ({GROUP_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {GROUP_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PropertyGroup>(&query)
            .bind(group.id)
            .bind(&group.name)
            .bind(&group.description)
            .bind(group.created_by)
            .bind(group.created_at)
            .bind(group.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Update name and description; `None` keeps the stored value
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<PropertyGroup>> {
        let query = format!(
            "UPDATE property_groups SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {GROUP_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PropertyGroup>(&query)
            .bind(id)
            .bind(name)
            .bind(description)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Delete a group; its properties become ungrouped
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM property_groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
