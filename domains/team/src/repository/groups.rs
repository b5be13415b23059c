//! Team group repository

use crate::domain::entities::TeamGroup;
use propdesk_common::{RepositoryError, Result};
use sqlx::PgPool;
use uuid::Uuid;

const GROUP_COLUMNS: &str = "id, name, description, created_at, updated_at";

#[derive(Clone)]
pub struct TeamGroupRepository {
    pool: PgPool,
}

impl TeamGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<TeamGroup>> {
        let query = format!("SELECT {GROUP_COLUMNS} FROM team_groups WHERE id = $1");
        let row = sqlx::query_as::<_, TeamGroup>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn list(&self) -> Result<Vec<TeamGroup>> {
        let query = format!("SELECT {GROUP_COLUMNS} FROM team_groups ORDER BY name ASC");
        let rows = sqlx::query_as::<_, TeamGroup>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn create(&self, group: &TeamGroup) -> Result<TeamGroup> {
        let query = format!(
            "INSERT INTO team_groups ({GROUP_COLUMNS}) VALUES ($1, $2, $3, $4, $5) \
             RETURNING {GROUP_COLUMNS}"
        );
        let row = sqlx::query_as::<_, TeamGroup>(&query)
            .bind(group.id)
            .bind(&group.name)
            .bind(&group.description)
            .bind(group.created_at)
            .bind(group.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique)?;
        Ok(row)
    }

    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<TeamGroup>> {
        let query = format!(
            "UPDATE team_groups SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {GROUP_COLUMNS}"
        );
        let row = sqlx::query_as::<_, TeamGroup>(&query)
            .bind(id)
            .bind(name)
            .bind(description)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_unique)?;
        Ok(row)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM team_groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub(crate) fn map_unique(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => RepositoryError::AlreadyExists,
        _ => RepositoryError::from(e),
    }
}
