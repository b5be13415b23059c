//! Suite repository

use crate::domain::entities::Suite;
use propdesk_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

use super::map_unique;

const SUITE_COLUMNS: &str =
    "id, property_id, name, square_feet, occupant, created_at, updated_at";

#[derive(Clone)]
pub struct SuiteRepository {
    pool: PgPool,
}

impl SuiteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, property_id: Uuid, id: Uuid) -> Result<Option<Suite>> {
        let query =
            format!("SELECT {SUITE_COLUMNS} FROM suites WHERE id = $1 AND property_id = $2");
        let row = sqlx::query_as::<_, Suite>(&query)
            .bind(id)
            .bind(property_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn list_by_property(&self, property_id: Uuid) -> Result<Vec<Suite>> {
        let query =
            format!("SELECT {SUITE_COLUMNS} FROM suites WHERE property_id = $1 ORDER BY name ASC");
        let rows = sqlx::query_as::<_, Suite>(&query)
            .bind(property_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn create(&self, suite: &Suite) -> Result<Suite> {
        let query = format!(
            "INSERT INTO suites ({SUITE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {SUITE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Suite>(&query)
            .bind(suite.id)
            .bind(suite.property_id)
            .bind(&suite.name)
            .bind(suite.square_feet)
            .bind(&suite.occupant)
            .bind(suite.created_at)
            .bind(suite.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique)?;
        Ok(row)
    }

    pub async fn update(&self, suite: &Suite) -> Result<Suite> {
        let query = format!(
            "UPDATE suites SET name = $2, square_feet = $3, occupant = $4, updated_at = NOW() \
             WHERE id = $1 RETURNING {SUITE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Suite>(&query)
            .bind(suite.id)
            .bind(&suite.name)
            .bind(suite.square_feet)
            .bind(&suite.occupant)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique)?;
        Ok(row)
    }

    pub async fn delete(&self, property_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM suites WHERE id = $1 AND property_id = $2")
            .bind(id)
            .bind(property_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
