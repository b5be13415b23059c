//! Unit repository

use crate::domain::entities::Unit;
use propdesk_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

use super::map_unique;

const UNIT_COLUMNS: &str =
    "id, property_id, name, floor, bedrooms, notes, created_at, updated_at";

#[derive(Clone)]
pub struct UnitRepository {
    pool: PgPool,
}

impl UnitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, property_id: Uuid, id: Uuid) -> Result<Option<Unit>> {
        let query =
            format!("SELECT {UNIT_COLUMNS} FROM units WHERE id = $1 AND property_id = $2");
        let row = sqlx::query_as::<_, Unit>(&query)
            .bind(id)
            .bind(property_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn list_by_property(&self, property_id: Uuid) -> Result<Vec<Unit>> {
        let query =
            format!("SELECT {UNIT_COLUMNS} FROM units WHERE property_id = $1 ORDER BY name ASC");
        let rows = sqlx::query_as::<_, Unit>(&query)
            .bind(property_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn create(&self, unit: &Unit) -> Result<Unit> {
        let query = format!(
            "INSERT INTO units ({UNIT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {UNIT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Unit>(&query)
            .bind(unit.id)
            .bind(unit.property_id)
            .bind(&unit.name)
            .bind(unit.floor)
            .bind(unit.bedrooms)
            .bind(&unit.notes)
            .bind(unit.created_at)
            .bind(unit.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique)?;
        Ok(row)
    }

    pub async fn update(&self, unit: &Unit) -> Result<Unit> {
        let query = format!(
            "UPDATE units SET name = $2, floor = $3, bedrooms = $4, notes = $5, updated_at = NOW() \
             WHERE id = $1 RETURNING {UNIT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Unit>(&query)
            .bind(unit.id)
            .bind(&unit.name)
            .bind(unit.floor)
            .bind(unit.bedrooms)
            .bind(&unit.notes)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique)?;
        Ok(row)
    }

    pub async fn delete(&self, property_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM units WHERE id = $1 AND property_id = $2")
            .bind(id)
            .bind(property_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
