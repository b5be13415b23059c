//! Property repository

use crate::domain::entities::Property;
use propdesk_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

use super::map_unique;

pub(crate) const PROPERTY_COLUMNS: &str = "id, group_id, title, slug, address, description, image, \
     created_by, created_at, updated_at";

#[derive(Clone)]
pub struct PropertyRepository {
    pool: PgPool,
}

impl PropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Property>> {
        let query = format!("SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1");
        let row = sqlx::query_as::<_, Property>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Property>> {
        let query = format!("SELECT {PROPERTY_COLUMNS} FROM properties WHERE slug = $1");
        let row = sqlx::query_as::<_, Property>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// All properties, optionally within one group. Role filtering is the caller's job.
    pub async fn list(&self, group_id: Option<Uuid>) -> Result<Vec<Property>> {
        let query = format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties \
             WHERE ($1::uuid IS NULL OR group_id = $1) \
             ORDER BY title ASC"
        );
        let rows = sqlx::query_as::<_, Property>(&query)
            .bind(group_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Property>> {
        let query = format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = ANY($1) ORDER BY title ASC"
        );
        let rows = sqlx::query_as::<_, Property>(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Slugs equal to `base` or of the form `base-N`, excluding one property
    pub async fn slugs_like(&self, base: &str, exclude: Option<Uuid>) -> Result<Vec<String>> {
        let rows = sqlx::query_scalar::<_, String>(
            r#"
            SELECT slug FROM properties
            WHERE (slug = $1 OR slug LIKE $1 || '-%')
              AND ($2::uuid IS NULL OR id <> $2)
            "#,
        )
        .bind(base)
        .bind(exclude)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create(&self, property: &Property) -> Result<Property> {
        let query = format!(
            "INSERT INTO properties ({PROPERTY_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {PROPERTY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Property>(&query)
            .bind(property.id)
            .bind(property.group_id)
            .bind(&property.title)
            .bind(&property.slug)
            .bind(&property.address)
            .bind(&property.description)
            .bind(&property.image)
            .bind(property.created_by)
            .bind(property.created_at)
            .bind(property.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique)?;
        Ok(row)
    }

    /// Persist every mutable column of `property`
    pub async fn update(&self, property: &Property) -> Result<Property> {
        let query = format!(
            "UPDATE properties SET \
                group_id = $2, title = $3, slug = $4, address = $5, \
                description = $6, image = $7, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PROPERTY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Property>(&query)
            .bind(property.id)
            .bind(property.group_id)
            .bind(&property.title)
            .bind(&property.slug)
            .bind(&property.address)
            .bind(&property.description)
            .bind(&property.image)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique)?;
        Ok(row)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
