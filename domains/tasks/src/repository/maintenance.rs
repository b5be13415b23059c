//! Maintenance request repository

use crate::domain::entities::{MaintenanceRequest, MaintenanceStatus};
use propdesk_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

pub(crate) const MAINTENANCE_COLUMNS: &str = "id, property_id, unit_id, requested_by, title, \
     description, priority, status, reviewed_by, reviewed_at, rejection_reason, task_id, \
     created_at, updated_at";

#[derive(Clone)]
pub struct MaintenanceRequestRepository {
    pool: PgPool,
}

impl MaintenanceRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<MaintenanceRequest>> {
        let query = format!("SELECT {MAINTENANCE_COLUMNS} FROM maintenance_requests WHERE id = $1");
        let row = sqlx::query_as::<_, MaintenanceRequest>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Newest first
    pub async fn list(
        &self,
        property_id: Option<Uuid>,
        status: Option<MaintenanceStatus>,
    ) -> Result<Vec<MaintenanceRequest>> {
        let query = format!(
            "SELECT {MAINTENANCE_COLUMNS} FROM maintenance_requests \
             WHERE ($1::uuid IS NULL OR property_id = $1) \
               AND ($2::maintenance_status IS NULL OR status = $2) \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, MaintenanceRequest>(&query)
            .bind(property_id)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Requests filed by one user, newest first
    pub async fn list_by_requester(&self, user_id: Uuid) -> Result<Vec<MaintenanceRequest>> {
        let query = format!(
            "SELECT {MAINTENANCE_COLUMNS} FROM maintenance_requests \
             WHERE requested_by = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, MaintenanceRequest>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn create(&self, request: &MaintenanceRequest) -> Result<MaintenanceRequest> {
        let query = format!(
            "INSERT INTO maintenance_requests ({MAINTENANCE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {MAINTENANCE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, MaintenanceRequest>(&query)
            .bind(request.id)
            .bind(request.property_id)
            .bind(request.unit_id)
            .bind(request.requested_by)
            .bind(&request.title)
            .bind(&request.description)
            .bind(request.priority)
            .bind(request.status)
            .bind(request.reviewed_by)
            .bind(request.reviewed_at)
            .bind(&request.rejection_reason)
            .bind(request.task_id)
            .bind(request.created_at)
            .bind(request.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }
}
