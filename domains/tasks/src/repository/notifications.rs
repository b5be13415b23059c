//! Notification writes for task and maintenance events
//!
//! The notifications table belongs to the team domain; this domain only
//! inserts rows into it.

use sqlx::PgPool;
use uuid::Uuid;

/// Kind tags understood by the `notification_kind` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    TaskAssigned,
    TaskSubmitted,
    TaskApproved,
    TaskRejected,
    MaintenanceRequested,
    MaintenanceApproved,
    MaintenanceRejected,
}

impl NotifyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotifyKind::TaskAssigned => "task_assigned",
            NotifyKind::TaskSubmitted => "task_submitted",
            NotifyKind::TaskApproved => "task_approved",
            NotifyKind::TaskRejected => "task_rejected",
            NotifyKind::MaintenanceRequested => "maintenance_requested",
            NotifyKind::MaintenanceApproved => "maintenance_approved",
            NotifyKind::MaintenanceRejected => "maintenance_rejected",
        }
    }
}

/// A notification to be written for one recipient
#[derive(Debug, Clone)]
pub struct Notice {
    pub user_id: Uuid,
    pub kind: NotifyKind,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}

#[derive(Clone)]
pub struct NotificationWriter {
    pool: PgPool,
}

impl NotificationWriter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// CQRS cross-domain write into the team domain's notifications table
    pub async fn send(&self, notice: &Notice) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, kind, title, message, link)
            VALUES ($1, $2, $3::notification_kind, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(notice.user_id)
        .bind(notice.kind.as_str())
        .bind(&notice.title)
        .bind(&notice.message)
        .bind(&notice.link)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags_match_column_values() {
        assert_eq!(NotifyKind::TaskSubmitted.as_str(), "task_submitted");
        assert_eq!(
            NotifyKind::MaintenanceRejected.as_str(),
            "maintenance_rejected"
        );
    }
}
