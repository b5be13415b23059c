//! Repository implementations for the tasks domain

pub mod maintenance;
pub mod notifications;
pub mod task_events;
pub mod tasks;
pub mod transactions;

use propdesk_access::{Capability, Role};
use propdesk_common::Result;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

pub use maintenance::MaintenanceRequestRepository;
pub use notifications::{Notice, NotificationWriter, NotifyKind};
pub use task_events::TaskEventRepository;
pub use tasks::{TaskQuery, TaskRepository};
pub use transactions::{
    create_task_event_tx, create_task_tx, next_sequence_tx, review_maintenance_request_tx,
    transition_task_tx, update_task_details_tx, NewTaskEvent,
};

/// Combined repository access for the tasks domain
#[derive(Clone)]
pub struct TasksRepositories {
    pool: PgPool,
    pub tasks: TaskRepository,
    pub task_events: TaskEventRepository,
    pub maintenance: MaintenanceRequestRepository,
    pub notifications: NotificationWriter,
}

impl TasksRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            tasks: TaskRepository::new(pool.clone()),
            task_events: TaskEventRepository::new(pool.clone()),
            maintenance: MaintenanceRequestRepository::new(pool.clone()),
            notifications: NotificationWriter::new(pool.clone()),
            pool,
        }
    }

    /// Begin a new database transaction.
    pub async fn begin(&self) -> std::result::Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Current title of a property, `None` if it does not exist
    pub async fn property_title(&self, property_id: Uuid) -> Result<Option<String>> {
        let title = sqlx::query_scalar::<_, String>("SELECT title FROM properties WHERE id = $1")
            .bind(property_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(title)
    }

    /// Whether `unit_id` is a unit of `property_id`
    pub async fn unit_belongs_to(&self, unit_id: Uuid, property_id: Uuid) -> Result<bool> {
        let found = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM units WHERE id = $1 AND property_id = $2)",
        )
        .bind(unit_id)
        .bind(property_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(found)
    }

    pub async fn user_exists(&self, user_id: Uuid) -> Result<bool> {
        let found =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(found)
    }

    /// Users who review maintenance requests for every property
    pub async fn reviewer_ids(&self) -> Result<Vec<Uuid>> {
        let roles: Vec<&str> = Role::ALL
            .iter()
            .filter(|r| r.has(Capability::ApproveMaintenanceRequests))
            .filter(|r| r.has(Capability::FullDataAccess))
            .map(Role::as_str)
            .collect();
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE role::text = ANY($1)")
            .bind(roles)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }
}
