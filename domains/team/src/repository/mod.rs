//! Repository implementations for the team domain

pub mod groups;
pub mod invitations;
pub mod members;
pub mod notifications;
pub mod transactions;
pub mod users;

use std::collections::HashSet;

use propdesk_common::Result;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

pub use groups::TeamGroupRepository;
pub use invitations::InvitationRepository;
pub use members::TeamMemberRepository;
pub use notifications::NotificationRepository;
pub use transactions::{
    bind_member_tx, find_member_for_user_tx, insert_member_tx, mark_invitation_accepted_tx,
    set_assigned_property_tx, set_user_role_tx, sync_member_role_tx, update_member_tx,
};
pub use users::UserRepository;

/// Combined repository access for the team domain
#[derive(Clone)]
pub struct TeamRepositories {
    pool: PgPool,
    pub users: UserRepository,
    pub groups: TeamGroupRepository,
    pub members: TeamMemberRepository,
    pub invitations: InvitationRepository,
    pub notifications: NotificationRepository,
}

impl TeamRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            groups: TeamGroupRepository::new(pool.clone()),
            members: TeamMemberRepository::new(pool.clone()),
            invitations: InvitationRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool.clone()),
            pool,
        }
    }

    /// Begin a new database transaction.
    pub async fn begin(&self) -> std::result::Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Ids in `ids` that do not name an existing property
    pub async fn unknown_properties(&self, ids: &[Uuid]) -> Result<Vec<Uuid>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let found: HashSet<Uuid> =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM properties WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .collect();
        Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
    }

    /// Titles of the given properties, for invitation emails
    pub async fn property_titles(&self, ids: &[Uuid]) -> Result<Vec<String>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let titles = sqlx::query_scalar::<_, String>(
            "SELECT title FROM properties WHERE id = ANY($1) ORDER BY title ASC",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(titles)
    }
}
