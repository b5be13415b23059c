//! Auth read-model types
//!
//! Lightweight view of the `users` row owned by the team domain, carrying
//! only what authentication and role filtering need.

use chrono::{DateTime, Utc};
use propdesk_access::{Role, Viewer};
use serde::Serialize;
use uuid::Uuid;

/// Identity of an authenticated caller
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct AuthIdentity {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    /// Property a tenant lives in; unused for staff roles
    pub assigned_property_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Viewer for AuthIdentity {
    fn viewer_id(&self) -> Uuid {
        self.id
    }

    fn viewer_email(&self) -> &str {
        &self.email
    }

    fn viewer_role(&self) -> Option<Role> {
        Some(self.role)
    }
}
