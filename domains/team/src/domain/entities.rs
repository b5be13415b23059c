//! Domain entities for the team domain

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::ValidateEmail;

use propdesk_access::{role_color, role_display_name, LinkedMember, Role};
use propdesk_common::{Error, Result};

use crate::domain::state::{
    InvitationEvent, InvitationGuardContext, InvitationState, InvitationStateMachine,
};

/// Account row. Created on first sign-in with the tenant role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub assigned_property_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User as shown to clients, with the role's presentation attached
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub role_name: &'static str,
    pub role_color: &'static str,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        let role = Some(user.role);
        Self {
            role_name: role_display_name(role),
            role_color: role_color(role),
            user,
        }
    }
}

/// Named group of staff, e.g. "Night shift"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TeamGroup {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TeamGroup {
    pub fn new(name: String, description: Option<String>) -> Result<Self> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(Error::Validation("Team group name is required".to_string()));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            description,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Staff record carrying the properties its holder may see
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TeamMember {
    pub id: Uuid,
    /// Bound once the member signs in or accepts an invitation
    pub user_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub linked_properties: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TeamMember {
    pub fn new(
        email: String,
        name: Option<String>,
        phone: Option<String>,
        role: Role,
        group_id: Option<Uuid>,
        linked_properties: Vec<Uuid>,
    ) -> Result<Self> {
        let email = normalize_email(&email)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id: None,
            group_id,
            email,
            name,
            phone,
            role,
            linked_properties: dedup(linked_properties),
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the linked properties, dropping duplicates
    pub fn link_properties(&mut self, properties: Vec<Uuid>) {
        self.linked_properties = dedup(properties);
    }
}

impl LinkedMember for TeamMember {
    fn member_user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    fn member_email(&self) -> &str {
        &self.email
    }

    fn linked_properties(&self) -> &[Uuid] {
        &self.linked_properties
    }
}

/// Invitation to join the staff with a given role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invitation {
    pub id: Uuid,
    pub email: String,
    /// Never `Admin`
    pub role: Role,
    pub linked_properties: Vec<Uuid>,
    pub invited_by: Uuid,
    #[serde(skip_serializing)]
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub declined_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    pub fn new(
        email: String,
        role: Role,
        linked_properties: Vec<Uuid>,
        invited_by: Uuid,
        ttl_days: i64,
    ) -> Result<Self> {
        let email = normalize_email(&email)?;
        if role == Role::Admin {
            return Err(Error::Validation(
                "Invitations cannot grant the admin role".to_string(),
            ));
        }
        if ttl_days <= 0 {
            return Err(Error::Validation(
                "Invitation lifetime must be at least one day".to_string(),
            ));
        }

        // 32 random bytes, URL-safe base64 (43 chars)
        let mut token_bytes = [0u8; 32];
        getrandom::getrandom(&mut token_bytes)
            .map_err(|e| Error::Internal(format!("Failed to generate random bytes: {}", e)))?;
        let token = URL_SAFE_NO_PAD.encode(token_bytes);

        let now = Utc::now();
        Ok(Invitation {
            id: Uuid::new_v4(),
            email,
            role,
            linked_properties: dedup(linked_properties),
            invited_by,
            token,
            expires_at: now + Duration::days(ttl_days),
            accepted_at: None,
            declined_at: None,
            revoked_at: None,
            created_at: now,
        })
    }

    /// Current state, derived from the timestamps
    pub fn state(&self) -> InvitationState {
        if self.accepted_at.is_some() {
            InvitationState::Accepted
        } else if self.declined_at.is_some() {
            InvitationState::Declined
        } else if self.revoked_at.is_some() {
            InvitationState::Revoked
        } else if self.is_expired() {
            InvitationState::Expired
        } else {
            InvitationState::Pending
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }

    /// Whether `email` is the address this invitation was sent to
    pub fn is_addressed_to(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }

    pub fn accept(&mut self) -> Result<()> {
        self.apply_transition(InvitationEvent::Accept)?;
        self.accepted_at = Some(Utc::now());
        Ok(())
    }

    pub fn decline(&mut self) -> Result<()> {
        self.apply_transition(InvitationEvent::Decline)?;
        self.declined_at = Some(Utc::now());
        Ok(())
    }

    pub fn revoke(&mut self) -> Result<()> {
        self.apply_transition(InvitationEvent::Revoke)?;
        self.revoked_at = Some(Utc::now());
        Ok(())
    }

    /// Push the expiry out again. Only untouched invitations (pending or
    /// lapsed) can be renewed.
    pub fn renew(&mut self, ttl_days: i64) -> Result<()> {
        match self.state() {
            InvitationState::Pending | InvitationState::Expired => {
                self.expires_at = Utc::now() + Duration::days(ttl_days);
                Ok(())
            }
            state => Err(Error::Conflict(format!(
                "Invitation is {} and cannot be resent",
                state
            ))),
        }
    }

    fn apply_transition(&self, event: InvitationEvent) -> Result<InvitationState> {
        let context = InvitationGuardContext {
            is_expired: self.is_expired(),
        };
        Ok(InvitationStateMachine::transition(
            self.state(),
            event,
            Some(&context),
        )?)
    }
}

/// Kind of in-app notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TaskAssigned,
    TaskSubmitted,
    TaskApproved,
    TaskRejected,
    MaintenanceRequested,
    MaintenanceApproved,
    MaintenanceRejected,
    InvitationAccepted,
}

/// In-app notification for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Client route to open, e.g. `/tasks/<id>`
    pub link: Option<String>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        link: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
            link,
            read_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(Error::Validation("Invalid email format".to_string()));
    }
    Ok(email)
}

fn dedup(mut ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.retain(|id| seen.insert(*id));
    ids
}
