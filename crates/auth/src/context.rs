//! Authorization context for authenticated users

use propdesk_access::{AccessScope, Capability, MemberLink, Role};
use propdesk_common::{Error, Result};
use uuid::Uuid;

use crate::types::AuthIdentity;

/// Represents an authenticated caller
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: AuthIdentity,
    /// The caller's team-member record, if one is linked to them
    pub member: Option<MemberLink>,
}

impl AuthContext {
    pub fn new(user: AuthIdentity, member: Option<MemberLink>) -> Self {
        Self { user, member }
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    /// Check the role table for a capability
    pub fn can(&self, capability: Capability) -> bool {
        self.user.role.has(capability)
    }

    /// Fail with 403 unless the caller's role grants `capability`
    pub fn require(&self, capability: Capability, action: &str) -> Result<()> {
        if self.can(capability) {
            Ok(())
        } else {
            tracing::debug!(
                user_id = %self.user.id,
                role = %self.user.role,
                ?capability,
                "Permission denied"
            );
            Err(Error::forbidden(action))
        }
    }

    /// Visibility scope for role-filtered reads.
    ///
    /// Team context is always supplied: a limited-access caller with no
    /// member record resolves to `Denied`.
    pub fn scope(&self) -> AccessScope {
        let members = self.member.as_slice();
        AccessScope::resolve(Some(&self.user), Some(members))
    }

    /// Whether records of `property_id` are visible to the caller
    pub fn can_see_property(&self, property_id: Uuid) -> bool {
        self.scope().allows(property_id)
    }

    /// Fail with 404 unless the property is visible.
    ///
    /// Hidden records are reported as missing so their existence is not leaked.
    pub fn require_property(&self, property_id: Uuid) -> Result<()> {
        if self.can_see_property(property_id) {
            Ok(())
        } else {
            Err(Error::NotFound("Property not found".to_string()))
        }
    }
}
