//! The role table
//!
//! Seven fixed roles, each with a hierarchy level and a set of capabilities.
//! The table is static: adding a capability means editing `Role::capabilities`.

use serde::{Deserialize, Serialize};

/// User role, issued at sign-up or by accepting an invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    PropertyManager,
    AssistantManager,
    MaintenanceLead,
    Maintenance,
    Contractor,
    Tenant,
}

/// Named capability sets from the role table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ManageProperties,
    ManageTeamMembers,
    ApproveTaskCompletions,
    ApproveMaintenanceRequests,
    ViewAllPages,
    FullDataAccess,
    LimitedDataAccess,
}

impl Role {
    /// Every role, highest level first
    pub const ALL: [Role; 7] = [
        Role::Admin,
        Role::PropertyManager,
        Role::AssistantManager,
        Role::MaintenanceLead,
        Role::Maintenance,
        Role::Contractor,
        Role::Tenant,
    ];

    /// Parse a wire/storage identifier such as `"property_manager"`.
    ///
    /// Unknown identifiers yield `None`; callers treat that as least privilege.
    pub fn parse(raw: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.as_str() == raw)
    }

    /// Wire/storage identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::PropertyManager => "property_manager",
            Role::AssistantManager => "assistant_manager",
            Role::MaintenanceLead => "maintenance_lead",
            Role::Maintenance => "maintenance",
            Role::Contractor => "contractor",
            Role::Tenant => "tenant",
        }
    }

    /// Position in the hierarchy; higher outranks lower
    pub fn level(&self) -> u8 {
        match self {
            Role::Admin => 7,
            Role::PropertyManager => 6,
            Role::AssistantManager => 5,
            Role::MaintenanceLead => 4,
            Role::Maintenance => 3,
            Role::Contractor => 2,
            Role::Tenant => 1,
        }
    }

    /// Capabilities granted to this role
    pub fn capabilities(&self) -> &'static [Capability] {
        use Capability::*;
        match self {
            Role::Admin | Role::PropertyManager => &[
                ManageProperties,
                ManageTeamMembers,
                ApproveTaskCompletions,
                ApproveMaintenanceRequests,
                ViewAllPages,
                FullDataAccess,
            ],
            Role::AssistantManager => &[
                ManageTeamMembers,
                ApproveTaskCompletions,
                ApproveMaintenanceRequests,
                ViewAllPages,
                FullDataAccess,
            ],
            Role::MaintenanceLead => &[
                ApproveTaskCompletions,
                ApproveMaintenanceRequests,
                LimitedDataAccess,
            ],
            Role::Maintenance | Role::Contractor | Role::Tenant => &[LimitedDataAccess],
        }
    }

    /// Check the role table for a capability
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Whether this role sits strictly above `other` in the hierarchy
    pub fn outranks(&self, other: Role) -> bool {
        self.level() > other.level()
    }

    /// Whether a user with this role may hand `target` to someone else.
    ///
    /// Admins may assign any role; everyone else only roles below their own.
    pub fn can_assign(&self, target: Role) -> bool {
        *self == Role::Admin || self.outranks(target)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| format!("unknown role '{}'", s))
    }
}
