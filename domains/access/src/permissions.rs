//! Permission predicates
//!
//! Total functions over `Option<Role>`. `None` stands for a missing or
//! unrecognized role and always gets the least-privileged answer.

use crate::roles::{Capability, Role};

/// Display name used when the role is unknown
pub const DEFAULT_ROLE_DISPLAY_NAME: &str = "User";

/// Badge color used when the role is unknown
pub const DEFAULT_ROLE_COLOR: &str = "#6b7280";

fn grants(role: Option<Role>, capability: Capability) -> bool {
    role.is_some_and(|r| r.has(capability))
}

pub fn can_approve_task_completions(role: Option<Role>) -> bool {
    grants(role, Capability::ApproveTaskCompletions)
}

pub fn can_manage_properties(role: Option<Role>) -> bool {
    grants(role, Capability::ManageProperties)
}

pub fn can_manage_team_members(role: Option<Role>) -> bool {
    grants(role, Capability::ManageTeamMembers)
}

pub fn can_view_all_pages(role: Option<Role>) -> bool {
    grants(role, Capability::ViewAllPages)
}

pub fn can_approve_maintenance_request(role: Option<Role>) -> bool {
    grants(role, Capability::ApproveMaintenanceRequests)
}

pub fn is_tenant(role: Option<Role>) -> bool {
    role == Some(Role::Tenant)
}

/// Sees every record without filtering
pub fn has_full_access(role: Option<Role>) -> bool {
    grants(role, Capability::FullDataAccess)
}

/// Sees only records tied to their linked properties
pub fn has_limited_access(role: Option<Role>) -> bool {
    grants(role, Capability::LimitedDataAccess)
}

/// Human-readable role name
pub fn role_display_name(role: Option<Role>) -> &'static str {
    match role {
        Some(Role::Admin) => "Administrator",
        Some(Role::PropertyManager) => "Property Manager",
        Some(Role::AssistantManager) => "Assistant Manager",
        Some(Role::MaintenanceLead) => "Maintenance Lead",
        Some(Role::Maintenance) => "Maintenance",
        Some(Role::Contractor) => "Contractor",
        Some(Role::Tenant) => "Tenant",
        None => DEFAULT_ROLE_DISPLAY_NAME,
    }
}

/// Badge color for a role, as a CSS hex string
pub fn role_color(role: Option<Role>) -> &'static str {
    match role {
        Some(Role::Admin) => "#dc2626",
        Some(Role::PropertyManager) => "#2563eb",
        Some(Role::AssistantManager) => "#7c3aed",
        Some(Role::MaintenanceLead) => "#ea580c",
        Some(Role::Maintenance) => "#d97706",
        Some(Role::Contractor) => "#0891b2",
        Some(Role::Tenant) => "#16a34a",
        None => DEFAULT_ROLE_COLOR,
    }
}
