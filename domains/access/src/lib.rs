//! Access control for PropDesk
//!
//! Everything here is pure: a static role table, permission predicates over
//! roles, and filters that reduce a collection to what a viewer may see.
//! Callers load the data; this crate only decides visibility.

pub mod filters;
pub mod permissions;
pub mod roles;
pub mod tenant;

pub use filters::{
    filter_properties_by_role, filter_tasks_by_role, AccessScope, LinkedMember, MemberLink,
    PropertyScoped, Viewer,
};
pub use permissions::{
    can_approve_maintenance_request, can_approve_task_completions, can_manage_properties,
    can_manage_team_members, can_view_all_pages, has_full_access, has_limited_access, is_tenant,
    role_color, role_display_name, DEFAULT_ROLE_COLOR, DEFAULT_ROLE_DISPLAY_NAME,
};
pub use roles::{Capability, Role};
pub use tenant::{tenant_property_slug, TenantProperty};
