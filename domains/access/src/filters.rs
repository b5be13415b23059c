//! Role-based data filters
//!
//! A viewer either sees everything (full-access roles), only the records tied
//! to the properties linked on their team-member record (limited-access
//! roles), or nothing. The decision is made once into an [`AccessScope`] and
//! then applied to any collection of property-scoped records.
//!
//! Every path that cannot establish visibility fails closed.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::permissions::{has_full_access, has_limited_access};
use crate::roles::Role;

/// The user a filter is evaluated for
pub trait Viewer {
    fn viewer_id(&self) -> Uuid;
    fn viewer_email(&self) -> &str;
    fn viewer_role(&self) -> Option<Role>;
}

/// A team-member record carrying the properties it is linked to
pub trait LinkedMember {
    /// Account bound to this record, once the member has signed in
    fn member_user_id(&self) -> Option<Uuid>;
    fn member_email(&self) -> &str;
    fn linked_properties(&self) -> &[Uuid];
}

/// A record whose visibility follows a single property
pub trait PropertyScoped {
    fn scope_property_id(&self) -> Uuid;
}

/// Read model of a team member's property links
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MemberLink {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub email: String,
    pub linked_properties: Vec<Uuid>,
}

impl LinkedMember for MemberLink {
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

/// What a viewer is allowed to see
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessScope {
    /// Nothing
    Denied,
    /// Everything, unfiltered
    All,
    /// Records belonging to these properties
    Properties(HashSet<Uuid>),
}

impl AccessScope {
    /// Decide the scope for `viewer` given the team-member context.
    ///
    /// `members` is `None` when the caller did not load team context; a
    /// limited-access viewer then sees nothing.
    pub fn resolve<V, M>(viewer: Option<&V>, members: Option<&[M]>) -> Self
    where
        V: Viewer + ?Sized,
        M: LinkedMember,
    {
        let Some(viewer) = viewer else {
            return AccessScope::Denied;
        };
        let role = viewer.viewer_role();

        if has_full_access(role) {
            return AccessScope::All;
        }

        match members {
            Some(members) if has_limited_access(role) => {
                match Self::find_member(viewer, members) {
                    Some(member) => AccessScope::Properties(
                        member.linked_properties().iter().copied().collect(),
                    ),
                    None => AccessScope::Denied,
                }
            }
            _ => AccessScope::Denied,
        }
    }

    /// Locate the viewer's own team-member record.
    ///
    /// Records bound to an account match on user id only. Unbound records
    /// (invited but never signed in) match on email, ignoring case.
    pub fn find_member<'a, V, M>(viewer: &V, members: &'a [M]) -> Option<&'a M>
    where
        V: Viewer + ?Sized,
        M: LinkedMember,
    {
        let viewer_id = viewer.viewer_id();
        let viewer_email = viewer.viewer_email();

        members.iter().find(|member| match member.member_user_id() {
            Some(user_id) => user_id == viewer_id,
            None => member.member_email().eq_ignore_ascii_case(viewer_email),
        })
    }

    /// Whether records of `property_id` are visible
    pub fn allows(&self, property_id: Uuid) -> bool {
        match self {
            AccessScope::Denied => false,
            AccessScope::All => true,
            AccessScope::Properties(ids) => ids.contains(&property_id),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, AccessScope::All)
    }

    /// Keep only the visible records. `All` hands back the input untouched.
    pub fn filter<T: PropertyScoped>(&self, entities: Vec<T>) -> Vec<T> {
        match self {
            AccessScope::All => entities,
            AccessScope::Denied => Vec::new(),
            AccessScope::Properties(_) => entities
                .into_iter()
                .filter(|e| self.allows(e.scope_property_id()))
                .collect(),
        }
    }
}

/// Filter tasks for a viewer. Missing input yields an empty list.
pub fn filter_tasks_by_role<T, V, M>(
    tasks: Option<Vec<T>>,
    viewer: Option<&V>,
    members: Option<&[M]>,
) -> Vec<T>
where
    T: PropertyScoped,
    V: Viewer + ?Sized,
    M: LinkedMember,
{
    match tasks {
        Some(tasks) => AccessScope::resolve(viewer, members).filter(tasks),
        None => Vec::new(),
    }
}

/// Filter properties for a viewer. Missing input yields an empty list.
pub fn filter_properties_by_role<T, V, M>(
    properties: Option<Vec<T>>,
    viewer: Option<&V>,
    members: Option<&[M]>,
) -> Vec<T>
where
    T: PropertyScoped,
    V: Viewer + ?Sized,
    M: LinkedMember,
{
    match properties {
        Some(properties) => AccessScope::resolve(viewer, members).filter(properties),
        None => Vec::new(),
    }
}
