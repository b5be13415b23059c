//! Team domain: users, team groups, team members, invitations, notifications
//!
//! Owns the `users` rows that authentication reads, the team-member records
//! that carry each staff member's linked properties, and the invitation flow
//! that hands out roles.

pub mod api;
pub mod domain;
pub mod repository;

pub use domain::entities::*;
pub use domain::state::{
    InvitationEvent, InvitationGuardContext, InvitationState, InvitationStateMachine,
};

pub use repository::{
    InvitationRepository, NotificationRepository, TeamGroupRepository, TeamMemberRepository,
    TeamRepositories, UserRepository,
};

pub use api::routes;
pub use api::TeamState;
