//! HTTP handlers for the team domain

pub mod groups;
pub mod invitations;
pub mod members;
pub mod notifications;
pub mod users;
