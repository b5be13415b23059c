//! Team domain state and auth backend integration

use crate::TeamRepositories;
use axum::extract::FromRef;
use propdesk_auth::AuthBackend;
use propdesk_email::EmailService;
use std::sync::Arc;

/// Application state for the team domain
#[derive(Clone)]
pub struct TeamState {
    pub repos: TeamRepositories,
    pub auth: AuthBackend,
    pub email: Arc<dyn EmailService>,
    /// Lifetime of new and resent invitations
    pub invitation_ttl_days: i64,
}

impl FromRef<TeamState> for AuthBackend {
    fn from_ref(state: &TeamState) -> Self {
        state.auth.clone()
    }
}
