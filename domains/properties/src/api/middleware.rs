//! Properties domain state and auth backend integration

use crate::PropertiesRepositories;
use axum::extract::FromRef;
use propdesk_auth::AuthBackend;

/// Application state for the properties domain
#[derive(Clone)]
pub struct PropertiesState {
    pub repos: PropertiesRepositories,
    pub auth: AuthBackend,
}

impl FromRef<PropertiesState> for AuthBackend {
    fn from_ref(state: &PropertiesState) -> Self {
        state.auth.clone()
    }
}
