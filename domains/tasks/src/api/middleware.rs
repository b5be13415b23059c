//! Tasks domain state and auth backend integration

use crate::TasksRepositories;
use axum::extract::FromRef;
use propdesk_auth::AuthBackend;

/// Application state for the tasks domain
#[derive(Clone)]
pub struct TasksState {
    pub repos: TasksRepositories,
    pub auth: AuthBackend,
}

impl FromRef<TasksState> for AuthBackend {
    fn from_ref(state: &TasksState) -> Self {
        state.auth.clone()
    }
}
