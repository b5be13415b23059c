//! HTTP handlers for the tasks domain

pub mod lifecycle;
pub mod maintenance;
pub mod tasks;

use crate::api::middleware::TasksState;
use crate::repository::Notice;

/// Write a notification after the fact. Failures are logged, never returned.
pub(crate) async fn notify(state: &TasksState, notice: Notice) {
    if let Err(e) = state.repos.notifications.send(&notice).await {
        tracing::warn!(
            error = %e,
            user_id = %notice.user_id,
            kind = notice.kind.as_str(),
            "Failed to write notification"
        );
    }
}
