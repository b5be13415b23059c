//! Route definitions for the tasks domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{lifecycle, maintenance, tasks};
use super::middleware::TasksState;

fn task_routes() -> Router<TasksState> {
    Router::new()
        .route("/v1/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/v1/tasks/{id}",
            get(tasks::get_task)
                .patch(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/v1/tasks/{id}/start", post(lifecycle::start_task))
        .route("/v1/tasks/{id}/submit", post(lifecycle::submit_task))
        .route("/v1/tasks/{id}/approve", post(lifecycle::approve_task))
        .route("/v1/tasks/{id}/reject", post(lifecycle::reject_task))
        .route("/v1/tasks/{id}/events", get(lifecycle::list_task_events))
}

fn maintenance_routes() -> Router<TasksState> {
    Router::new()
        .route(
            "/v1/maintenance-requests",
            get(maintenance::list_requests).post(maintenance::create_request),
        )
        .route(
            "/v1/maintenance-requests/{id}",
            get(maintenance::get_request),
        )
        .route(
            "/v1/maintenance-requests/{id}/approve",
            post(maintenance::approve_request),
        )
        .route(
            "/v1/maintenance-requests/{id}/reject",
            post(maintenance::reject_request),
        )
}

/// Create tasks domain routes
pub fn routes() -> Router<TasksState> {
    Router::new()
        .merge(task_routes())
        .merge(maintenance_routes())
}
