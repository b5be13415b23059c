//! Route definitions for the team domain API

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{groups, invitations, members, notifications, users};
use super::middleware::TeamState;

fn user_routes() -> Router<TeamState> {
    Router::new()
        .route(
            "/v1/account",
            get(users::get_account).patch(users::update_account),
        )
        .route("/v1/users", get(users::list_users))
        .route("/v1/users/{id}/role", put(users::set_user_role))
        .route(
            "/v1/users/{id}/assigned-property",
            put(users::set_assigned_property),
        )
}

fn group_routes() -> Router<TeamState> {
    Router::new()
        .route(
            "/v1/team-groups",
            get(groups::list_groups).post(groups::create_group),
        )
        .route(
            "/v1/team-groups/{id}",
            get(groups::get_group)
                .patch(groups::update_group)
                .delete(groups::delete_group),
        )
}

fn member_routes() -> Router<TeamState> {
    Router::new()
        .route(
            "/v1/team-members",
            get(members::list_members).post(members::create_member),
        )
        .route("/v1/team-members/me", get(members::get_my_member))
        .route(
            "/v1/team-members/{id}",
            get(members::get_member)
                .patch(members::update_member)
                .delete(members::delete_member),
        )
}

fn invitation_routes() -> Router<TeamState> {
    Router::new()
        .route(
            "/v1/invitations",
            get(invitations::list_invitations).post(invitations::create_invitation),
        )
        .route("/v1/invitations/mine", get(invitations::list_my_invitations))
        .route("/v1/invitations/{id}", get(invitations::get_invitation))
        .route(
            "/v1/invitations/{id}/revoke",
            post(invitations::revoke_invitation),
        )
        .route(
            "/v1/invitations/{id}/resend",
            post(invitations::resend_invitation),
        )
        .route(
            "/v1/invitations/{id}/accept",
            post(invitations::accept_invitation),
        )
        .route(
            "/v1/invitations/{id}/decline",
            post(invitations::decline_invitation),
        )
}

fn notification_routes() -> Router<TeamState> {
    Router::new()
        .route("/v1/notifications", get(notifications::list_notifications))
        .route(
            "/v1/notifications/unread-count",
            get(notifications::unread_count),
        )
        .route(
            "/v1/notifications/read-all",
            post(notifications::mark_all_read),
        )
        .route(
            "/v1/notifications/{id}/read",
            post(notifications::mark_read),
        )
        .route(
            "/v1/notifications/{id}",
            axum::routing::delete(notifications::delete_notification),
        )
}

/// Create all team domain API routes
pub fn routes() -> Router<TeamState> {
    Router::new()
        .merge(user_routes())
        .merge(group_routes())
        .merge(member_routes())
        .merge(invitation_routes())
        .merge(notification_routes())
}
