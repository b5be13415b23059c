//! Invitation workflow: invite, email delivery, acceptance

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{id_of, TestApp};

#[tokio::test]
#[ignore = "requires a database"]
async fn test_invite_and_accept_links_member() {
    let app = TestApp::new().await.unwrap();
    let manager = app.create_user("property_manager").await.unwrap();
    let invitee = app.create_user("tenant").await.unwrap();
    let property_id = app.create_property("Maple Gardens", manager.id).await.unwrap();

    let (status, body) = app
        .post(
            "/v1/invitations",
            &manager,
            json!({
                "email": invitee.email,
                "role": "maintenance",
                "linked_properties": [property_id]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["state"], "pending");
    assert_eq!(body["email_sent"], true);
    let invitation_id = id_of(&body);
    assert!(app.email.was_invitation_sent_to(&invitee.email));

    let (status, _) = app
        .post(
            "/v1/invitations",
            &manager,
            json!({ "email": invitee.email, "role": "contractor" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app.get("/v1/invitations/mine", &invitee).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(id_of(&body[0]), invitation_id);

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/v1/invitations/{}/accept", invitation_id),
            Some(&invitee.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["role"], "maintenance");
    assert_eq!(body["user_id"], json!(invitee.id));
    assert_eq!(body["linked_properties"], json!([property_id]));

    let (status, body) = app.get("/v1/account", &invitee).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "maintenance");

    let (status, body) = app.get("/v1/properties", &invitee).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(id_of(&body[0]), property_id);

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/v1/invitations/{}/accept", invitation_id),
            Some(&invitee.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "requires a database"]
async fn test_admin_cannot_be_invited() {
    let app = TestApp::new().await.unwrap();
    let admin = app.create_user("admin").await.unwrap();

    let (status, _) = app
        .post(
            "/v1/invitations",
            &admin,
            json!({ "email": "new-admin@propdesk.test", "role": "admin" }),
        )
        .await;
    assert!(status.is_client_error());
    assert!(!app.email.was_invitation_sent_to("new-admin@propdesk.test"));
}

#[tokio::test]
#[ignore = "requires a database"]
async fn test_only_addressee_can_accept() {
    let app = TestApp::new().await.unwrap();
    let manager = app.create_user("property_manager").await.unwrap();
    let stranger = app.create_user("tenant").await.unwrap();
    let email = format!("invitee_{}@propdesk.test", uuid::Uuid::new_v4().simple());

    let (status, body) = app
        .post(
            "/v1/invitations",
            &manager,
            json!({ "email": email, "role": "contractor" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/v1/invitations/{}/accept", id_of(&body)),
            Some(&stranger.token),
            None,
        )
        .await;
    assert!(matches!(
        status,
        StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
    ));
}

#[tokio::test]
#[ignore = "requires a database"]
async fn test_worker_cannot_invite() {
    let app = TestApp::new().await.unwrap();
    let worker = app.create_user("maintenance").await.unwrap();

    let (status, _) = app
        .post(
            "/v1/invitations",
            &worker,
            json!({ "email": "someone@propdesk.test", "role": "tenant" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
