//! Role-based visibility across the property and task endpoints

mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{id_of, TestApp};

fn ids(body: &serde_json::Value) -> Vec<Uuid> {
    body.as_array()
        .map(|items| items.iter().map(id_of).collect())
        .unwrap_or_default()
}

#[tokio::test]
#[ignore = "requires a database"]
async fn test_contractor_sees_only_linked_properties() {
    let app = TestApp::new().await.unwrap();
    let manager = app.create_user("property_manager").await.unwrap();
    let contractor = app.create_user("contractor").await.unwrap();
    let linked = app.create_property("Elm Court", manager.id).await.unwrap();
    let other = app.create_property("Birch Park", manager.id).await.unwrap();
    app.link_member(&contractor, "contractor", &[linked])
        .await
        .unwrap();

    let (status, body) = app.get("/v1/properties", &contractor).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![linked]);

    let (status, _) = app.get(&format!("/v1/properties/{}", other), &contractor).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get(&format!("/v1/properties/{}", other), &manager).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(id_of(&body), other);
}

#[tokio::test]
#[ignore = "requires a database"]
async fn test_tasks_follow_property_links() {
    let app = TestApp::new().await.unwrap();
    let manager = app.create_user("property_manager").await.unwrap();
    let contractor = app.create_user("contractor").await.unwrap();
    let linked = app.create_property("Cedar Row", manager.id).await.unwrap();
    let other = app.create_property("Willow Mews", manager.id).await.unwrap();
    app.link_member(&contractor, "contractor", &[linked])
        .await
        .unwrap();

    let mut created = Vec::new();
    for property_id in [linked, other] {
        let (status, body) = app
            .post(
                "/v1/tasks",
                &manager,
                json!({ "property_id": property_id, "title": "Check fire doors" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        created.push(id_of(&body));
    }

    let (status, body) = app.get("/v1/tasks", &contractor).await;
    assert_eq!(status, StatusCode::OK);
    let visible = ids(&body);
    assert!(visible.contains(&created[0]));
    assert!(!visible.contains(&created[1]));

    let (status, _) = app
        .get(&format!("/v1/tasks/{}", created[1]), &contractor)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(
            &format!("/v1/tasks/{}/start", created[1]),
            &contractor,
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires a database"]
async fn test_limited_role_without_member_record_sees_nothing() {
    let app = TestApp::new().await.unwrap();
    let manager = app.create_user("property_manager").await.unwrap();
    let maintenance = app.create_user("maintenance").await.unwrap();
    app.create_property("Aspen Yard", manager.id).await.unwrap();

    let (status, body) = app.get("/v1/properties", &maintenance).await;
    assert_eq!(status, StatusCode::OK);
    assert!(ids(&body).is_empty());
}

#[tokio::test]
#[ignore = "requires a database"]
async fn test_tenant_property_endpoint() {
    let app = TestApp::new().await.unwrap();
    let manager = app.create_user("property_manager").await.unwrap();
    let tenant = app.create_user("tenant").await.unwrap();
    let property_id = app.create_property("Linden Flats", manager.id).await.unwrap();

    let (status, _) = app.get("/v1/tenant/property", &tenant).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.assign_property(&tenant, property_id).await.unwrap();
    let (status, body) = app.get("/v1/tenant/property", &tenant).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["slug"], format!("test-{}", property_id.simple()));
    assert_eq!(id_of(&body["property"]), property_id);

    let (status, _) = app.get("/v1/tenant/property", &manager).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires a database"]
async fn test_team_pages_are_for_managers() {
    let app = TestApp::new().await.unwrap();
    let manager = app.create_user("assistant_manager").await.unwrap();
    let worker = app.create_user("maintenance").await.unwrap();

    let (status, body) = app.get("/v1/team-groups", &worker).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "INSUFFICIENT_ROLE");

    let (status, _) = app.get("/v1/team-groups", &manager).await;
    assert_eq!(status, StatusCode::OK);
}
