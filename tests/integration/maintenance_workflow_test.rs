//! Maintenance requests: a tenant files, a reviewer turns it into a task

mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{id_of, TestApp, TestUser};

async fn tenant_at(app: &TestApp, title: &str) -> (TestUser, TestUser, Uuid) {
    let manager = app.create_user("property_manager").await.unwrap();
    let tenant = app.create_user("tenant").await.unwrap();
    let property_id = app.create_property(title, manager.id).await.unwrap();
    app.assign_property(&tenant, property_id).await.unwrap();
    (manager, tenant, property_id)
}

#[tokio::test]
#[ignore = "requires a database"]
async fn test_approval_creates_pending_task() {
    let app = TestApp::new().await.unwrap();
    let (manager, tenant, property_id) = tenant_at(&app, "Poplar House").await;

    let (status, body) = app
        .post(
            "/v1/maintenance-requests",
            &tenant,
            json!({
                "title": "Leaking tap",
                "description": "Kitchen tap drips constantly",
                "priority": "medium"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["property_id"], json!(property_id));
    let request_id = id_of(&body);

    let (status, body) = app
        .post(
            &format!("/v1/maintenance-requests/{}/approve", request_id),
            &manager,
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["request"]["status"], "approved");
    let task_id = id_of(&body["task"]);
    assert_eq!(body["request"]["task_id"], json!(task_id));
    assert_eq!(body["task"]["status"], "Pending");
    assert_eq!(body["task"]["title"], "Leaking tap");
    assert_eq!(body["task"]["property"], "Poplar House");

    let (status, body) = app.get(&format!("/v1/tasks/{}", task_id), &manager).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["property_id"], json!(property_id));

    let (status, _) = app
        .post(
            &format!("/v1/maintenance-requests/{}/approve", request_id),
            &manager,
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = app.get("/v1/notifications", &tenant).await;
    assert!(body
        .as_array()
        .unwrap()
        .iter()
        .any(|n| n["kind"] == "maintenance_approved"));
}

#[tokio::test]
#[ignore = "requires a database"]
async fn test_rejection_records_reason() {
    let app = TestApp::new().await.unwrap();
    let (manager, tenant, _) = tenant_at(&app, "Rowan Terrace").await;

    let (_, body) = app
        .post(
            "/v1/maintenance-requests",
            &tenant,
            json!({ "title": "Noisy fan", "description": "Bathroom fan rattles" }),
        )
        .await;
    let request_id = id_of(&body);

    let (status, body) = app
        .post(
            &format!("/v1/maintenance-requests/{}/reject", request_id),
            &manager,
            json!({ "reason": "Scheduled for the building-wide service" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["request"]["status"], "rejected");
    assert!(body["request"]["task_id"].is_null());
    assert!(body.get("task").is_none());
}

#[tokio::test]
#[ignore = "requires a database"]
async fn test_tenants_see_only_their_own_requests() {
    let app = TestApp::new().await.unwrap();
    let (_, tenant, property_id) = tenant_at(&app, "Hazel Court").await;
    let neighbour = app.create_user("tenant").await.unwrap();
    app.assign_property(&neighbour, property_id).await.unwrap();

    let (_, body) = app
        .post(
            "/v1/maintenance-requests",
            &tenant,
            json!({ "title": "Broken blind", "description": "Cord snapped" }),
        )
        .await;
    let request_id = id_of(&body);

    let (status, _) = app
        .get(&format!("/v1/maintenance-requests/{}", request_id), &neighbour)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/v1/maintenance-requests", &neighbour).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let (status, _) = app
        .post(
            &format!("/v1/maintenance-requests/{}/approve", request_id),
            &tenant,
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires a database"]
async fn test_tenant_cannot_file_for_another_property() {
    let app = TestApp::new().await.unwrap();
    let (manager, tenant, _) = tenant_at(&app, "Alder Lane").await;
    let elsewhere = app.create_property("Spruce Hill", manager.id).await.unwrap();

    let (status, _) = app
        .post(
            "/v1/maintenance-requests",
            &tenant,
            json!({
                "property_id": elsewhere,
                "title": "Door sticks",
                "description": "Front door sticks in wet weather"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
