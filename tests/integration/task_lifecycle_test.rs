//! Task lifecycle integration tests
//!
//! Run with `cargo test -p propdesk-integration-tests -- --ignored` against a
//! migrated Postgres database.

mod common;

use axum::http::{Method, StatusCode};
use propdesk_common::RepositoryError;
use propdesk_tasks::repository::update_task_details_tx;
use propdesk_tasks::{TaskStatus, TasksRepositories};
use serde_json::json;

use common::{id_of, TestApp, TestUser};

struct Crew {
    manager: TestUser,
    worker: TestUser,
    property_id: uuid::Uuid,
}

async fn crew(app: &TestApp) -> Crew {
    let manager = app.create_user("property_manager").await.unwrap();
    let worker = app.create_user("maintenance").await.unwrap();
    let property_id = app
        .create_property("Harbour View", manager.id)
        .await
        .unwrap();
    app.link_member(&worker, "maintenance", &[property_id])
        .await
        .unwrap();
    Crew {
        manager,
        worker,
        property_id,
    }
}

async fn create_task(app: &TestApp, crew: &Crew) -> uuid::Uuid {
    let (status, body) = app
        .post(
            "/v1/tasks",
            &crew.manager,
            json!({
                "property_id": crew.property_id,
                "title": "Service the boiler",
                "priority": "high",
                "assigned_to": crew.worker.id
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["status"], "Pending");
    assert_eq!(body["property"], "Harbour View");
    id_of(&body)
}

#[tokio::test]
#[ignore = "requires a database"]
async fn test_full_lifecycle_and_history() {
    let app = TestApp::new().await.unwrap();
    let crew = crew(&app).await;
    let task_id = create_task(&app, &crew).await;

    let (status, body) = app
        .post(&format!("/v1/tasks/{}/start", task_id), &crew.worker, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["status"], "In Progress");

    let (status, body) = app
        .post(
            &format!("/v1/tasks/{}/submit", task_id),
            &crew.worker,
            json!({ "completion_file": "https://files.example.com/boiler.jpg" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["status"], "Awaiting Approval");
    assert_eq!(body["completed_by"], json!(crew.worker.id));
    assert!(body["completion_date"].is_string());

    let (status, body) = app
        .post(&format!("/v1/tasks/{}/approve", task_id), &crew.manager, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["status"], "Completed");
    assert_eq!(body["approved_by"], json!(crew.manager.id));

    let (status, body) = app
        .post(&format!("/v1/tasks/{}/approve", task_id), &crew.manager, json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{}", body);

    let (status, body) = app
        .get(&format!("/v1/tasks/{}/events", task_id), &crew.manager)
        .await;
    assert_eq!(status, StatusCode::OK);
    let events = body.as_array().unwrap();
    let kinds: Vec<&str> = events
        .iter()
        .map(|e| e["event_type"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, ["created", "started", "submitted", "approved"]);
    for (expected, event) in (1..).zip(events) {
        assert_eq!(event["sequence"], json!(expected));
    }
}

#[tokio::test]
#[ignore = "requires a database"]
async fn test_rejection_returns_task_to_worker() {
    let app = TestApp::new().await.unwrap();
    let crew = crew(&app).await;
    let task_id = create_task(&app, &crew).await;

    app.post(
        &format!("/v1/tasks/{}/submit", task_id),
        &crew.worker,
        json!({}),
    )
    .await;

    let (status, _) = app
        .post(
            &format!("/v1/tasks/{}/reject", task_id),
            &crew.manager,
            json!({ "reason": "" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            &format!("/v1/tasks/{}/reject", task_id),
            &crew.manager,
            json!({ "reason": "Pilot light still out" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["status"], "In Progress");
    assert_eq!(body["rejection_reason"], "Pilot light still out");
    assert!(body["completion_date"].is_null());

    let (status, body) = app.get("/v1/notifications", &crew.worker).await;
    assert_eq!(status, StatusCode::OK);
    let kinds: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|n| n["kind"].as_str())
        .collect();
    assert!(kinds.contains(&"task_assigned"));
    assert!(kinds.contains(&"task_rejected"));
}

#[tokio::test]
#[ignore = "requires a database"]
async fn test_worker_cannot_approve() {
    let app = TestApp::new().await.unwrap();
    let crew = crew(&app).await;
    let task_id = create_task(&app, &crew).await;

    app.post(
        &format!("/v1/tasks/{}/submit", task_id),
        &crew.worker,
        json!({}),
    )
    .await;
    let (status, _) = app
        .post(&format!("/v1/tasks/{}/approve", task_id), &crew.worker, json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires a database"]
async fn test_completed_task_cannot_be_edited() {
    let app = TestApp::new().await.unwrap();
    let crew = crew(&app).await;
    let task_id = create_task(&app, &crew).await;

    app.post(
        &format!("/v1/tasks/{}/submit", task_id),
        &crew.worker,
        json!({}),
    )
    .await;
    app.post(
        &format!("/v1/tasks/{}/approve", task_id),
        &crew.manager,
        json!({}),
    )
    .await;

    let (status, _) = app
        .send(
            Method::PATCH,
            &format!("/v1/tasks/{}", task_id),
            Some(&crew.manager.token),
            Some(json!({ "title": "Service the boiler again" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "requires a database"]
async fn test_concurrent_approvals_have_one_winner() {
    let app = TestApp::new().await.unwrap();
    let crew = crew(&app).await;
    let task_id = create_task(&app, &crew).await;
    app.post(
        &format!("/v1/tasks/{}/submit", task_id),
        &crew.worker,
        json!({}),
    )
    .await;

    let path = format!("/v1/tasks/{}/approve", task_id);
    let (first, second) = tokio::join!(
        app.post(&path, &crew.manager, json!({})),
        app.post(&path, &crew.manager, json!({})),
    );
    let mut statuses = [first.0.as_u16(), second.0.as_u16()];
    statuses.sort_unstable();
    assert_eq!(statuses, [200, 409]);

    let (_, body) = app
        .get(&format!("/v1/tasks/{}/events", task_id), &crew.manager)
        .await;
    let approvals = body
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["event_type"] == "approved")
        .count();
    assert_eq!(approvals, 1);
}

async fn event_types(app: &TestApp, user: &TestUser, task_id: uuid::Uuid) -> Vec<String> {
    let (status, body) = app
        .get(&format!("/v1/tasks/{}/events", task_id), user)
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body.as_array()
        .unwrap()
        .iter()
        .map(|e| e["event_type"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
#[ignore = "requires a database"]
async fn test_status_edits_are_recorded_in_history() {
    let app = TestApp::new().await.unwrap();
    let crew = crew(&app).await;
    let task_id = create_task(&app, &crew).await;
    let path = format!("/v1/tasks/{}", task_id);

    let (status, body) = app
        .send(
            Method::PATCH,
            &path,
            Some(&crew.manager.token),
            Some(json!({ "status": "In Progress" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["status"], "In Progress");
    assert_eq!(
        event_types(&app, &crew.manager, task_id).await,
        ["created", "started"]
    );

    let (status, body) = app
        .send(
            Method::PATCH,
            &path,
            Some(&crew.manager.token),
            Some(json!({ "status": "Hold" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["status"], "Pending");
    assert_eq!(
        event_types(&app, &crew.manager, task_id).await,
        ["created", "started", "paused"]
    );

    let (status, _) = app
        .send(
            Method::PATCH,
            &path,
            Some(&crew.manager.token),
            Some(json!({ "title": "Service and bleed the boiler" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(event_types(&app, &crew.manager, task_id).await.len(), 3);
}

#[tokio::test]
#[ignore = "requires a database"]
async fn test_edit_loaded_before_start_is_stale() {
    let app = TestApp::new().await.unwrap();
    let crew = crew(&app).await;
    let task_id = create_task(&app, &crew).await;
    let repos = TasksRepositories::new(app.pool.clone());

    let mut loaded = repos.tasks.find(task_id).await.unwrap().unwrap();
    assert_eq!(loaded.status, TaskStatus::Pending);

    let (status, _) = app
        .post(&format!("/v1/tasks/{}/start", task_id), &crew.worker, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    loaded.title = "Renamed while pending".to_string();
    let mut tx = repos.begin().await.unwrap();
    let result = update_task_details_tx(&mut tx, &loaded, loaded.status).await;
    assert!(matches!(result, Err(RepositoryError::StaleWrite)));
    tx.rollback().await.unwrap();

    let (_, body) = app
        .get(&format!("/v1/tasks/{}", task_id), &crew.manager)
        .await;
    assert_eq!(body["status"], "In Progress");
    assert_eq!(body["title"], "Service the boiler");
    assert_eq!(
        event_types(&app, &crew.manager, task_id).await,
        ["created", "started"]
    );
}
