mod common;

use std::sync::Arc;

use daybook_core::api::{ApiClient, ErrorKind};
use daybook_core::auth::{NoopNavigator, TokenStore};
use daybook_core::models::{NoteInput, NoteQuery, NoteStatus, Registration, TaskInput};
use daybook_core::storage::{FileStore, KeyValueStore};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::Harness;

#[tokio::test]
async fn test_login_stores_returned_token() {
    let h = Harness::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({"email": "me@example.com", "password": "secret1"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"token": "1|abc", "name": "Me"})),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let response = h.client.login(" me@example.com ", "secret1").await.unwrap();

    assert_eq!(response.name.as_deref(), Some("Me"));
    assert_eq!(
        h.client.tokens().get_valid_token().unwrap().as_deref(),
        Some("1|abc")
    );
}

#[tokio::test]
async fn test_login_without_token_stores_nothing() {
    let h = Harness::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "check mail"})))
        .mount(&h.server)
        .await;

    let response = h.client.login("me@example.com", "secret1").await.unwrap();

    assert_eq!(response.message.as_deref(), Some("check mail"));
    assert!(h.storage.is_empty());
}

#[tokio::test]
async fn test_failed_login_reports_server_message() {
    let h = Harness::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(&h.server)
        .await;

    let err = h.client.login("me@example.com", "wrong").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RequestFailed);
    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(h.storage.is_empty());
}

#[tokio::test]
async fn test_register_without_session_stores_token() {
    let h = Harness::start().await;

    Mock::given(method("POST"))
        .and(path("/api/register"))
        .and(body_json(json!({"name": "Ada", "email": "ada@example.com", "password": "pw123456"})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"token": "2|xyz", "name": "Ada"})),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let registration = Registration::new("Ada", "Ada@Example.com", "pw123456");
    h.client.register(&registration).await.unwrap();

    assert_eq!(
        h.client.tokens().get_valid_token().unwrap().as_deref(),
        Some("2|xyz")
    );
    assert_eq!(h.resets(), 0);
}

#[tokio::test]
async fn test_register_rejection_keeps_existing_session() {
    let h = Harness::start().await;
    h.login_as("T1");

    Mock::given(method("POST"))
        .and(path("/api/register"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Signups are closed"})),
        )
        .mount(&h.server)
        .await;

    let registration = Registration::new("Ada", "ada@example.com", "pw123456");
    let err = h.client.register(&registration).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RequestFailed);
    assert_eq!(err.to_string(), "Signups are closed");
    assert_eq!(h.resets(), 0);
    assert_eq!(
        h.client.tokens().get_valid_token().unwrap().as_deref(),
        Some("T1")
    );
}

#[tokio::test]
async fn test_register_failure_without_message() {
    let h = Harness::start().await;

    Mock::given(method("POST"))
        .and(path("/api/register"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;

    let registration = Registration::new("Ada", "ada@example.com", "pw123456");
    let err = h.client.register(&registration).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RequestFailed);
    assert_eq!(err.to_string(), "Registration failed");
    assert!(h.storage.is_empty());
    assert_eq!(h.resets(), 0);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let h = Harness::start().await;
    h.login_as("T1");

    Mock::given(method("POST"))
        .and(path("/api/logout"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(1)
        .mount(&h.server)
        .await;

    h.client.logout().await.unwrap();
    assert!(h.storage.is_empty());
}

#[tokio::test]
async fn test_logout_clears_session_when_server_fails() {
    let h = Harness::start().await;
    h.login_as("T1");

    Mock::given(method("POST"))
        .and(path("/api/logout"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&h.server)
        .await;

    h.client.logout().await.unwrap();
    assert!(h.storage.is_empty());
    assert_eq!(h.client.tokens().get_valid_token().unwrap(), None);
}

#[tokio::test]
async fn test_logout_clears_session_when_unreachable() {
    let h = Harness::unreachable().await;
    h.login_as("T1");

    h.client.logout().await.unwrap();
    assert!(h.storage.is_empty());
}

#[tokio::test]
async fn test_get_tasks_decodes_list() {
    let h = Harness::start().await;
    h.login_as("T1");

    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "title": "Buy milk", "status": false, "category": "home"},
            {"id": 2, "title": "File taxes", "status": true, "due_date": "2025-04-15 09:00:00"}
        ])))
        .mount(&h.server)
        .await;

    let tasks = h.client.get_tasks().await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].title, "Buy milk");
    assert!(tasks[1].status);
}

#[tokio::test]
async fn test_get_expenses_accepts_data_wrapper() {
    let h = Harness::start().await;
    h.login_as("T1");

    Mock::given(method("GET"))
        .and(path("/api/expenses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 4, "title": "Coffee", "amount": "3.50"}]
        })))
        .mount(&h.server)
        .await;

    let expenses = h.client.get_expenses().await.unwrap();
    assert_eq!(expenses[0].amount, Some(3.5));
}

#[tokio::test]
async fn test_get_expense_dashboard() {
    let h = Harness::start().await;
    h.login_as("T1");

    Mock::given(method("GET"))
        .and(path("/api/expenses/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "summary": {"total_expenses": {"formatted": "৳42.00"}},
            "category_breakdown": [{"category": "food", "formatted_total": "৳42.00"}],
            "recent_expenses": []
        })))
        .mount(&h.server)
        .await;

    let dashboard = h.client.get_expense_dashboard().await.unwrap();
    assert_eq!(dashboard.total_display(), "৳42.00");
    assert_eq!(dashboard.category_breakdown.len(), 1);
}

#[tokio::test]
async fn test_task_mutations_hit_expected_routes() {
    let h = Harness::start().await;
    h.login_as("T1");

    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .and(body_json(json!({"title": "New", "category": "work"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 10, "title": "New"})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/tasks/10/status"))
        .and(body_json(json!({"status": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 10, "status": true})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/tasks/10"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&h.server)
        .await;

    let mut input = TaskInput::new("New");
    input.category = Some("work".to_string());
    let created = h.client.create_task(&input).await.unwrap();
    assert_eq!(created["id"], 10);

    let updated = h.client.update_task_status(10, true).await.unwrap();
    assert_eq!(updated["status"], true);

    assert!(h.client.delete_task(10).await.unwrap());
}

#[tokio::test]
async fn test_expense_category_routes() {
    let h = Harness::start().await;
    h.login_as("T1");

    Mock::given(method("POST"))
        .and(path("/api/expense-categories"))
        .and(body_json(json!({"name": "travel"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 3, "name": "travel"})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/expense-categories/3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.server)
        .await;

    h.client.create_expense_category("travel").await.unwrap();
    assert!(h.client.delete_expense_category(3).await.unwrap());
}

#[tokio::test]
async fn test_get_notes_sends_query() {
    let h = Harness::start().await;
    h.login_as("T1");

    Mock::given(method("GET"))
        .and(path("/api/notes"))
        .and(query_param("search", "milk"))
        .and(query_param("per_page", "5"))
        .and(query_param("page", "2"))
        .and(query_param("status", "archived"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 1, "title": "Groceries", "content": "milk", "is_archived": true}],
            "total": 6
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let query = NoteQuery {
        search: Some("milk".to_string()),
        per_page: 5,
        page: 2,
        status: NoteStatus::Archived,
    };
    let page = h.client.get_notes(&query).await.unwrap();

    assert_eq!(page.data.len(), 1);
    assert!(page.data[0].is_archived);
    assert_eq!(page.total_pages(query.per_page), 2);
}

#[tokio::test]
async fn test_get_notes_omits_empty_search() {
    let h = Harness::start().await;
    h.login_as("T1");

    Mock::given(method("GET"))
        .and(path("/api/notes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [], "total": 0})))
        .mount(&h.server)
        .await;

    h.client.get_notes(&NoteQuery::default()).await.unwrap();

    let received = h.server.received_requests().await.unwrap();
    let query = received[0].url.query().unwrap_or_default().to_string();
    assert!(!query.contains("search"));
    assert!(query.contains("status=active"));
}

#[tokio::test]
async fn test_note_toggles_use_action_routes() {
    let h = Harness::start().await;
    h.login_as("T1");

    for action in ["pin", "unpin", "archive", "unarchive"] {
        Mock::given(method("PATCH"))
            .and(path(format!("/api/notes/7/{}", action)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
            .expect(1)
            .mount(&h.server)
            .await;
    }

    h.client.set_note_pinned(7, true).await.unwrap();
    h.client.set_note_pinned(7, false).await.unwrap();
    h.client.set_note_archived(7, true).await.unwrap();
    h.client.set_note_archived(7, false).await.unwrap();
}

#[tokio::test]
async fn test_note_update_body() {
    let h = Harness::start().await;
    h.login_as("T1");

    Mock::given(method("PUT"))
        .and(path("/api/notes/7"))
        .and(body_json(json!({"title": "t", "content": "c", "color": "#ffeb3b"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&h.server)
        .await;

    let note = NoteInput {
        title: "t".to_string(),
        content: "c".to_string(),
        color: Some("#ffeb3b".to_string()),
    };
    h.client.update_note(7, &note).await.unwrap();
}

#[tokio::test]
async fn test_file_backed_session_survives_new_client() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let base_url = format!("{}/api", server.uri());

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "3|file"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .and(header("authorization", "Bearer 3|file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "name": "Work"}])))
        .expect(1)
        .mount(&server)
        .await;

    {
        let storage = Arc::new(FileStore::in_dir(dir.path()));
        let tokens = Arc::new(TokenStore::new(storage, Arc::new(NoopNavigator)));
        let client = ApiClient::new(&base_url, tokens).unwrap();
        client.login("me@example.com", "secret1").await.unwrap();
    }

    let storage = Arc::new(FileStore::in_dir(dir.path()));
    assert_eq!(storage.get("authToken").unwrap().as_deref(), Some("3|file"));
    assert!(storage.get("tokenExpiry").unwrap().is_some());

    let tokens = Arc::new(TokenStore::new(storage, Arc::new(NoopNavigator)));
    let client = ApiClient::new(&base_url, tokens).unwrap();
    let categories = client.get_categories().await.unwrap();
    assert_eq!(categories[0].name, "Work");
}
