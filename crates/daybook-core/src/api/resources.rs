//! Named operations over the API: authentication and the task, expense and
//! note families. Each is one call through [`ApiClient::resource_request`] or
//! [`ApiClient::request`] and adds no failure modes of its own.
//!
//! Mutations return the server's JSON answer untouched; lists and dashboards
//! decode into typed models.

use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::client::ApiClient;
use super::request::{Outcome, RequestOptions, Resource};
use super::error::GENERIC_FAILURE_MESSAGE;
use super::ApiError;
use crate::models::{
    AuthResponse, Category, Expense, ExpenseCategory, ExpenseDashboard, ExpenseInput, LoginRequest,
    NoteInput, NotePage, NoteQuery, Registration, Task, TaskInput,
};

/// Message for a failed registration the server did not explain
const REGISTRATION_FAILURE_MESSAGE: &str = "Registration failed";

fn to_body<B: Serialize>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::InvalidRequest(format!("Unserializable body: {}", e)))
}

fn into_value(outcome: Outcome) -> Value {
    outcome.into_json().unwrap_or(Value::Bool(true))
}

impl ApiClient {
    // ===== Authentication =====

    /// Log in and store the returned token.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = LoginRequest::new(email, password);
        let response: AuthResponse = self
            .request_json("/login", RequestOptions::post().json(&body)?)
            .await?;
        self.store_session(&response)?;
        Ok(response)
    }

    /// Create an account and store the returned token.
    ///
    /// Registration never touches an existing session: any failure, a 401
    /// included, is reported as `RequestFailed`.
    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError> {
        let response: AuthResponse = self
            .request_json("/register", RequestOptions::post().json(registration)?)
            .await
            .map_err(|e| match e {
                ApiError::RequestFailed { status, message }
                    if message == GENERIC_FAILURE_MESSAGE =>
                {
                    ApiError::RequestFailed {
                        status,
                        message: REGISTRATION_FAILURE_MESSAGE.to_string(),
                    }
                }
                other => other,
            })?;
        self.store_session(&response)?;
        Ok(response)
    }

    fn store_session(&self, response: &AuthResponse) -> Result<(), ApiError> {
        match response.token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => {
                self.tokens().set_token(token)?;
                info!(name = ?response.name, "Session started");
            }
            None => warn!("Authentication response carried no token"),
        }
        Ok(())
    }

    /// Tell the server to end the session, then always clear it locally.
    ///
    /// A failed server call is logged and swallowed; only a local storage
    /// failure is reported.
    pub async fn logout(&self) -> Result<(), ApiError> {
        if let Err(e) = self.request("/logout", RequestOptions::post()).await {
            warn!(error = %e, "Server logout failed, clearing local session anyway");
        }
        self.tokens().clear()?;
        info!("Logged out");
        Ok(())
    }

    // ===== Tasks =====

    pub async fn get_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.fetch_list(Resource::Tasks).await
    }

    pub async fn get_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.fetch_list(Resource::Categories).await
    }

    pub async fn create_task(&self, task: &TaskInput) -> Result<Value, ApiError> {
        self.create(Resource::Tasks, to_body(task)?).await
    }

    pub async fn update_task(&self, id: i64, task: &TaskInput) -> Result<Value, ApiError> {
        self.update(Resource::Tasks, id, to_body(task)?).await
    }

    pub async fn update_task_status(&self, id: i64, completed: bool) -> Result<Value, ApiError> {
        let outcome = self
            .resource_request(
                Resource::Tasks,
                Some(id),
                Some("status"),
                Method::PUT,
                Some(json!({ "status": completed })),
            )
            .await?;
        Ok(into_value(outcome))
    }

    pub async fn delete_task(&self, id: i64) -> Result<bool, ApiError> {
        self.delete(Resource::Tasks, id).await
    }

    // ===== Expenses =====

    pub async fn get_expenses(&self) -> Result<Vec<Expense>, ApiError> {
        self.fetch_list(Resource::Expenses).await
    }

    pub async fn get_expense_dashboard(&self) -> Result<ExpenseDashboard, ApiError> {
        self.fetch_record(Resource::Expenses, Some("dashboard")).await
    }

    pub async fn create_expense(&self, expense: &ExpenseInput) -> Result<Value, ApiError> {
        self.create(Resource::Expenses, to_body(expense)?).await
    }

    pub async fn update_expense(&self, id: i64, expense: &ExpenseInput) -> Result<Value, ApiError> {
        self.update(Resource::Expenses, id, to_body(expense)?).await
    }

    pub async fn delete_expense(&self, id: i64) -> Result<bool, ApiError> {
        self.delete(Resource::Expenses, id).await
    }

    pub async fn get_expense_categories(&self) -> Result<Vec<ExpenseCategory>, ApiError> {
        self.fetch_list(Resource::ExpenseCategories).await
    }

    pub async fn create_expense_category(&self, name: &str) -> Result<Value, ApiError> {
        self.create(Resource::ExpenseCategories, json!({ "name": name }))
            .await
    }

    pub async fn delete_expense_category(&self, id: i64) -> Result<bool, ApiError> {
        self.delete(Resource::ExpenseCategories, id).await
    }

    // ===== Notes =====

    pub async fn get_notes(&self, query: &NoteQuery) -> Result<NotePage, ApiError> {
        let options = RequestOptions::get().query(query.to_pairs());
        self.request_json(Resource::Notes.path(), options).await
    }

    pub async fn create_note(&self, note: &NoteInput) -> Result<Value, ApiError> {
        self.create(Resource::Notes, to_body(note)?).await
    }

    pub async fn update_note(&self, id: i64, note: &NoteInput) -> Result<Value, ApiError> {
        self.update(Resource::Notes, id, to_body(note)?).await
    }

    pub async fn delete_note(&self, id: i64) -> Result<bool, ApiError> {
        self.delete(Resource::Notes, id).await
    }

    /// Move a note into (`true`) or out of (`false`) the archive.
    pub async fn set_note_archived(&self, id: i64, archived: bool) -> Result<Value, ApiError> {
        let action = if archived { "archive" } else { "unarchive" };
        self.patch(Resource::Notes, id, action).await
    }

    pub async fn set_note_pinned(&self, id: i64, pinned: bool) -> Result<Value, ApiError> {
        let action = if pinned { "pin" } else { "unpin" };
        self.patch(Resource::Notes, id, action).await
    }

    // ===== Shared shapes =====

    async fn create(&self, resource: Resource, body: Value) -> Result<Value, ApiError> {
        let outcome = self
            .resource_request(resource, None, None, Method::POST, Some(body))
            .await?;
        Ok(into_value(outcome))
    }

    async fn update(&self, resource: Resource, id: i64, body: Value) -> Result<Value, ApiError> {
        let outcome = self
            .resource_request(resource, Some(id), None, Method::PUT, Some(body))
            .await?;
        Ok(into_value(outcome))
    }

    async fn patch(&self, resource: Resource, id: i64, action: &str) -> Result<Value, ApiError> {
        let outcome = self
            .resource_request(resource, Some(id), Some(action), Method::PATCH, None)
            .await?;
        Ok(into_value(outcome))
    }

    async fn delete(&self, resource: Resource, id: i64) -> Result<bool, ApiError> {
        let outcome = self
            .resource_request(resource, Some(id), None, Method::DELETE, None)
            .await?;
        Ok(outcome.is_deleted())
    }
}
