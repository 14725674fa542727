//! Data models for the daybook API.
//!
//! This module contains the request and response shapes for:
//!
//! - Authentication: `LoginRequest`, `Registration`, `AuthResponse`
//! - Tasks and their categories: `Task`, `TaskInput`, `Category`
//! - Expenses: `Expense`, `ExpenseInput`, `ExpenseCategory`, `ExpenseDashboard`
//! - Notes: `Note`, `NoteInput`, `NoteQuery`, `NotePage`
//!
//! Response models are lenient: most fields are optional so that additions
//! on the server side never break decoding.

pub mod auth;
pub mod expense;
pub mod note;
pub mod task;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

pub use auth::{AuthResponse, LoginRequest, Registration};
pub use expense::{
    CategoryTotal, Expense, ExpenseCategory, ExpenseDashboard, ExpenseInput, ExpenseSummary,
    FormattedAmount,
};
pub use note::{Note, NoteInput, NotePage, NoteQuery, NoteStatus};
pub use task::{Category, Task, TaskInput};

/// Decode a list response that is either a bare array or wrapped in `data`.
pub fn parse_list<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, serde_json::Error> {
    #[derive(Deserialize)]
    struct Wrapper<T> {
        data: Vec<T>,
    }

    if value.is_array() {
        return serde_json::from_value(value);
    }
    let wrapper: Wrapper<T> = serde_json::from_value(value)?;
    Ok(wrapper.data)
}

/// Decode a single record that is either bare or wrapped in `data`.
pub fn parse_record<T: DeserializeOwned>(value: Value) -> Result<T, serde_json::Error> {
    match value {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("data") => {
            serde_json::from_value(map.remove("data").unwrap_or(Value::Null))
        }
        other => serde_json::from_value(other),
    }
}
