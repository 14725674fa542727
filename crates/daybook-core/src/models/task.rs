use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default, alias = "dueDate")]
    pub due_date: Option<String>,
    /// `true` once completed
    #[serde(default)]
    pub status: bool,
}

impl Task {
    pub fn status_label(&self) -> &'static str {
        if self.status {
            "completed"
        } else {
            "pending"
        }
    }
}

/// Body for creating or replacing a task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskInput {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "dueDate", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskInput {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            description: None,
            category: None,
            due_date: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Category {
    pub id: i64,
    #[serde(alias = "title")]
    pub name: String,
}
