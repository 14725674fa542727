use serde::{Deserialize, Serialize};

/// Default page size for note listings
pub const DEFAULT_PER_PAGE: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Note {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body for creating or replacing a note.
#[derive(Debug, Clone, Serialize)]
pub struct NoteInput {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NoteStatus {
    #[default]
    Active,
    Archived,
}

impl NoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteStatus::Active => "active",
            NoteStatus::Archived => "archived",
        }
    }
}

impl std::fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filters for `GET /notes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteQuery {
    pub search: Option<String>,
    pub per_page: u32,
    pub page: u32,
    pub status: NoteStatus,
}

impl Default for NoteQuery {
    fn default() -> Self {
        Self {
            search: None,
            per_page: DEFAULT_PER_PAGE,
            page: 1,
            status: NoteStatus::Active,
        }
    }
}

impl NoteQuery {
    /// Query string pairs; `search` is only sent when it has content.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(4);
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search".to_string(), search.to_string()));
        }
        pairs.push(("per_page".to_string(), self.per_page.to_string()));
        pairs.push(("page".to_string(), self.page.to_string()));
        pairs.push(("status".to_string(), self.status.as_str().to_string()));
        pairs
    }
}

/// One page of notes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct NotePage {
    #[serde(default)]
    pub data: Vec<Note>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub last_page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

impl NotePage {
    /// Number of pages at `per_page` notes each, never less than one.
    pub fn total_pages(&self, per_page: u32) -> u64 {
        if per_page == 0 {
            return 1;
        }
        self.total.div_ceil(u64::from(per_page)).max(1)
    }
}
