//! Store schema and record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS users (
    identity INTEGER PRIMARY KEY,
    display_name TEXT,
    handle TEXT,
    contact TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS activity (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    identity INTEGER NOT NULL,
    kind TEXT NOT NULL,
    entry TEXT NOT NULL,
    created_at TEXT NOT NULL,

    FOREIGN KEY (identity) REFERENCES users(identity) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_activity_identity ON activity(identity, id);
CREATE INDEX IF NOT EXISTS idx_activity_kind_time ON activity(kind, created_at);
";

/// Per-user record with its activity logs.
///
/// The logs are append-only: entries are inserted in arrival order and are
/// never mutated or deleted, so each `Vec` here is ordered by capture time.
#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    pub identity: i64,
    pub display_name: Option<String>,
    pub handle: Option<String>,
    /// Verified contact in international format; `None` means unregistered.
    pub contact: Option<String>,
    pub created_at: DateTime<Utc>,
    pub searches: Vec<SearchEntry>,
    pub chats: Vec<ChatEntry>,
    pub files: Vec<FileEntry>,
}

impl UserRecord {
    pub fn is_registered(&self) -> bool {
        self.contact.as_deref().is_some_and(|c| !c.is_empty())
    }
}

/// One completed web search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub query: String,
    pub results_count: usize,
    pub timestamp: DateTime<Utc>,
}

/// One completed chat turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub user_message: String,
    pub bot_response: String,
    pub timestamp: DateTime<Utc>,
}

/// One received file. `file_type` is `"image"` for analyzed photos and the
/// declared MIME type for documents; `analysis` is present only for photos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub file_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Activity log discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Search,
    Chat,
    File,
}

impl ActivityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityKind::Search => "search",
            ActivityKind::Chat => "chat",
            ActivityKind::File => "file",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "search" => Some(ActivityKind::Search),
            "chat" => Some(ActivityKind::Chat),
            "file" => Some(ActivityKind::File),
            _ => None,
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
