//! User record store
//!
//! Keyed per-user documents: identity, verified contact, and three
//! append-only activity logs (searches, chat turns, file events). Every
//! operation is a single statement, atomic per call.

mod schema;

pub use schema::*;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("User not found: {0}")]
    UserNotFound(i64),
    #[error("Invalid activity payload: {0}")]
    Payload(#[from] serde_json::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe store handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create the store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory store (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== User Operations ====================

    /// Look up a user by identity, with all activity logs attached
    pub fn find_user(&self, identity: i64) -> DbResult<Option<UserRecord>> {
        let conn = self.conn.lock().unwrap();

        let row = conn
            .query_row(
                "SELECT identity, display_name, handle, contact, created_at
                 FROM users WHERE identity = ?1",
                params![identity],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((identity, display_name, handle, contact, created_at)) = row else {
            return Ok(None);
        };

        let mut record = UserRecord {
            identity,
            display_name,
            handle,
            contact,
            created_at: parse_datetime(&created_at),
            searches: Vec::new(),
            chats: Vec::new(),
            files: Vec::new(),
        };
        load_activity(&conn, &mut record)?;
        Ok(Some(record))
    }

    /// Create a user record. The contact starts unset; activity logs start
    /// empty.
    pub fn insert_user(
        &self,
        identity: i64,
        display_name: Option<&str>,
        handle: Option<&str>,
    ) -> DbResult<UserRecord> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO users (identity, display_name, handle, contact, created_at)
             VALUES (?1, ?2, ?3, NULL, ?4)",
            params![identity, display_name, handle, now.to_rfc3339()],
        )?;

        Ok(UserRecord {
            identity,
            display_name: display_name.map(String::from),
            handle: handle.map(String::from),
            contact: None,
            created_at: now,
            searches: Vec::new(),
            chats: Vec::new(),
            files: Vec::new(),
        })
    }

    /// Set the verified contact for a user
    pub fn set_contact(&self, identity: i64, contact: &str) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();

        let updated = conn.execute(
            "UPDATE users SET contact = ?1 WHERE identity = ?2",
            params![contact, identity],
        )?;

        if updated == 0 {
            return Err(DbError::UserNotFound(identity));
        }
        Ok(())
    }

    // ==================== Activity Logs ====================

    /// Append a search to the user's search log
    pub fn append_search(
        &self,
        identity: i64,
        query: &str,
        results_count: usize,
    ) -> DbResult<SearchEntry> {
        let entry = SearchEntry {
            query: query.to_string(),
            results_count,
            timestamp: Utc::now(),
        };
        self.append_entry(identity, ActivityKind::Search, &entry, entry.timestamp)?;
        Ok(entry)
    }

    /// Append a chat turn to the user's chat log
    pub fn append_chat(
        &self,
        identity: i64,
        user_message: &str,
        bot_response: &str,
    ) -> DbResult<ChatEntry> {
        let entry = ChatEntry {
            user_message: user_message.to_string(),
            bot_response: bot_response.to_string(),
            timestamp: Utc::now(),
        };
        self.append_entry(identity, ActivityKind::Chat, &entry, entry.timestamp)?;
        Ok(entry)
    }

    /// Append a file event to the user's file log
    pub fn append_file(
        &self,
        identity: i64,
        file_id: &str,
        file_name: Option<&str>,
        file_type: &str,
        analysis: Option<&str>,
    ) -> DbResult<FileEntry> {
        let entry = FileEntry {
            file_id: file_id.to_string(),
            file_name: file_name.map(String::from),
            file_type: file_type.to_string(),
            analysis: analysis.map(String::from),
            timestamp: Utc::now(),
        };
        self.append_entry(identity, ActivityKind::File, &entry, entry.timestamp)?;
        Ok(entry)
    }

    /// Single atomic INSERT; concurrent appends for one user never overwrite
    /// each other.
    fn append_entry<T: serde::Serialize>(
        &self,
        identity: i64,
        kind: ActivityKind,
        entry: &T,
        timestamp: DateTime<Utc>,
    ) -> DbResult<()> {
        let payload = serde_json::to_string(entry)?;
        let conn = self.conn.lock().unwrap();

        let inserted = conn.execute(
            "INSERT INTO activity (identity, kind, entry, created_at)
             SELECT ?1, ?2, ?3, ?4 WHERE EXISTS (SELECT 1 FROM users WHERE identity = ?1)",
            params![identity, kind.as_str(), payload, timestamp.to_rfc3339()],
        )?;

        if inserted == 0 {
            return Err(DbError::UserNotFound(identity));
        }
        Ok(())
    }

    // ==================== Dashboard Export ====================

    /// Bulk export of every user record with logs, for the dashboard
    pub fn all_users(&self) -> DbResult<Vec<UserRecord>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT identity, display_name, handle, contact, created_at
             FROM users ORDER BY identity ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut users = Vec::new();
        for row in rows {
            let (identity, display_name, handle, contact, created_at) = row?;
            users.push(UserRecord {
                identity,
                display_name,
                handle,
                contact,
                created_at: parse_datetime(&created_at),
                searches: Vec::new(),
                chats: Vec::new(),
                files: Vec::new(),
            });
        }

        for user in &mut users {
            load_activity(&conn, user)?;
        }
        Ok(users)
    }
}

/// Load all activity rows for a user into the record's typed logs,
/// preserving insertion order.
fn load_activity(conn: &Connection, record: &mut UserRecord) -> DbResult<()> {
    let identity = record.identity;
    let mut stmt = conn.prepare(
        "SELECT kind, entry FROM activity WHERE identity = ?1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![identity], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    for row in rows {
        let (kind, payload) = row?;
        match ActivityKind::parse(&kind) {
            Some(ActivityKind::Search) => record.searches.push(serde_json::from_str(&payload)?),
            Some(ActivityKind::Chat) => record.chats.push(serde_json::from_str(&payload)?),
            Some(ActivityKind::File) => record.files.push(serde_json::from_str(&payload)?),
            None => {
                tracing::warn!(identity = record.identity, kind = %kind, "Unknown activity kind");
            }
        }
    }
    Ok(())
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_find_user() {
        let db = Database::open_in_memory().unwrap();

        let user = db.insert_user(42, Some("Ada"), Some("ada")).unwrap();
        assert_eq!(user.identity, 42);
        assert!(user.contact.is_none());
        assert!(!user.is_registered());

        let fetched = db.find_user(42).unwrap().unwrap();
        assert_eq!(fetched.display_name.as_deref(), Some("Ada"));
        assert_eq!(fetched.handle.as_deref(), Some("ada"));
        assert!(fetched.searches.is_empty());
    }

    #[test]
    fn test_find_unknown_user_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.find_user(7).unwrap().is_none());
    }

    #[test]
    fn test_set_contact() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(1, None, None).unwrap();

        db.set_contact(1, "+14155550123").unwrap();
        let user = db.find_user(1).unwrap().unwrap();
        assert_eq!(user.contact.as_deref(), Some("+14155550123"));
        assert!(user.is_registered());
    }

    #[test]
    fn test_set_contact_unknown_user() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.set_contact(99, "+14155550123"),
            Err(DbError::UserNotFound(99))
        ));
    }

    #[test]
    fn test_logs_grow_in_order() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(1, None, None).unwrap();

        db.append_search(1, "rust ownership", 3).unwrap();
        db.append_search(1, "borrow checker", 3).unwrap();
        db.append_chat(1, "hi", "hello!").unwrap();
        db.append_file(1, "f-1", Some("notes.pdf"), "application/pdf", None)
            .unwrap();
        db.append_file(1, "f-2", None, "image", Some("a cat"))
            .unwrap();

        let user = db.find_user(1).unwrap().unwrap();
        assert_eq!(user.searches.len(), 2);
        assert_eq!(user.searches[0].query, "rust ownership");
        assert_eq!(user.searches[0].results_count, 3);
        assert_eq!(user.searches[1].query, "borrow checker");
        assert!(user.searches[0].timestamp <= user.searches[1].timestamp);

        assert_eq!(user.chats.len(), 1);
        assert_eq!(user.chats[0].bot_response, "hello!");

        assert_eq!(user.files.len(), 2);
        assert_eq!(user.files[0].file_name.as_deref(), Some("notes.pdf"));
        assert_eq!(user.files[1].file_type, "image");
        assert_eq!(user.files[1].analysis.as_deref(), Some("a cat"));
    }

    #[test]
    fn test_append_for_unknown_user_fails() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.append_search(5, "q", 3),
            Err(DbError::UserNotFound(5))
        ));
    }

    #[test]
    fn test_all_users_export() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(1, Some("Ada"), None).unwrap();
        db.insert_user(2, Some("Grace"), None).unwrap();
        db.set_contact(2, "+19999999999").unwrap();
        db.append_chat(2, "hi", "hello").unwrap();

        let users = db.all_users().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].identity, 1);
        assert_eq!(users[1].identity, 2);
        assert_eq!(users[1].chats.len(), 1);
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("concierge.db");

        {
            let db = Database::open(&path).unwrap();
            db.insert_user(1, None, None).unwrap();
            db.set_contact(1, "+14155550123").unwrap();
        }

        // Reopen and confirm the record survived
        let db = Database::open(&path).unwrap();
        let user = db.find_user(1).unwrap().unwrap();
        assert_eq!(user.contact.as_deref(), Some("+14155550123"));
    }
}
