//! Mock implementations for testing
//!
//! These mocks enable exercising the executor without real I/O.

use super::traits::UserStore;
use crate::ai::{AiError, AiService};
use crate::db::UserRecord;
use crate::transport::{Responder, TransportError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// In-Memory Store
// ============================================================================

/// In-memory user store with injectable write failures
#[derive(Clone, Default)]
pub struct InMemoryStore {
    users: Arc<Mutex<HashMap<i64, UserRecord>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a user record
    pub fn user(&self, identity: i64) -> Option<UserRecord> {
        self.users.lock().unwrap().get(&identity).cloned()
    }

    /// Pre-create a registered user
    pub fn seed_registered(&self, identity: i64) {
        self.users.lock().unwrap().insert(
            identity,
            UserRecord {
                identity,
                display_name: None,
                handle: None,
                contact: Some("+10000000000".to_string()),
                created_at: Utc::now(),
                searches: Vec::new(),
                chats: Vec::new(),
                files: Vec::new(),
            },
        );
    }

    /// When enabled, every write fails with a store error
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), String> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err("injected store failure".to_string())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_or_create(
        &self,
        identity: i64,
        display_name: Option<&str>,
        handle: Option<&str>,
    ) -> Result<UserRecord, String> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.get(&identity) {
            return Ok(user.clone());
        }
        self.check_writable()?;
        let user = UserRecord {
            identity,
            display_name: display_name.map(String::from),
            handle: handle.map(String::from),
            contact: None,
            created_at: Utc::now(),
            searches: Vec::new(),
            chats: Vec::new(),
            files: Vec::new(),
        };
        users.insert(identity, user.clone());
        Ok(user)
    }

    async fn set_contact(&self, identity: i64, phone: &str) -> Result<(), String> {
        self.check_writable()?;
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&identity)
            .ok_or_else(|| format!("User not found: {identity}"))?;
        user.contact = Some(phone.to_string());
        Ok(())
    }

    async fn append_search(
        &self,
        identity: i64,
        query: &str,
        results_count: usize,
    ) -> Result<(), String> {
        self.check_writable()?;
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&identity)
            .ok_or_else(|| format!("User not found: {identity}"))?;
        user.searches.push(crate::db::SearchEntry {
            query: query.to_string(),
            results_count,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    async fn append_chat(
        &self,
        identity: i64,
        user_message: &str,
        bot_response: &str,
    ) -> Result<(), String> {
        self.check_writable()?;
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&identity)
            .ok_or_else(|| format!("User not found: {identity}"))?;
        user.chats.push(crate::db::ChatEntry {
            user_message: user_message.to_string(),
            bot_response: bot_response.to_string(),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    async fn append_file(
        &self,
        identity: i64,
        file_id: &str,
        file_name: Option<&str>,
        file_type: &str,
        analysis: Option<&str>,
    ) -> Result<(), String> {
        self.check_writable()?;
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&identity)
            .ok_or_else(|| format!("User not found: {identity}"))?;
        user.files.push(crate::db::FileEntry {
            file_id: file_id.to_string(),
            file_name: file_name.map(String::from),
            file_type: file_type.to_string(),
            analysis: analysis.map(String::from),
            timestamp: Utc::now(),
        });
        Ok(())
    }
}

// ============================================================================
// Mock AI Service
// ============================================================================

/// Mock AI service that returns queued responses per operation
#[derive(Default)]
pub struct MockAi {
    summaries: Mutex<VecDeque<Result<String, AiError>>>,
    replies: Mutex<VecDeque<Result<String, AiError>>>,
    descriptions: Mutex<VecDeque<Result<String, AiError>>>,
    /// Record of all calls made: (operation, input)
    calls: Mutex<Vec<(String, String)>>,
}

impl MockAi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_summary(&self, result: Result<String, AiError>) {
        self.summaries.lock().unwrap().push_back(result);
    }

    pub fn queue_reply(&self, result: Result<String, AiError>) {
        self.replies.lock().unwrap().push_back(result);
    }

    pub fn queue_description(&self, result: Result<String, AiError>) {
        self.descriptions.lock().unwrap().push_back(result);
    }

    /// Recorded calls
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &str, input: &str) {
        self.calls
            .lock()
            .unwrap()
            .push((op.to_string(), input.to_string()));
    }
}

fn pop(queue: &Mutex<VecDeque<Result<String, AiError>>>) -> Result<String, AiError> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(AiError::network("No mock response queued")))
}

#[async_trait]
impl AiService for MockAi {
    async fn summarize(&self, topic: &str) -> Result<String, AiError> {
        self.record("summarize", topic);
        pop(&self.summaries)
    }

    async fn converse(&self, prompt: &str) -> Result<String, AiError> {
        self.record("converse", prompt);
        pop(&self.replies)
    }

    async fn describe_image(&self, media_type: &str, _data: &str) -> Result<String, AiError> {
        self.record("describe_image", media_type);
        pop(&self.descriptions)
    }
}

// ============================================================================
// Recording Responder
// ============================================================================

/// Records every outbound message instead of sending it
#[derive(Default)]
pub struct RecordingResponder {
    sent: Mutex<Vec<(i64, String)>>,
}

impl RecordingResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages sent so far
    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Text of the most recent message, empty if none
    pub fn last_text(&self) -> String {
        self.sent
            .lock()
            .unwrap()
            .last()
            .map(|(_, text)| text.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Responder for RecordingResponder {
    async fn send_text(&self, identity: i64, text: &str) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push((identity, text.to_string()));
        Ok(())
    }
}
