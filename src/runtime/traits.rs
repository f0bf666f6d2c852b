//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::db::{Database, UserRecord};
use async_trait::async_trait;
use std::sync::Arc;

/// Storage for user records and their activity logs
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch the user record, creating it on first contact
    async fn find_or_create(
        &self,
        identity: i64,
        display_name: Option<&str>,
        handle: Option<&str>,
    ) -> Result<UserRecord, String>;

    /// Persist the verified contact
    async fn set_contact(&self, identity: i64, phone: &str) -> Result<(), String>;

    /// Append to the search log
    async fn append_search(
        &self,
        identity: i64,
        query: &str,
        results_count: usize,
    ) -> Result<(), String>;

    /// Append to the chat log
    async fn append_chat(
        &self,
        identity: i64,
        user_message: &str,
        bot_response: &str,
    ) -> Result<(), String>;

    /// Append to the file log
    async fn append_file(
        &self,
        identity: i64,
        file_id: &str,
        file_name: Option<&str>,
        file_type: &str,
        analysis: Option<&str>,
    ) -> Result<(), String>;
}

#[async_trait]
impl<T: UserStore + ?Sized> UserStore for Arc<T> {
    async fn find_or_create(
        &self,
        identity: i64,
        display_name: Option<&str>,
        handle: Option<&str>,
    ) -> Result<UserRecord, String> {
        (**self).find_or_create(identity, display_name, handle).await
    }

    async fn set_contact(&self, identity: i64, phone: &str) -> Result<(), String> {
        (**self).set_contact(identity, phone).await
    }

    async fn append_search(
        &self,
        identity: i64,
        query: &str,
        results_count: usize,
    ) -> Result<(), String> {
        (**self).append_search(identity, query, results_count).await
    }

    async fn append_chat(
        &self,
        identity: i64,
        user_message: &str,
        bot_response: &str,
    ) -> Result<(), String> {
        (**self).append_chat(identity, user_message, bot_response).await
    }

    async fn append_file(
        &self,
        identity: i64,
        file_id: &str,
        file_name: Option<&str>,
        file_type: &str,
        analysis: Option<&str>,
    ) -> Result<(), String> {
        (**self)
            .append_file(identity, file_id, file_name, file_type, analysis)
            .await
    }
}

// ============================================================================
// Production Adapter
// ============================================================================

/// Adapter to use Database as a UserStore
#[derive(Clone)]
pub struct DatabaseStore {
    db: Database,
}

impl DatabaseStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    #[allow(dead_code)] // Useful for tests
    pub fn inner(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl UserStore for DatabaseStore {
    async fn find_or_create(
        &self,
        identity: i64,
        display_name: Option<&str>,
        handle: Option<&str>,
    ) -> Result<UserRecord, String> {
        if let Some(user) = self.db.find_user(identity).map_err(|e| e.to_string())? {
            return Ok(user);
        }
        self.db
            .insert_user(identity, display_name, handle)
            .map_err(|e| e.to_string())
    }

    async fn set_contact(&self, identity: i64, phone: &str) -> Result<(), String> {
        self.db.set_contact(identity, phone).map_err(|e| e.to_string())
    }

    async fn append_search(
        &self,
        identity: i64,
        query: &str,
        results_count: usize,
    ) -> Result<(), String> {
        self.db
            .append_search(identity, query, results_count)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn append_chat(
        &self,
        identity: i64,
        user_message: &str,
        bot_response: &str,
    ) -> Result<(), String> {
        self.db
            .append_chat(identity, user_message, bot_response)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn append_file(
        &self,
        identity: i64,
        file_id: &str,
        file_name: Option<&str>,
        file_type: &str,
        analysis: Option<&str>,
    ) -> Result<(), String> {
        self.db
            .append_file(identity, file_id, file_name, file_type, analysis)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}
