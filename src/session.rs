//! Process-wide session tracker
//!
//! Maps each user identity to its current session state. Total over all
//! identities: unknown users are `Idle`. Entries live only as long as the
//! process; a restart silently drops every user back to `Idle`.

use crate::flow::SessionState;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct SessionTracker {
    sessions: RwLock<HashMap<i64, SessionState>>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current session state for an identity, `Idle` if never seen
    pub async fn get(&self, identity: i64) -> SessionState {
        self.sessions
            .read()
            .await
            .get(&identity)
            .cloned()
            .unwrap_or_default()
    }

    /// Unconditionally overwrite an identity's session state. Setting
    /// `Idle` is equivalent to `clear`.
    pub async fn set(&self, identity: i64, state: SessionState) {
        if state.is_idle() {
            self.sessions.write().await.remove(&identity);
        } else {
            self.sessions.write().await.insert(identity, state);
        }
    }

    /// Reset an identity back to `Idle`
    pub async fn clear(&self, identity: i64) {
        self.sessions.write().await.remove(&identity);
    }

    /// Number of users currently inside a flow
    #[allow(dead_code)] // Diagnostics
    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{ChatState, RegistrationState};

    #[tokio::test]
    async fn test_unknown_identity_is_idle() {
        let tracker = SessionTracker::new();
        assert_eq!(tracker.get(1).await, SessionState::Idle);
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let tracker = SessionTracker::new();
        tracker
            .set(1, SessionState::Chat(ChatState::AwaitingMessage))
            .await;
        assert_eq!(
            tracker.get(1).await,
            SessionState::Chat(ChatState::AwaitingMessage)
        );
        // Other identities are unaffected
        assert_eq!(tracker.get(2).await, SessionState::Idle);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let tracker = SessionTracker::new();
        tracker
            .set(1, SessionState::Registration(RegistrationState::AwaitingContact))
            .await;
        tracker
            .set(1, SessionState::Chat(ChatState::AwaitingMessage))
            .await;
        assert_eq!(
            tracker.get(1).await,
            SessionState::Chat(ChatState::AwaitingMessage)
        );
    }

    #[tokio::test]
    async fn test_clear_resets_to_idle() {
        let tracker = SessionTracker::new();
        tracker
            .set(1, SessionState::Chat(ChatState::AwaitingMessage))
            .await;
        tracker.clear(1).await;
        assert_eq!(tracker.get(1).await, SessionState::Idle);
        assert_eq!(tracker.active_count().await, 0);
    }

    #[tokio::test]
    async fn test_set_idle_is_clear() {
        let tracker = SessionTracker::new();
        tracker
            .set(1, SessionState::Chat(ChatState::AwaitingMessage))
            .await;
        tracker.set(1, SessionState::Idle).await;
        assert_eq!(tracker.active_count().await, 0);
    }
}
