//! Session state types

use serde::{Deserialize, Serialize};

/// A user's current position in the conversation: the active flow and the
/// input it expects next, or `Idle` when no flow is active.
///
/// Session state lives only in the process; on restart every user drops
/// back to `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "flow", content = "state", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Registration(RegistrationState),
    WebSearch(WebSearchState),
    Chat(ChatState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationState {
    AwaitingContact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebSearchState {
    AwaitingQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatState {
    AwaitingMessage,
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    /// Active flow name, for logging
    pub fn flow_name(&self) -> &'static str {
        match self {
            SessionState::Idle => "none",
            SessionState::Registration(_) => "registration",
            SessionState::WebSearch(_) => "websearch",
            SessionState::Chat(_) => "chat",
        }
    }

    /// Flow-scoped state name, for logging
    pub fn state_name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Registration(RegistrationState::AwaitingContact) => "awaiting_contact",
            SessionState::WebSearch(WebSearchState::AwaitingQuery) => "awaiting_query",
            SessionState::Chat(ChatState::AwaitingMessage) => "awaiting_message",
        }
    }
}

/// Per-message context for the transition function: who is talking and
/// whether they have completed registration.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub identity: i64,
    pub registered: bool,
}

impl UserContext {
    pub fn new(identity: i64, registered: bool) -> Self {
        Self {
            identity,
            registered,
        }
    }
}
