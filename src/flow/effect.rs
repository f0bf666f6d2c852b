//! Effects produced by state transitions

use crate::links::SearchLink;

/// Effects to be executed after a state transition, in order.
///
/// `Request*` effects call the AI collaborator and feed the outcome back
/// into the state machine as an event. `Set*`/`Append*` effects write to
/// the user record store; a failed store write aborts the remaining
/// effects and the state transition itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send a text or notice back to the user
    Reply { text: String },

    /// Send the combined summary + search links reply
    ReplySearchResults {
        query: String,
        summary: String,
        links: Vec<SearchLink>,
    },

    /// Persist the verified contact
    SetContact { phone: String },

    /// Append to the search log
    AppendSearch { query: String, results_count: usize },

    /// Append to the chat log
    AppendChat {
        user_message: String,
        bot_response: String,
    },

    /// Append to the file log
    AppendFile {
        file_id: String,
        file_name: Option<String>,
        file_type: String,
        analysis: Option<String>,
    },

    /// Ask the AI collaborator for a topic summary
    RequestSummary { query: String },

    /// Ask the AI collaborator for a chat completion
    RequestChatReply { prompt: String },

    /// Ask the AI collaborator to describe an uploaded image
    RequestImageDescription {
        file_id: String,
        media_type: String,
        data: String,
    },
}

impl Effect {
    pub fn reply(text: impl Into<String>) -> Self {
        Effect::Reply { text: text.into() }
    }
}
