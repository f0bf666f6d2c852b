//! Pure state transition function
//!
//! All flow logic lives here: entry triggers, per-state input handling,
//! fallback handling, and the gating of log appends on collaborator
//! success. The function never performs I/O; the runtime executes the
//! returned effects.

use super::state::{ChatState, RegistrationState, SessionState, UserContext, WebSearchState};
use super::{Effect, Event};
use crate::links::search_links;
use crate::transport::{Command, MessageShape};
use thiserror::Error;

const USAGE_NOTICE: &str =
    "Commands: /start to register, /websearch to search, /chat to talk. \
     You can also send a photo or document.";
const ALREADY_REGISTERED: &str =
    "Welcome back! You're already registered. Use /websearch to start searching.";
const CONTACT_PROMPT: &str =
    "Welcome! Please share your contact or type your phone number in \
     international format (+1234567890):";
const CONTACT_FORMAT_REPROMPT: &str =
    "Please use international format starting with + (e.g., +1234567890).";
const CONTACT_INVALID_REPROMPT: &str = "Invalid phone number format. Please try again.";
const REGISTRATION_DONE: &str =
    "Registration complete! You can now use /websearch to start searching.";
const REGISTRATION_REQUIRED: &str = "Please complete registration first using /start.";
const QUERY_PROMPT: &str = "Please enter your search query:";
const SEARCHING_NOTICE: &str = "Searching and generating summary...";
const SUMMARY_PLACEHOLDER: &str = "Could not generate search summary.";
const CHAT_PROMPT: &str = "You can now chat with me! Send your message or /end to finish.";
const CHAT_ENDED: &str = "Chat ended. You can start a new chat with /chat.";
const CHAT_APOLOGY: &str = "Sorry, I encountered an error. Please try again.";
const FILE_APOLOGY: &str = "Sorry, I encountered an error processing your file.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub next: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(next: SessionState) -> Self {
        Self {
            next,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Invalid transition: no handler for {event} in {flow}/{state}")]
    InvalidTransition {
        flow: &'static str,
        state: &'static str,
        event: &'static str,
    },
}

/// Pure transition function.
///
/// Given the same state, context, and event it always produces the same
/// next state and effects. Log-append effects are emitted only on the
/// success outcome of the side-effecting step they record, which is what
/// makes the "no log entry on a failed AI call" contract hold.
pub fn transition(
    state: &SessionState,
    ctx: &UserContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Ungated uploads: handled in every state, session untouched
        // ============================================================
        (state, Event::Message(MessageShape::Photo(photo))) => {
            if !ctx.registered {
                return Ok(TransitionResult::new(state.clone())
                    .with_effect(Effect::reply(REGISTRATION_REQUIRED)));
            }
            Ok(
                TransitionResult::new(state.clone()).with_effect(Effect::RequestImageDescription {
                    file_id: photo.file_id,
                    media_type: photo.media_type,
                    data: photo.data,
                }),
            )
        }

        (state, Event::Message(MessageShape::Document(doc))) => {
            if !ctx.registered {
                return Ok(TransitionResult::new(state.clone())
                    .with_effect(Effect::reply(REGISTRATION_REQUIRED)));
            }
            let notice = format!(
                "File received: {} ({}). It has been stored.",
                doc.file_name, doc.mime_type
            );
            Ok(TransitionResult::new(state.clone())
                .with_effect(Effect::AppendFile {
                    file_id: doc.file_id,
                    file_name: Some(doc.file_name),
                    file_type: doc.mime_type,
                    analysis: None,
                })
                .with_effect(Effect::reply(notice)))
        }

        (
            state,
            Event::ImageDescribed {
                file_id,
                description,
            },
        ) => Ok(TransitionResult::new(state.clone())
            .with_effect(Effect::AppendFile {
                file_id,
                file_name: None,
                file_type: "image".to_string(),
                analysis: Some(description.clone()),
            })
            .with_effect(Effect::reply(format!("Image analysis:\n\n{description}")))),

        (state, Event::DescribeFailed) => {
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::reply(FILE_APOLOGY)))
        }

        // ============================================================
        // Idle: flow entry triggers, registration first
        // ============================================================
        (SessionState::Idle, Event::Message(MessageShape::Command(Command::Start))) => {
            if ctx.registered {
                // Entry short-circuits for registered users
                Ok(TransitionResult::new(SessionState::Idle)
                    .with_effect(Effect::reply(ALREADY_REGISTERED)))
            } else {
                Ok(
                    TransitionResult::new(SessionState::Registration(
                        RegistrationState::AwaitingContact,
                    ))
                    .with_effect(Effect::reply(CONTACT_PROMPT)),
                )
            }
        }

        (SessionState::Idle, Event::Message(MessageShape::Command(Command::WebSearch))) => {
            if ctx.registered {
                Ok(
                    TransitionResult::new(SessionState::WebSearch(WebSearchState::AwaitingQuery))
                        .with_effect(Effect::reply(QUERY_PROMPT)),
                )
            } else {
                Ok(TransitionResult::new(SessionState::Idle)
                    .with_effect(Effect::reply(REGISTRATION_REQUIRED)))
            }
        }

        (SessionState::Idle, Event::Message(MessageShape::Command(Command::Chat))) => {
            if ctx.registered {
                Ok(
                    TransitionResult::new(SessionState::Chat(ChatState::AwaitingMessage))
                        .with_effect(Effect::reply(CHAT_PROMPT)),
                )
            } else {
                Ok(TransitionResult::new(SessionState::Idle)
                    .with_effect(Effect::reply(REGISTRATION_REQUIRED)))
            }
        }

        // Everything else while idle goes to the ungated usage notice
        (SessionState::Idle, Event::Message(_)) => {
            Ok(TransitionResult::new(SessionState::Idle).with_effect(Effect::reply(USAGE_NOTICE)))
        }

        // ============================================================
        // Registration: awaiting contact
        // ============================================================
        (
            SessionState::Registration(RegistrationState::AwaitingContact),
            Event::Message(MessageShape::Contact(contact)),
        ) => {
            let phone = normalize_contact(&contact.phone_number);
            Ok(TransitionResult::new(SessionState::Idle)
                .with_effect(Effect::SetContact { phone })
                .with_effect(Effect::reply(REGISTRATION_DONE)))
        }

        (
            SessionState::Registration(RegistrationState::AwaitingContact),
            Event::Message(MessageShape::Text(text)),
        ) => match validate_phone(&text) {
            Some(phone) => Ok(TransitionResult::new(SessionState::Idle)
                .with_effect(Effect::SetContact { phone })
                .with_effect(Effect::reply(REGISTRATION_DONE))),
            None => {
                let reprompt = if text.trim().starts_with('+') {
                    CONTACT_INVALID_REPROMPT
                } else {
                    CONTACT_FORMAT_REPROMPT
                };
                Ok(TransitionResult::new(SessionState::Registration(
                    RegistrationState::AwaitingContact,
                ))
                .with_effect(Effect::reply(reprompt)))
            }
        },

        // Repeated unrecognized input never advances the state
        (SessionState::Registration(RegistrationState::AwaitingContact), Event::Message(_)) => Ok(
            TransitionResult::new(SessionState::Registration(RegistrationState::AwaitingContact))
                .with_effect(Effect::reply(CONTACT_FORMAT_REPROMPT)),
        ),

        // ============================================================
        // Web search: awaiting query
        // ============================================================
        (
            SessionState::WebSearch(WebSearchState::AwaitingQuery),
            Event::Message(MessageShape::Text(query)),
        ) => Ok(
            TransitionResult::new(SessionState::WebSearch(WebSearchState::AwaitingQuery))
                .with_effect(Effect::reply(SEARCHING_NOTICE))
                .with_effect(Effect::RequestSummary { query }),
        ),

        (
            SessionState::WebSearch(WebSearchState::AwaitingQuery),
            Event::SummaryReady { query, summary },
        ) => Ok(complete_search(query, summary)),

        // The search itself did not fail, only the summary: still complete
        // the flow and still log the search.
        (SessionState::WebSearch(WebSearchState::AwaitingQuery), Event::SummaryFailed { query }) => {
            Ok(complete_search(query, SUMMARY_PLACEHOLDER.to_string()))
        }

        (SessionState::WebSearch(WebSearchState::AwaitingQuery), Event::Message(_)) => Ok(
            TransitionResult::new(SessionState::WebSearch(WebSearchState::AwaitingQuery))
                .with_effect(Effect::reply(QUERY_PROMPT)),
        ),

        // ============================================================
        // Chat: awaiting message, /end fallback first
        // ============================================================
        (
            SessionState::Chat(ChatState::AwaitingMessage),
            Event::Message(MessageShape::Command(Command::End)),
        ) => Ok(TransitionResult::new(SessionState::Idle).with_effect(Effect::reply(CHAT_ENDED))),

        (
            SessionState::Chat(ChatState::AwaitingMessage),
            Event::Message(MessageShape::Text(text)),
        ) => Ok(
            TransitionResult::new(SessionState::Chat(ChatState::AwaitingMessage))
                .with_effect(Effect::RequestChatReply { prompt: text }),
        ),

        (SessionState::Chat(ChatState::AwaitingMessage), Event::ChatReply { prompt, reply }) => Ok(
            TransitionResult::new(SessionState::Chat(ChatState::AwaitingMessage))
                .with_effect(Effect::AppendChat {
                    user_message: prompt,
                    bot_response: reply.clone(),
                })
                .with_effect(Effect::reply(reply)),
        ),

        // No log entry for the failed turn; the user may retry it.
        (SessionState::Chat(ChatState::AwaitingMessage), Event::ChatFailed) => Ok(
            TransitionResult::new(SessionState::Chat(ChatState::AwaitingMessage))
                .with_effect(Effect::reply(CHAT_APOLOGY)),
        ),

        (SessionState::Chat(ChatState::AwaitingMessage), Event::Message(_)) => Ok(
            TransitionResult::new(SessionState::Chat(ChatState::AwaitingMessage))
                .with_effect(Effect::reply(CHAT_PROMPT)),
        ),

        // ============================================================
        // Anything else is an out-of-place outcome event
        // ============================================================
        (state, event) => Err(TransitionError::InvalidTransition {
            flow: state.flow_name(),
            state: state.state_name(),
            event: event.name(),
        }),
    }
}

fn complete_search(query: String, summary: String) -> TransitionResult {
    let links = search_links(&query);
    TransitionResult::new(SessionState::Idle)
        .with_effect(Effect::AppendSearch {
            query: query.clone(),
            results_count: links.len(),
        })
        .with_effect(Effect::ReplySearchResults {
            query,
            summary,
            links,
        })
}

/// Normalize a structured contact payload to `+`-prefixed form
fn normalize_contact(phone: &str) -> String {
    let trimmed = phone.trim();
    if trimmed.starts_with('+') {
        trimmed.to_string()
    } else {
        format!("+{trimmed}")
    }
}

/// Validate a manually typed phone number: `+`, then at least 9 digits.
fn validate_phone(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let rest = trimmed.strip_prefix('+')?;
    if rest.len() >= 9 && rest.chars().all(|c| c.is_ascii_digit()) {
        Some(trimmed.to_string())
    } else {
        None
    }
}
