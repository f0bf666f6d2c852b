//! Chat transport boundary
//!
//! Inbound: one delivered message per update — an identity, a message
//! shape, and an opaque message identifier. Outbound: the `Responder`
//! trait, asking the transport to send text back to an identity. The wire
//! protocol on either side belongs to the transport, not the core.

mod http;

pub use http::HttpResponder;

use async_trait::async_trait;
use thiserror::Error;

/// One inbound message, as delivered by the transport binding
#[derive(Debug, Clone)]
pub struct Incoming {
    pub identity: i64,
    /// Opaque per-message identifier, used for diagnostics only
    pub message_id: String,
    pub display_name: Option<String>,
    pub handle: Option<String>,
    pub shape: MessageShape,
}

/// The recognized shapes of an inbound message
#[derive(Debug, Clone, PartialEq)]
pub enum MessageShape {
    /// Free text (anything not starting with `/`)
    Text(String),
    /// A command literal such as `/start`
    Command(Command),
    /// Structured contact payload
    Contact(ContactPayload),
    /// Photo upload with inline image data
    Photo(PhotoRef),
    /// Any other document upload
    Document(DocumentRef),
}

impl MessageShape {
    /// Classify raw message text as a command or free text
    pub fn from_text(text: &str) -> Self {
        match Command::parse(text) {
            Some(cmd) => MessageShape::Command(cmd),
            None => MessageShape::Text(text.to_string()),
        }
    }

    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            MessageShape::Text(_) => "text",
            MessageShape::Command(_) => "command",
            MessageShape::Contact(_) => "contact",
            MessageShape::Photo(_) => "photo",
            MessageShape::Document(_) => "document",
        }
    }
}

/// Command literals. Parsing is case-insensitive; unrecognized commands
/// are preserved by name for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    WebSearch,
    Chat,
    End,
    Unknown(String),
}

impl Command {
    /// Parse a command from message text. Returns `None` when the text is
    /// not a command at all (no leading `/`).
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        let rest = trimmed.strip_prefix('/')?;
        // First token only; trailing words are ignored
        let name = rest.split_whitespace().next().unwrap_or("");
        let lower = name.to_ascii_lowercase();
        Some(match lower.as_str() {
            "start" => Command::Start,
            "websearch" => Command::WebSearch,
            "chat" => Command::Chat,
            "end" => Command::End,
            _ => Command::Unknown(lower),
        })
    }
}

/// Structured contact payload shared through the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactPayload {
    pub phone_number: String,
}

/// Photo reference with inline base64 image data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRef {
    pub file_id: String,
    pub media_type: String,
    pub data: String,
}

/// Document reference (no content transfer; metadata only)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub file_id: String,
    pub file_name: String,
    pub mime_type: String,
}

/// Transport error with enough classification for logging
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Transport network error: {0}")]
    Network(String),
    #[error("Transport rejected message: {0}")]
    Rejected(String),
}

/// Outbound side of the transport: send text (optionally link-bearing)
/// or a notice back to an identity.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn send_text(&self, identity: i64, text: &str) -> Result<(), TransportError>;
}

#[async_trait]
impl<T: Responder + ?Sized> Responder for std::sync::Arc<T> {
    async fn send_text(&self, identity: i64, text: &str) -> Result<(), TransportError> {
        (**self).send_text(identity, text).await
    }
}
