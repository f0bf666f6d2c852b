//! Events that drive session transitions

use crate::transport::MessageShape;

/// Events that trigger state transitions.
///
/// `Message` is an inbound message from the transport; the remaining
/// variants are AI collaborator outcomes fed back by the runtime after it
/// executes a request effect. An AI failure arrives as the corresponding
/// `*Failed` event — it never aborts processing.
#[derive(Debug, Clone)]
pub enum Event {
    Message(MessageShape),

    SummaryReady { query: String, summary: String },
    SummaryFailed { query: String },

    ChatReply { prompt: String, reply: String },
    ChatFailed,

    ImageDescribed { file_id: String, description: String },
    DescribeFailed,
}

impl Event {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Event::Message(shape) => shape.kind(),
            Event::SummaryReady { .. } => "summary_ready",
            Event::SummaryFailed { .. } => "summary_failed",
            Event::ChatReply { .. } => "chat_reply",
            Event::ChatFailed => "chat_failed",
            Event::ImageDescribed { .. } => "image_described",
            Event::DescribeFailed => "describe_failed",
        }
    }
}
