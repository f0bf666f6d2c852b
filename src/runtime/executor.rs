//! Per-user flow executor
//!
//! Consumes one user's messages in arrival order, runs the pure transition
//! for each event, executes the resulting effects, and commits the new
//! session state. AI calls and store writes are the only suspension
//! points.

use super::traits::UserStore;
use crate::ai::AiService;
use crate::flow::{transition, Effect, Event, UserContext};
use crate::links::render_search_reply;
use crate::session::SessionTracker;
use crate::transport::{Incoming, Responder};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;

const STORE_FAILURE_NOTICE: &str = "Something went wrong on our side. Please try again.";

/// Worker that owns all processing for one user identity
pub struct UserWorker<S, A, R>
where
    S: UserStore + 'static,
    A: AiService + 'static,
    R: Responder + 'static,
{
    identity: i64,
    store: S,
    ai: Arc<A>,
    responder: Arc<R>,
    sessions: Arc<SessionTracker>,
    rx: mpsc::Receiver<Incoming>,
}

impl<S, A, R> UserWorker<S, A, R>
where
    S: UserStore + 'static,
    A: AiService + 'static,
    R: Responder + 'static,
{
    pub fn new(
        identity: i64,
        store: S,
        ai: Arc<A>,
        responder: Arc<R>,
        sessions: Arc<SessionTracker>,
        rx: mpsc::Receiver<Incoming>,
    ) -> Self {
        Self {
            identity,
            store,
            ai,
            responder,
            sessions,
            rx,
        }
    }

    pub async fn run(mut self) {
        while let Some(incoming) = self.rx.recv().await {
            self.process(incoming).await;
        }
    }

    /// Handle one inbound message to completion, including any AI-outcome
    /// events it chains into.
    async fn process(&mut self, incoming: Incoming) {
        // A record exists for every identity that has ever sent a message.
        let user = match self
            .store
            .find_or_create(
                self.identity,
                incoming.display_name.as_deref(),
                incoming.handle.as_deref(),
            )
            .await
        {
            Ok(user) => user,
            Err(e) => {
                tracing::error!(
                    identity = self.identity,
                    message_id = %incoming.message_id,
                    error = %e,
                    "Failed to load user record"
                );
                self.notify(STORE_FAILURE_NOTICE).await;
                return;
            }
        };
        let mut registered = user.is_registered();

        let mut queue = VecDeque::new();
        queue.push_back(Event::Message(incoming.shape));

        while let Some(event) = queue.pop_front() {
            let state = self.sessions.get(self.identity).await;
            let excerpt = event_excerpt(&event);
            let ctx = UserContext::new(self.identity, registered);

            // Pure decision
            let result = match transition(&state, &ctx, event) {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(
                        identity = self.identity,
                        flow = state.flow_name(),
                        state = state.state_name(),
                        excerpt = %excerpt,
                        error = %e,
                        "Dropping event"
                    );
                    continue;
                }
            };

            // Side effects, in order. A failed store write aborts the rest
            // and leaves the session state uncommitted, so the user's next
            // message is treated consistently.
            let mut write_failed = false;
            for effect in result.effects {
                if let Err(e) = self
                    .execute_effect(effect, &mut queue, &mut registered)
                    .await
                {
                    tracing::error!(
                        identity = self.identity,
                        flow = state.flow_name(),
                        state = state.state_name(),
                        excerpt = %excerpt,
                        error = %e,
                        "Store write failed"
                    );
                    self.notify(STORE_FAILURE_NOTICE).await;
                    write_failed = true;
                    break;
                }
            }

            if !write_failed {
                self.sessions.set(self.identity, result.next).await;
            }
        }
    }

    /// Execute one effect. Store errors propagate; AI failures become
    /// outcome events; transport failures are logged and swallowed.
    async fn execute_effect(
        &self,
        effect: Effect,
        queue: &mut VecDeque<Event>,
        registered: &mut bool,
    ) -> Result<(), String> {
        match effect {
            Effect::Reply { text } => {
                self.notify(&text).await;
                Ok(())
            }

            Effect::ReplySearchResults {
                query,
                summary,
                links,
            } => {
                let text = render_search_reply(&query, &summary, &links);
                self.notify(&text).await;
                Ok(())
            }

            Effect::SetContact { phone } => {
                self.store.set_contact(self.identity, &phone).await?;
                *registered = true;
                Ok(())
            }

            Effect::AppendSearch {
                query,
                results_count,
            } => {
                self.store
                    .append_search(self.identity, &query, results_count)
                    .await
            }

            Effect::AppendChat {
                user_message,
                bot_response,
            } => {
                self.store
                    .append_chat(self.identity, &user_message, &bot_response)
                    .await
            }

            Effect::AppendFile {
                file_id,
                file_name,
                file_type,
                analysis,
            } => {
                self.store
                    .append_file(
                        self.identity,
                        &file_id,
                        file_name.as_deref(),
                        &file_type,
                        analysis.as_deref(),
                    )
                    .await
            }

            Effect::RequestSummary { query } => {
                match self.ai.summarize(&query).await {
                    Ok(summary) => queue.push_back(Event::SummaryReady { query, summary }),
                    Err(e) => {
                        tracing::warn!(
                            identity = self.identity,
                            error = %e,
                            "Summary generation failed"
                        );
                        queue.push_back(Event::SummaryFailed { query });
                    }
                }
                Ok(())
            }

            Effect::RequestChatReply { prompt } => {
                match self.ai.converse(&prompt).await {
                    Ok(reply) => queue.push_back(Event::ChatReply { prompt, reply }),
                    Err(e) => {
                        tracing::warn!(
                            identity = self.identity,
                            error = %e,
                            "Chat completion failed"
                        );
                        queue.push_back(Event::ChatFailed);
                    }
                }
                Ok(())
            }

            Effect::RequestImageDescription {
                file_id,
                media_type,
                data,
            } => {
                match self.ai.describe_image(&media_type, &data).await {
                    Ok(description) => queue.push_back(Event::ImageDescribed {
                        file_id,
                        description,
                    }),
                    Err(e) => {
                        tracing::warn!(
                            identity = self.identity,
                            file_id = %file_id,
                            error = %e,
                            "Image description failed"
                        );
                        queue.push_back(Event::DescribeFailed);
                    }
                }
                Ok(())
            }
        }
    }

    async fn notify(&self, text: &str) {
        if let Err(e) = self.responder.send_text(self.identity, text).await {
            tracing::warn!(identity = self.identity, error = %e, "Failed to send reply");
        }
    }
}

/// Short excerpt of an event for diagnostics, without echoing full content
fn event_excerpt(event: &Event) -> String {
    let text = match event {
        Event::Message(shape) => return shape.kind().to_string(),
        Event::SummaryReady { query, .. } | Event::SummaryFailed { query } => query,
        Event::ChatReply { prompt, .. } => prompt,
        Event::ChatFailed => return "chat_failed".to_string(),
        Event::ImageDescribed { file_id, .. } => file_id,
        Event::DescribeFailed => return "describe_failed".to_string(),
    };
    let mut excerpt: String = text.chars().take(48).collect();
    if excerpt.len() < text.len() {
        excerpt.push('…');
    }
    excerpt
}
