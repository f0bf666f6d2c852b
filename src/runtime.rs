//! Runtime for dispatching inbound messages
//!
//! One lightweight worker per user identity, fed by an mpsc channel:
//! messages from a single user are processed strictly in arrival order,
//! while distinct users are handled concurrently.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::UserWorker;
pub use traits::{DatabaseStore, UserStore};

use crate::ai::{AiService, GeminiClient, LoggingService};
use crate::session::SessionTracker;
use crate::transport::{HttpResponder, Incoming, Responder};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Type alias for the production dispatcher with concrete implementations
pub type ProductionDispatcher =
    Dispatcher<DatabaseStore, LoggingService<GeminiClient>, HttpResponder>;

/// Routes each inbound message to its user's worker, creating the worker
/// on first contact.
pub struct Dispatcher<S, A, R>
where
    S: UserStore + Clone + 'static,
    A: AiService + 'static,
    R: Responder + 'static,
{
    store: S,
    ai: Arc<A>,
    responder: Arc<R>,
    sessions: Arc<SessionTracker>,
    workers: RwLock<HashMap<i64, mpsc::Sender<Incoming>>>,
}

impl<S, A, R> Dispatcher<S, A, R>
where
    S: UserStore + Clone + 'static,
    A: AiService + 'static,
    R: Responder + 'static,
{
    pub fn new(store: S, ai: A, responder: R) -> Self {
        Self {
            store,
            ai: Arc::new(ai),
            responder: Arc::new(responder),
            sessions: Arc::new(SessionTracker::new()),
            workers: RwLock::new(HashMap::new()),
        }
    }

    /// The shared session tracker
    pub fn sessions(&self) -> &Arc<SessionTracker> {
        &self.sessions
    }

    /// Enqueue a message for its user's worker
    pub async fn dispatch(&self, incoming: Incoming) -> Result<(), String> {
        let tx = self.sender_for(incoming.identity).await;
        tx.send(incoming)
            .await
            .map_err(|e| format!("Failed to enqueue message: {e}"))
    }

    async fn sender_for(&self, identity: i64) -> mpsc::Sender<Incoming> {
        {
            let workers = self.workers.read().await;
            if let Some(tx) = workers.get(&identity) {
                return tx.clone();
            }
        }

        // Re-check under the write lock so racing messages from one user
        // never get two workers (which would break per-user ordering).
        let mut workers = self.workers.write().await;
        if let Some(tx) = workers.get(&identity) {
            return tx.clone();
        }

        let (tx, rx) = mpsc::channel(32);
        let worker = UserWorker::new(
            identity,
            self.store.clone(),
            self.ai.clone(),
            self.responder.clone(),
            self.sessions.clone(),
            rx,
        );
        tokio::spawn(async move {
            worker.run().await;
            tracing::debug!(identity, "User worker stopped");
        });

        workers.insert(identity, tx.clone());
        tx
    }
}
