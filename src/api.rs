//! HTTP API for the bot service
//!
//! The inbound side of the chat transport: one webhook endpoint that maps
//! transport updates onto the runtime.

mod handlers;
mod types;

pub use handlers::create_router;
pub use types::*;

use crate::runtime::ProductionDispatcher;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<ProductionDispatcher>,
}

impl AppState {
    pub fn new(dispatcher: ProductionDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}
