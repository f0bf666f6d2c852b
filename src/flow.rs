//! Conversation flow state machine
//!
//! Pure state transitions: given the user's current session state and an
//! event, compute the next state and the effects to run. All I/O lives in
//! the runtime.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{ChatState, RegistrationState, SessionState, UserContext, WebSearchState};
pub use transition::{transition, TransitionError, TransitionResult};
