//! Property-based tests for the flow state machine

use super::state::*;
use super::transition::*;
use super::{Effect, Event};
use crate::transport::MessageShape;
use proptest::prelude::*;

fn ctx(registered: bool) -> UserContext {
    UserContext::new(7, registered)
}

fn awaiting_contact() -> SessionState {
    SessionState::Registration(RegistrationState::AwaitingContact)
}

fn has_set_contact(effects: &[Effect]) -> bool {
    effects.iter().any(|e| matches!(e, Effect::SetContact { .. }))
}

proptest! {
    // A well-formed phone number always completes registration with the
    // exact trimmed input.
    #[test]
    fn valid_phone_always_registers(digits in "[0-9]{9,14}") {
        let text = format!("+{digits}");
        let result = transition(
            &awaiting_contact(),
            &ctx(false),
            Event::Message(MessageShape::Text(text.clone())),
        )
        .unwrap();

        prop_assert_eq!(&result.next, &SessionState::Idle);
        prop_assert!(
            result.effects.contains(&Effect::SetContact { phone: text }),
            "expected a SetContact effect"
        );
    }

    // Anything that is not `+` followed by at least 9 digits re-prompts,
    // stays in awaiting-contact, and never writes a contact.
    #[test]
    fn invalid_phone_never_registers(text in "[a-zA-Z0-9 +._-]{0,20}") {
        let trimmed = text.trim();
        let valid = trimmed
            .strip_prefix('+')
            .is_some_and(|rest| rest.len() >= 9 && rest.chars().all(|c| c.is_ascii_digit()));
        prop_assume!(!valid);
        // A leading slash would parse as a command; the generator cannot
        // produce one, so the shape is always free text.
        let result = transition(
            &awaiting_contact(),
            &ctx(false),
            Event::Message(MessageShape::from_text(&text)),
        )
        .unwrap();

        prop_assert_eq!(&result.next, &awaiting_contact());
        prop_assert!(!has_set_contact(&result.effects));
    }

    // Free text while idle never starts a flow or touches the store.
    #[test]
    fn idle_free_text_is_inert(text in "[a-zA-Z0-9 ?!.,]{1,40}") {
        prop_assume!(!text.trim_start().starts_with('/'));
        let result = transition(
            &SessionState::Idle,
            &ctx(true),
            Event::Message(MessageShape::from_text(&text)),
        )
        .unwrap();

        prop_assert_eq!(&result.next, &SessionState::Idle);
        prop_assert!(
            result
                .effects
                .iter()
                .all(|e| matches!(e, Effect::Reply { .. })),
            "expected every effect to be a Reply"
        );
    }

    // A chat turn only ever requests a completion; log appends are gated
    // on the reply outcome event.
    #[test]
    fn chat_text_never_logs_directly(text in "[a-zA-Z0-9 ?!.,]{1,40}") {
        prop_assume!(!text.trim_start().starts_with('/'));
        let result = transition(
            &SessionState::Chat(ChatState::AwaitingMessage),
            &ctx(true),
            Event::Message(MessageShape::from_text(&text)),
        )
        .unwrap();

        prop_assert_eq!(&result.next, &SessionState::Chat(ChatState::AwaitingMessage));
        prop_assert!(
            !result
                .effects
                .iter()
                .any(|e| matches!(e, Effect::AppendChat { .. } | Effect::AppendSearch { .. })),
            "expected no AppendChat or AppendSearch effects"
        );
    }
}
