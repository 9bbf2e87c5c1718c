use std::collections::BTreeMap;

use crate::message::Message;
use crate::request::{DialogAction, Intent, IntentState, SessionState, ATTR_CALLBACK};

/// The response envelope one intent handler (or the error path) produces for
/// a turn. Owned by the orchestrator until the formatting boundary consumes
/// it; never shared across turns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TurnResponse {
    pub session_state: SessionState,
    pub request_attributes: BTreeMap<String, String>,
    pub messages: Vec<Message>,
}

impl TurnResponse {
    pub fn new(session_state: SessionState, messages: Vec<Message>) -> Self {
        Self { session_state, request_attributes: BTreeMap::new(), messages }
    }

    /// A turn-closing response: `Close` dialog action with the named intent
    /// marked in the given state. Used by both intent logic and the fallback
    /// error path.
    pub fn closing(intent_name: impl Into<String>, state: IntentState, messages: Vec<Message>) -> Self {
        let mut intent = Intent::named(intent_name);
        intent.state = Some(state);
        let session_state = SessionState {
            dialog_action: Some(DialogAction::close()),
            intent,
            ..SessionState::default()
        };
        Self::new(session_state, messages)
    }

    /// Request a same-turn re-dispatch to a second intent after this
    /// response is accepted.
    pub fn with_callback(mut self, intent_name: impl Into<String>) -> Self {
        self.request_attributes.insert(ATTR_CALLBACK.to_owned(), intent_name.into());
        self
    }

    /// Remove and return the callback intent name, if one was requested.
    pub fn take_callback(&mut self) -> Option<String> {
        self.request_attributes.remove(ATTR_CALLBACK)
    }
}

#[cfg(test)]
mod tests {
    use crate::message::Message;
    use crate::request::{DialogActionType, IntentState, ATTR_CALLBACK};

    use super::TurnResponse;

    #[test]
    fn closing_response_closes_dialog_with_intent_state() {
        let response =
            TurnResponse::closing("Goodbye", IntentState::Fulfilled, vec![Message::plain("bye")]);
        let action = response.session_state.dialog_action.as_ref().unwrap();
        assert_eq!(action.action_type, DialogActionType::Close);
        assert_eq!(response.session_state.intent.name, "Goodbye");
        assert_eq!(response.session_state.intent.state, Some(IntentState::Fulfilled));
    }

    #[test]
    fn take_callback_removes_the_reserved_key() {
        let mut response = TurnResponse::default().with_callback("FollowUp");
        assert_eq!(response.take_callback().as_deref(), Some("FollowUp"));
        assert!(!response.request_attributes.contains_key(ATTR_CALLBACK));
        assert_eq!(response.take_callback(), None);
    }
}
