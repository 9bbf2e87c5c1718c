use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Session attribute recording the last intent the orchestrator routed.
pub const ATTR_LEX_INTENT: &str = "lex_intent";
/// Session attribute carrying the string-encoded list of choices offered
/// during formatting.
pub const ATTR_OPTIONS_PROVIDED: &str = "options_provided";
/// Request attribute naming a second intent to chain within the same turn.
pub const ATTR_CALLBACK: &str = "callback";

/// One inbound turn event, parsed from the host conversational-service
/// schema. Created fresh per invocation and owned by the pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    pub session_id: String,
    #[serde(default)]
    pub input_transcript: String,
    pub bot: BotMetadata,
    pub session_state: SessionState,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub request_attributes: BTreeMap<String, String>,
}

impl TurnRequest {
    pub fn intent_name(&self) -> &str {
        &self.session_state.intent.name
    }

    pub fn locale_id(&self) -> &str {
        &self.bot.locale_id
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotMetadata {
    #[serde(default)]
    pub locale_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialog_action: Option<DialogAction>,
    #[serde(default)]
    pub intent: Intent,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub session_attributes: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub active_contexts: Vec<ActiveContext>,
}

impl SessionState {
    /// Record the intent the orchestrator routed this turn. The reserved-key
    /// namespace belongs to the orchestrator; existing values are replaced.
    pub fn set_routed_intent(&mut self, name: impl Into<String>) {
        self.session_attributes.insert(ATTR_LEX_INTENT.to_owned(), Value::String(name.into()));
    }

    pub fn routed_intent(&self) -> Option<&str> {
        self.session_attributes.get(ATTR_LEX_INTENT).and_then(Value::as_str)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<IntentState>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub slots: BTreeMap<String, Option<Slot>>,
}

impl Intent {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), state: None, slots: BTreeMap::new() }
    }

    /// Interpreted value of a filled slot, if the slot is present and filled.
    pub fn slot_value(&self, slot_name: &str) -> Option<&str> {
        self.slots
            .get(slot_name)
            .and_then(Option::as_ref)
            .and_then(|slot| slot.value.as_ref())
            .map(|value| value.interpreted_value.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntentState {
    InProgress,
    ReadyForFulfillment,
    Fulfilled,
    Failed,
    Waiting,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<SlotValue>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_value: Option<String>,
    pub interpreted_value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resolved_values: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogAction {
    #[serde(rename = "type")]
    pub action_type: DialogActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_to_elicit: Option<String>,
}

impl DialogAction {
    pub fn close() -> Self {
        Self { action_type: DialogActionType::Close, slot_to_elicit: None }
    }

    pub fn elicit_slot(slot: impl Into<String>) -> Self {
        Self { action_type: DialogActionType::ElicitSlot, slot_to_elicit: Some(slot.into()) }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogActionType {
    Close,
    ConfirmIntent,
    Delegate,
    ElicitIntent,
    ElicitSlot,
}

/// Cross-turn tracking context appended to session state. TTL enforcement
/// happens in the host service, not here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveContext {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context_attributes: BTreeMap<String, String>,
    pub time_to_live: TimeToLive,
}

impl ActiveContext {
    pub fn new(name: impl Into<String>, time_to_live: TimeToLive) -> Self {
        Self { name: name.into(), context_attributes: BTreeMap::new(), time_to_live }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeToLive {
    pub time_to_live_in_seconds: u32,
    pub turns_to_live: u32,
}

impl TimeToLive {
    pub fn new(seconds: u32, turns: u32) -> Self {
        Self { time_to_live_in_seconds: seconds, turns_to_live: turns }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ActiveContext, SessionState, TimeToLive, TurnRequest};

    fn sample_event() -> serde_json::Value {
        json!({
            "sessionId": "session-1",
            "inputTranscript": "where is my order",
            "bot": {"localeId": "en_US"},
            "sessionState": {
                "intent": {
                    "name": "OrderStatus",
                    "slots": {
                        "OrderId": {"value": {"interpretedValue": "A-100"}},
                        "Empty": null
                    }
                },
                "sessionAttributes": {"visits": 3}
            },
            "requestAttributes": {"channel": "lex"}
        })
    }

    #[test]
    fn parses_host_event_shape() {
        let request: TurnRequest = serde_json::from_value(sample_event()).unwrap();
        assert_eq!(request.session_id, "session-1");
        assert_eq!(request.intent_name(), "OrderStatus");
        assert_eq!(request.locale_id(), "en_US");
        assert_eq!(request.session_state.intent.slot_value("OrderId"), Some("A-100"));
        assert_eq!(request.session_state.intent.slot_value("Empty"), None);
        assert_eq!(request.request_attributes.get("channel").map(String::as_str), Some("lex"));
    }

    #[test]
    fn missing_optional_event_fields_default() {
        let request: TurnRequest = serde_json::from_value(json!({
            "sessionId": "s",
            "bot": {"localeId": "en_US"},
            "sessionState": {"intent": {"name": "Help"}}
        }))
        .unwrap();
        assert!(request.input_transcript.is_empty());
        assert!(request.request_attributes.is_empty());
        assert!(request.session_state.active_contexts.is_empty());
    }

    #[test]
    fn routed_intent_is_written_to_reserved_key() {
        let mut state = SessionState::default();
        state.set_routed_intent("OrderStatus");
        assert_eq!(state.routed_intent(), Some("OrderStatus"));
        assert_eq!(
            state.session_attributes.get(super::ATTR_LEX_INTENT),
            Some(&serde_json::Value::String("OrderStatus".to_owned()))
        );
    }

    #[test]
    fn active_context_serializes_camel_case_ttl() {
        let context = ActiveContext::new("transition_to_exit", TimeToLive::new(900, 20));
        assert_eq!(
            serde_json::to_value(&context).unwrap(),
            json!({
                "name": "transition_to_exit",
                "timeToLive": {"timeToLiveInSeconds": 900, "turnsToLive": 20}
            })
        );
    }
}
