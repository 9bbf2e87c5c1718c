use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use parley_core::message::Message;
use parley_core::request::{ActiveContext, DialogAction, IntentState, ATTR_OPTIONS_PROVIDED};
use parley_core::response::TurnResponse;

use crate::channel::{Channel, FormatError, OptionsSink};

/// The wire-ready turn response document. Serialization omits null/absent
/// fields; session attributes are uniformly string-typed by the time this
/// exists.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireResponse {
    pub session_state: WireSessionState,
    pub messages: Vec<Message>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSessionState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialog_action: Option<DialogAction>,
    pub intent: WireIntent,
    pub session_attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub active_contexts: Vec<ActiveContext>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WireIntent {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<IntentState>,
}

/// Build the final wire document for one turn: format every message through
/// the channel, apply the single-image-card rewrite, fold offered options
/// into session attributes, and coerce every attribute value to a string.
pub fn assemble(response: TurnResponse, channel: &dyn Channel) -> Result<WireResponse, FormatError> {
    let TurnResponse { session_state, messages, .. } = response;

    let mut options = OptionsSink::default();
    let mut formatted = Vec::with_capacity(messages.len());
    for message in messages {
        formatted.push(channel.format_message(message, &mut options)?);
    }

    apply_single_card_rewrite(&mut formatted, channel);

    let mut session_attributes = session_state.session_attributes;
    if !options.is_empty() {
        let offered = options.drain();
        debug!(channel = channel.name(), count = offered.len(), "recording offered options");
        let encoded =
            serde_json::to_string(&offered).unwrap_or_else(|_| "[]".to_owned());
        session_attributes.insert(ATTR_OPTIONS_PROVIDED.to_owned(), Value::String(encoded));
    }

    Ok(WireResponse {
        session_state: WireSessionState {
            dialog_action: session_state.dialog_action,
            intent: WireIntent {
                name: session_state.intent.name,
                state: session_state.intent.state,
            },
            session_attributes: stringify_attributes(session_attributes),
            active_contexts: session_state.active_contexts,
        },
        messages: formatted,
    })
}

/// The default conversational surface rejects a turn whose only content is a
/// rich card (contrary to its documentation). Exactly when the formatted
/// list is a lone ImageCard on that surface: prepend a PlainText bearing the
/// card title, then blank the card's own title with a single space - the
/// wire format forbids empty title fields.
fn apply_single_card_rewrite(formatted: &mut Vec<Message>, channel: &dyn Channel) {
    if !channel.is_default_conversational() || formatted.len() != 1 {
        return;
    }
    if let Message::ImageCard { card } = &mut formatted[0] {
        let title = std::mem::replace(&mut card.title, " ".to_owned());
        formatted.insert(0, Message::plain(title));
    }
}

/// The channel wire contract requires homogeneous string-valued session
/// attributes. Strings stay verbatim; everything else takes its compact
/// JSON form.
fn stringify_attributes(attributes: BTreeMap<String, Value>) -> BTreeMap<String, String> {
    attributes
        .into_iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(text) => text,
                other => other.to_string(),
            };
            (key, rendered)
        })
        .collect()
}
