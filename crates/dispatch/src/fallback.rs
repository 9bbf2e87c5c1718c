use serde_json::{json, Value};

use parley_core::catalog::MessageCatalog;
use parley_core::config::Config;
use parley_core::message::Message;
use parley_core::request::{DialogAction, Intent, IntentState, TurnRequest};
use parley_core::response::TurnResponse;

pub const FALLBACK_INTENT: &str = "FallbackIntent";

pub const DEFAULT_ERROR_MESSAGE: &str =
    "I'm sorry, I encountered an error while processing your request. Please try again.";

/// Apology text for the fallback path. The configured message is tried as a
/// catalog key for the turn's locale first; a key with no catalog entry is
/// used as a literal. Unconfigured deployments get the built-in default.
pub fn resolve_error_message(config: &Config, catalog: &dyn MessageCatalog, locale: &str) -> String {
    match &config.error_message {
        Some(configured) => {
            catalog.lookup(configured, locale).unwrap_or_else(|| configured.clone())
        }
        None => DEFAULT_ERROR_MESSAGE.to_owned(),
    }
}

/// A well-formed closing response for a turn that failed mid-pipeline.
/// Session attributes carried by the request survive; dialog state is
/// replaced with a failed `FallbackIntent` close.
pub fn fallback_response(request: &TurnRequest, message: String) -> TurnResponse {
    let mut session_state = request.session_state.clone();
    session_state.dialog_action = Some(DialogAction::close());
    let mut intent = Intent::named(FALLBACK_INTENT);
    intent.state = Some(IntentState::Failed);
    session_state.intent = intent;
    TurnResponse::new(session_state, vec![Message::plain(message)])
}

/// The last-resort document, emitted when the inbound event cannot even be
/// parsed or the fallback response itself fails to format. Bypasses the
/// formatting pipeline entirely.
pub fn minimal_fallback_document(message: &str) -> Value {
    json!({
        "sessionState": {
            "dialogAction": {"type": "Close"},
            "intent": {"name": FALLBACK_INTENT, "state": "Failed"},
            "sessionAttributes": {}
        },
        "messages": [{"contentType": "PlainText", "content": message}]
    })
}
