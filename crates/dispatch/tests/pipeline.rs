//! End-to-end turn scenarios through the full pipeline: event in, wire
//! document out.

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use parley_core::config::Config;
use parley_core::message::{ImageCard, Message};
use parley_core::request::{IntentState, TurnRequest};
use parley_core::response::TurnResponse;
use parley_dispatch::{Fulfillment, IntentRegistry};

fn event_for(intent: &str) -> Value {
    json!({
        "sessionId": "session-42",
        "inputTranscript": "hi there",
        "bot": {"localeId": "en_US"},
        "sessionState": {
            "intent": {"name": intent},
            "sessionAttributes": {}
        }
    })
}

#[test]
fn plain_text_turn_round_trips_with_routed_intent_recorded() {
    let mut registry = IntentRegistry::new();
    registry.register("OrderStatus", |_request: &TurnRequest| {
        Ok(TurnResponse::closing(
            "OrderStatus",
            IntentState::Fulfilled,
            vec![Message::plain("Your order shipped yesterday.")],
        ))
    });
    let fulfillment = Fulfillment::new(Config::default(), registry);

    let document = fulfillment.handle_event(&event_for("OrderStatus"));

    let messages = document["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["contentType"], "PlainText");
    assert_eq!(messages[0]["content"], "Your order shipped yesterday.");
    assert_eq!(document["sessionState"]["sessionAttributes"]["lex_intent"], "OrderStatus");
}

#[test]
fn lone_image_card_is_rewritten_into_two_messages() {
    let mut registry = IntentRegistry::new();
    registry.register("PickColor", |_request: &TurnRequest| {
        Ok(TurnResponse::closing(
            "PickColor",
            IntentState::InProgress,
            vec![Message::card(ImageCard::new("Choose").button("Red", "red"))],
        ))
    });
    let fulfillment = Fulfillment::new(Config::default(), registry);

    let document = fulfillment.handle_event(&event_for("PickColor"));

    let messages = document["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["contentType"], "PlainText");
    assert_eq!(messages[0]["content"], "Choose");
    assert_eq!(messages[1]["contentType"], "ImageResponseCard");
    assert_eq!(messages[1]["imageResponseCard"]["title"], " ");
    // The offered button made it into the reserved attribute, stringified.
    assert_eq!(
        document["sessionState"]["sessionAttributes"]["options_provided"],
        r#"["Red"]"#
    );
}

#[test]
fn missing_intent_module_yields_the_fallback_closing_response() {
    let fulfillment = Fulfillment::new(Config::default(), IntentRegistry::new());

    let document = fulfillment.handle_event(&event_for("Foo_Bar"));

    assert_eq!(document["sessionState"]["dialogAction"]["type"], "Close");
    assert_eq!(document["sessionState"]["intent"]["name"], "FallbackIntent");
    assert_eq!(document["sessionState"]["intent"]["state"], "Failed");
    let messages = document["messages"].as_array().unwrap();
    assert_eq!(messages[0]["contentType"], "PlainText");
    assert!(!messages[0]["content"].as_str().unwrap().is_empty());
}

#[test]
fn configured_error_message_reaches_the_fallback_response() {
    let mut config = Config::default();
    config.error_message = Some("Apologies - please try that again.".to_owned());
    let fulfillment = Fulfillment::new(config, IntentRegistry::new());

    let document = fulfillment.handle_event(&event_for("Foo_Bar"));
    assert_eq!(document["messages"][0]["content"], "Apologies - please try that again.");
}

#[test]
fn callback_chains_a_second_intent_within_the_same_turn() {
    let seen_by_callback: Arc<Mutex<Option<TurnRequest>>> = Arc::new(Mutex::new(None));
    let seen = Arc::clone(&seen_by_callback);

    let mut registry = IntentRegistry::new();
    registry.register("OrderStatus", |_request: &TurnRequest| {
        Ok(TurnResponse::closing(
            "OrderStatus",
            IntentState::Fulfilled,
            vec![Message::plain("Order A-100 shipped.")],
        )
        .with_callback("SurveyPrompt"))
    });
    registry.register("SurveyPrompt", move |request: &TurnRequest| {
        *seen.lock().unwrap() = Some(request.clone());
        let mut response = TurnResponse::closing(
            "SurveyPrompt",
            IntentState::Fulfilled,
            vec![Message::plain("How did we do?")],
        );
        response.session_state.session_attributes.insert("survey_offered".into(), json!("yes"));
        Ok(response)
    });
    let fulfillment = Fulfillment::new(Config::default(), registry);

    let document = fulfillment.handle_event(&event_for("OrderStatus"));

    let messages = document["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["content"], "Order A-100 shipped.");
    assert_eq!(messages[1]["content"], "How did we do?");

    // The callback key was consumed before the second dispatch.
    let callback_request = seen_by_callback.lock().unwrap().clone().unwrap();
    assert!(!callback_request.request_attributes.contains_key("callback"));
    // The second handler ran against the first handler's session state.
    assert_eq!(callback_request.session_state.intent.name, "OrderStatus");

    // The second response's session state is the one on the wire.
    assert_eq!(document["sessionState"]["intent"]["name"], "SurveyPrompt");
    assert_eq!(document["sessionState"]["sessionAttributes"]["survey_offered"], "yes");
}

#[test]
fn session_attribute_values_are_uniformly_strings_on_the_wire() {
    let mut registry = IntentRegistry::new();
    registry.register("Inventory", |_request: &TurnRequest| {
        let mut response = TurnResponse::closing(
            "Inventory",
            IntentState::Fulfilled,
            vec![Message::plain("12 items in stock")],
        );
        let attributes = &mut response.session_state.session_attributes;
        attributes.insert("count".into(), json!(12));
        attributes.insert("in_stock".into(), json!(true));
        attributes.insert("tags".into(), json!(["a", "b"]));
        Ok(response)
    });
    let fulfillment = Fulfillment::new(Config::default(), registry);

    let document = fulfillment.handle_event(&event_for("Inventory"));

    let attributes = document["sessionState"]["sessionAttributes"].as_object().unwrap();
    for (key, value) in attributes {
        assert!(value.is_string(), "attribute `{key}` is not a string: {value}");
    }
    assert_eq!(attributes["count"], "12");
    assert_eq!(attributes["in_stock"], "true");
    assert_eq!(attributes["tags"], r#"["a","b"]"#);
}

#[test]
fn disabled_containment_still_yields_the_minimal_document() {
    let mut config = Config::default();
    config.auto_handle_exceptions = false;
    let fulfillment = Fulfillment::new(config, IntentRegistry::new());

    let event = json!({
        "sessionId": "session-42",
        "inputTranscript": "hi there",
        "bot": {"localeId": "en_US"},
        "sessionState": {
            "intent": {"name": "Mystery"},
            "sessionAttributes": {"visits": "3"}
        }
    });
    let document = fulfillment.handle_event(&event);

    // The minimal static document, not the fallback closing response: the
    // carried session attributes are gone.
    assert_eq!(document["sessionState"]["intent"]["name"], "FallbackIntent");
    assert_eq!(document["sessionState"]["dialogAction"]["type"], "Close");
    assert!(document["sessionState"]["sessionAttributes"]
        .as_object()
        .unwrap()
        .is_empty());
}

#[test]
fn unparseable_event_gets_the_minimal_static_document() {
    let fulfillment = Fulfillment::new(Config::default(), IntentRegistry::new());

    let document = fulfillment.handle_event(&json!({"not": "a turn event"}));

    assert_eq!(document["sessionState"]["dialogAction"]["type"], "Close");
    assert_eq!(document["sessionState"]["intent"]["name"], "FallbackIntent");
    assert_eq!(document["messages"][0]["contentType"], "PlainText");
}

#[test]
fn snake_case_intent_names_resolve_case_insensitively() {
    let mut registry = IntentRegistry::new();
    registry.register("order_pizza", |_request: &TurnRequest| {
        Ok(TurnResponse::closing(
            "OrderPizza",
            IntentState::Fulfilled,
            vec![Message::plain("Pizza ordered.")],
        ))
    });
    let fulfillment = Fulfillment::new(Config::default(), registry);

    // The framework-style spelling normalizes onto the same registry key.
    let document = fulfillment.handle_event(&event_for("OrderPizza"));
    assert_eq!(document["messages"][0]["content"], "Pizza ordered.");
}

#[test]
fn sms_channel_degrades_cards_end_to_end() {
    let mut config = Config::default();
    config.channel = "sms".to_owned();
    let mut registry = IntentRegistry::new();
    registry.register("PickColor", |_request: &TurnRequest| {
        Ok(TurnResponse::closing(
            "PickColor",
            IntentState::InProgress,
            vec![Message::card(ImageCard::new("Choose").button("Red", "red"))],
        ))
    });
    let fulfillment = Fulfillment::new(config, registry);

    let document = fulfillment.handle_event(&event_for("PickColor"));

    let messages = document["messages"].as_array().unwrap();
    // No single-card rewrite off the default channel; the card degraded.
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["contentType"], "PlainText");
    assert_eq!(messages[0]["content"], "Choose | Buttons: [Red -> red]");
}
