use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use thiserror::Error;

use parley_core::request::TurnRequest;
use parley_core::response::TurnResponse;

/// Application-provided intent logic. Implementations receive the current
/// turn and either produce a response or fail; failures propagate unmodified
/// out of the resolution layer.
pub trait IntentHandler: Send + Sync {
    fn handle(&self, request: &TurnRequest) -> anyhow::Result<TurnResponse>;
}

impl<F> IntentHandler for F
where
    F: Fn(&TurnRequest) -> anyhow::Result<TurnResponse> + Send + Sync,
{
    fn handle(&self, request: &TurnRequest) -> anyhow::Result<TurnResponse> {
        self(request)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// No handler is registered under the intent's normalized key. Surfaced
    /// to the user as the fallback response, never silently retried.
    #[error("unable to find handler for intent `{0}`")]
    IntentNotFound(String),
    /// The intent is declared as known but nothing was bound to it. A
    /// deployment configuration bug, fatal.
    #[error("intent `{0}` is declared but no handler is bound to it")]
    MissingHandler(String),
}

/// Statically registered mapping from intent name to handler. Keys are
/// normalized through `intent_key`, so `OrderPizza` and `order_pizza`
/// address the same entry.
#[derive(Default)]
pub struct IntentRegistry {
    handlers: HashMap<String, Arc<dyn IntentHandler>>,
    declared: BTreeSet<String>,
}

impl IntentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, intent_name: &str, handler: H)
    where
        H: IntentHandler + 'static,
    {
        self.handlers.insert(intent_key(intent_name), Arc::new(handler));
    }

    /// Mark an intent as known without binding logic to it. Resolving a
    /// declared-but-unbound intent is a fatal configuration error, distinct
    /// from an unknown intent.
    pub fn declare(&mut self, intent_name: &str) {
        self.declared.insert(intent_key(intent_name));
    }

    pub fn resolve(&self, intent_name: &str) -> Result<Arc<dyn IntentHandler>, ResolveError> {
        let key = intent_key(intent_name);
        if let Some(handler) = self.handlers.get(&key) {
            return Ok(Arc::clone(handler));
        }
        if self.declared.contains(&key) {
            return Err(ResolveError::MissingHandler(intent_name.to_owned()));
        }
        Err(ResolveError::IntentNotFound(intent_name.to_owned()))
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

/// Normalized registry key for an intent name. Author-supplied snake_case
/// names are respected verbatim (lower-cased as-is when they already carry a
/// separator); framework-style CamelCase names are converted to snake_case.
pub fn intent_key(intent_name: &str) -> String {
    if intent_name.contains('_') {
        intent_name.to_lowercase()
    } else {
        title_to_snake(intent_name)
    }
}

fn title_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (index, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if index > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
