use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use parley_channels::assembler::{assemble, WireResponse};
use parley_channels::channel::{select, FormatError};
use parley_core::catalog::{MessageCatalog, StaticCatalog};
use parley_core::config::Config;
use parley_core::request::{ActiveContext, TimeToLive, TurnRequest, ATTR_CALLBACK};
use parley_core::response::TurnResponse;

use crate::disambiguation::Disambiguator;
use crate::fallback::{fallback_response, minimal_fallback_document, resolve_error_message};
use crate::registry::{IntentRegistry, ResolveError};

/// Context (re)installed before regular dispatch to track exit transitions
/// across turns.
pub const TRANSITION_TO_EXIT_CONTEXT: &str = "transition_to_exit";
const EXIT_CONTEXT_TTL_SECONDS: u32 = 900;
const EXIT_CONTEXT_TTL_TURNS: u32 = 20;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("no handler in the chain produced a response for intent `{0}`")]
    Unhandled(String),
    #[error("intent handler failed: {0}")]
    Handler(anyhow::Error),
    #[error(transparent)]
    Format(#[from] FormatError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Disambiguation,
    Regular,
}

/// The per-deployment orchestrator: routes each turn through the ordered
/// handler chain, manages callback re-dispatch, and guarantees a terminal
/// formatted response. Holds only immutable state, so one instance serves
/// any number of independent invocations.
pub struct Fulfillment {
    config: Config,
    registry: IntentRegistry,
    disambiguator: Option<Arc<dyn Disambiguator>>,
    catalog: Arc<dyn MessageCatalog>,
}

impl Fulfillment {
    pub fn new(config: Config, registry: IntentRegistry) -> Self {
        let catalog = Arc::new(StaticCatalog::new(config.locale.clone()));
        Self { config, registry, disambiguator: None, catalog }
    }

    pub fn with_disambiguator<D>(mut self, disambiguator: D) -> Self
    where
        D: Disambiguator + 'static,
    {
        self.disambiguator = Some(Arc::new(disambiguator));
        self
    }

    pub fn with_catalog<C>(mut self, catalog: C) -> Self
    where
        C: MessageCatalog + 'static,
    {
        self.catalog = Arc::new(catalog);
        self
    }

    /// Outermost entry point. Always returns a well-formed turn document:
    /// pipeline failures become the fallback closing response, and an event
    /// that cannot even be parsed gets the minimal static document.
    pub fn handle_event(&self, event: &Value) -> Value {
        let request = match serde_json::from_value::<TurnRequest>(event.clone()) {
            Ok(request) => request,
            Err(parse_error) => {
                error!(%parse_error, "inbound event could not be parsed");
                let message =
                    resolve_error_message(&self.config, self.catalog.as_ref(), &self.config.locale);
                return minimal_fallback_document(&message);
            }
        };

        let locale = if request.locale_id().is_empty() {
            self.config.locale.clone()
        } else {
            request.locale_id().to_owned()
        };

        match self.handle_request(request.clone()) {
            Ok(wire) => to_document(&wire).unwrap_or_else(|| {
                let message =
                    resolve_error_message(&self.config, self.catalog.as_ref(), &locale);
                minimal_fallback_document(&message)
            }),
            Err(pipeline_error) => {
                let message = resolve_error_message(&self.config, self.catalog.as_ref(), &locale);
                if !self.config.auto_handle_exceptions {
                    error!(%pipeline_error, "turn failed with exception containment disabled");
                    return minimal_fallback_document(&message);
                }

                warn!(%pipeline_error, "turn failed, returning fallback response");
                let fallback = fallback_response(&request, message.clone());
                match assemble(fallback, select(&self.config.channel)) {
                    Ok(wire) => {
                        to_document(&wire).unwrap_or_else(|| minimal_fallback_document(&message))
                    }
                    Err(format_error) => {
                        error!(%format_error, "fallback response failed to format");
                        minimal_fallback_document(&message)
                    }
                }
            }
        }
    }

    /// The typed inner pipeline: handler chain, callback re-dispatch, then
    /// the response assembler. Every success path ends in the assembler;
    /// failure to format is itself a fatal error.
    pub fn handle_request(&self, mut request: TurnRequest) -> Result<WireResponse, PipelineError> {
        let intent_name = request.intent_name().to_owned();
        debug!(intent = %intent_name, session = %request.session_id, "dispatching turn");

        let stages = self.stages();
        let stage_count = stages.len();
        let mut accepted: Option<TurnResponse> = None;

        for (index, stage) in stages.into_iter().enumerate() {
            let is_last = index + 1 == stage_count;
            match self.run_stage(stage, &mut request) {
                Ok(Some(response)) => {
                    debug!(?stage, "handler accepted the turn");
                    accepted = Some(response);
                    break;
                }
                Ok(None) => continue,
                // Resolution failures abort the turn immediately: an unknown
                // intent is surfaced to the user, an unbound one is a fatal
                // configuration error. Neither is a "try the next handler".
                Err(resolve_error @ PipelineError::Resolve(_)) => return Err(resolve_error),
                Err(stage_error) if is_last => return Err(stage_error),
                Err(stage_error) => {
                    warn!(?stage, %stage_error, "handler failed, trying next handler");
                    continue;
                }
            }
        }

        let Some(mut response) = accepted else {
            return Err(PipelineError::Unhandled(intent_name));
        };

        // Propagate handler-produced state before a possible re-dispatch.
        request.session_state = response.session_state.clone();
        request.request_attributes = response.request_attributes.clone();

        let mut messages = std::mem::take(&mut response.messages);
        if let Some(callback_intent) = response.take_callback() {
            debug!(callback = %callback_intent, "callback re-dispatch within the same turn");
            request.request_attributes.remove(ATTR_CALLBACK);
            let handler = self.registry.resolve(&callback_intent)?;
            let second = handler.handle(&request).map_err(PipelineError::Handler)?;
            response.session_state = second.session_state;
            messages.extend(second.messages);
        }
        response.messages = messages;

        Ok(assemble(response, select(&self.config.channel))?)
    }

    fn stages(&self) -> Vec<Stage> {
        let mut stages = Vec::with_capacity(2);
        if self.config.enable_disambiguation {
            if self.disambiguator.is_some() {
                stages.push(Stage::Disambiguation);
            } else {
                warn!("disambiguation enabled but no collaborator was injected, skipping");
            }
        }
        stages.push(Stage::Regular);
        stages
    }

    fn run_stage(
        &self,
        stage: Stage,
        request: &mut TurnRequest,
    ) -> Result<Option<TurnResponse>, PipelineError> {
        match stage {
            Stage::Disambiguation => self.disambiguation_stage(request),
            Stage::Regular => self.regular_stage(request),
        }
    }

    /// Completes a pending disambiguation from the previous turn, or asks
    /// the user to choose when the current turn is ambiguous. Declines the
    /// turn otherwise.
    fn disambiguation_stage(
        &self,
        request: &TurnRequest,
    ) -> Result<Option<TurnResponse>, PipelineError> {
        let Some(disambiguator) = self.disambiguator.as_deref() else {
            return Ok(None);
        };

        if let Some(response) =
            disambiguator.process_response(request).map_err(PipelineError::Handler)?
        {
            debug!("completed pending disambiguation");
            return Ok(Some(response));
        }

        let analysis = disambiguator.analyze(request).map_err(PipelineError::Handler)?;
        if analysis.should_disambiguate && !analysis.candidates.is_empty() {
            info!(candidates = analysis.candidates.len(), "triggering disambiguation");
            let prompt = disambiguator
                .build_prompt(request, &analysis.candidates)
                .map_err(PipelineError::Handler)?;
            return Ok(Some(prompt));
        }

        Ok(None)
    }

    /// Resolve and invoke the intent's own logic, after recording the routed
    /// intent and (re)installing the exit-transition context.
    fn regular_stage(
        &self,
        request: &mut TurnRequest,
    ) -> Result<Option<TurnResponse>, PipelineError> {
        let intent_name = request.intent_name().to_owned();
        request.session_state.set_routed_intent(&intent_name);

        if !intent_name.contains(self.config.exit_feedback_intent.as_str()) {
            request.session_state.active_contexts = vec![ActiveContext::new(
                TRANSITION_TO_EXIT_CONTEXT,
                TimeToLive::new(EXIT_CONTEXT_TTL_SECONDS, EXIT_CONTEXT_TTL_TURNS),
            )];
        }

        let handler = self.registry.resolve(&intent_name)?;
        let mut response = handler.handle(request).map_err(PipelineError::Handler)?;
        // The reserved-key namespace is orchestrator-owned; the routed
        // intent survives even when the handler built fresh session state.
        response.session_state.set_routed_intent(&intent_name);
        Ok(Some(response))
    }
}

fn to_document(wire: &WireResponse) -> Option<Value> {
    match serde_json::to_value(wire) {
        Ok(document) => Some(document),
        Err(serialize_error) => {
            error!(%serialize_error, "wire response failed to serialize");
            None
        }
    }
}
