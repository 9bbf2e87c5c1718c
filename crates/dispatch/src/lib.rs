//! Parley Dispatch - intent routing and turn orchestration
//!
//! The decision layer of the pipeline: which application logic answers a
//! turn, and how a response is guaranteed even when that logic fails.
//! - **Intent registry** (`registry`) - statically registered mapping from
//!   intent name to handler, with CamelCase/snake_case name normalization
//! - **Disambiguation** (`disambiguation`) - contract for the optional,
//!   explicitly injected collaborator consulted before regular dispatch
//! - **Orchestrator** (`orchestrator`) - the ordered handler chain, callback
//!   re-dispatch, and the terminal pass through the response assembler
//! - **Fallback** (`fallback`) - failure containment: apology resolution and
//!   the minimal static document for unparseable events
//!
//! # Architecture
//!
//! ```text
//! event → TurnRequest → [disambiguation?] → intent handler → callback?
//!                                                │
//!                                      response assembler → wire document
//! ```
//!
//! Every code path, including every failure path, ends in a well-formed
//! turn document. The chain contract: a handler accepts (`Ok(Some)`),
//! declines (`Ok(None)`), or fails - an unknown intent aborts the turn, any
//! other failure declines to the next handler except on the last one.

pub mod disambiguation;
pub mod fallback;
pub mod orchestrator;
pub mod registry;

pub use disambiguation::{DisambiguationAnalysis, Disambiguator, IntentCandidate};
pub use fallback::{fallback_response, minimal_fallback_document, DEFAULT_ERROR_MESSAGE, FALLBACK_INTENT};
pub use orchestrator::{Fulfillment, PipelineError, TRANSITION_TO_EXIT_CONTEXT};
pub use registry::{intent_key, IntentHandler, IntentRegistry, ResolveError};
