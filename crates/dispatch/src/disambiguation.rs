use parley_core::request::TurnRequest;
use parley_core::response::TurnResponse;

/// The disambiguation collaborator. The scoring algorithm lives outside this
/// crate; the orchestrator consumes it only through this contract, and only
/// when one is explicitly injected - presence is a construction-time
/// decision, never runtime feature detection.
pub trait Disambiguator: Send + Sync {
    /// Complete a disambiguation pending from the previous turn, if this
    /// turn is the user's answer to one.
    fn process_response(&self, request: &TurnRequest) -> anyhow::Result<Option<TurnResponse>>;

    /// Score the current turn for ambiguity.
    fn analyze(&self, request: &TurnRequest) -> anyhow::Result<DisambiguationAnalysis>;

    /// Build the prompt asking the user to choose among candidates.
    fn build_prompt(
        &self,
        request: &TurnRequest,
        candidates: &[IntentCandidate],
    ) -> anyhow::Result<TurnResponse>;
}

#[derive(Clone, Debug, Default)]
pub struct DisambiguationAnalysis {
    pub should_disambiguate: bool,
    /// Ordered best-first; empty when `should_disambiguate` is false.
    pub candidates: Vec<IntentCandidate>,
}

impl DisambiguationAnalysis {
    pub fn unambiguous() -> Self {
        Self::default()
    }

    pub fn ambiguous(candidates: Vec<IntentCandidate>) -> Self {
        Self { should_disambiguate: true, candidates }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IntentCandidate {
    pub intent_name: String,
    pub display_label: String,
    pub score: f64,
}

impl IntentCandidate {
    pub fn new(intent_name: impl Into<String>, display_label: impl Into<String>, score: f64) -> Self {
        Self { intent_name: intent_name.into(), display_label: display_label.into(), score }
    }
}
