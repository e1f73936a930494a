use futures::future::BoxFuture;

use wayfarer_core::error::Result;
use wayfarer_core::state::{StateDelta, TripState};
use wayfarer_core::trace::StageOutcome;

/// Identifier for a pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    ScopeGate,
    QueryAnalyzer,
    Lodging,
    Weather,
    Attractions,
    Budget,
    Itinerary,
    Summary,
}

impl StageId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScopeGate => "scope_gate",
            Self::QueryAnalyzer => "query_analyzer",
            Self::Lodging => "lodging",
            Self::Weather => "weather",
            Self::Attractions => "attractions",
            Self::Budget => "budget",
            Self::Itinerary => "itinerary",
            Self::Summary => "summary",
        }
    }

    /// Inverse of `as_str`. This is also the regeneration-marker vocabulary.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scope_gate" => Some(Self::ScopeGate),
            "query_analyzer" => Some(Self::QueryAnalyzer),
            "lodging" => Some(Self::Lodging),
            "weather" => Some(Self::Weather),
            "attractions" => Some(Self::Attractions),
            "budget" => Some(Self::Budget),
            "itinerary" => Some(Self::Itinerary),
            "summary" => Some(Self::Summary),
            _ => None,
        }
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where to go after a stage completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteHint {
    /// Follow the routing table's static edge.
    Next,
    /// Explicit dynamic jump. Only the summary stage's resolver emits this.
    Goto(StageId),
    /// End the run.
    Terminal,
}

/// What a stage hands back to the executor: a delta to merge, a routing
/// decision, and the outcome to record in the trace.
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub delta: StateDelta,
    pub route: RouteHint,
    pub outcome: StageOutcome,
}

impl StageOutput {
    pub fn completed(delta: StateDelta) -> Self {
        Self {
            delta,
            route: RouteHint::Next,
            outcome: StageOutcome::Completed,
        }
    }

    pub fn recovered(delta: StateDelta, failure: wayfarer_core::error::AdapterFailure) -> Self {
        Self {
            delta,
            route: RouteHint::Next,
            outcome: StageOutcome::Recovered(failure),
        }
    }

    pub fn with_route(mut self, route: RouteHint) -> Self {
        self.route = route;
        self
    }
}

/// One named unit of pipeline work.
///
/// Stages read the shared state and return a delta; they never mutate the
/// record directly. The executor owns merging and routing.
pub trait Stage: Send + Sync + 'static {
    fn id(&self) -> StageId;

    fn execute<'a>(&'a self, state: &'a TripState) -> BoxFuture<'a, Result<StageOutput>>;

    /// Fallback output when the executor times this stage out. `None` means
    /// a timeout is fatal (gate and extraction); domain stages return their
    /// safe default so the run continues.
    fn on_timeout(&self) -> Option<StageOutput> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names_round_trip() {
        for id in [
            StageId::ScopeGate,
            StageId::QueryAnalyzer,
            StageId::Lodging,
            StageId::Weather,
            StageId::Attractions,
            StageId::Budget,
            StageId::Itinerary,
            StageId::Summary,
        ] {
            assert_eq!(StageId::parse(id.as_str()), Some(id));
        }
        assert_eq!(StageId::parse("hotel_agent"), None);
        assert_eq!(StageId::parse(""), None);
    }

    #[test]
    fn completed_defaults_to_next() {
        let output = StageOutput::completed(StateDelta::none());
        assert_eq!(output.route, RouteHint::Next);
        assert!(!output.outcome.is_recovered());
    }
}
