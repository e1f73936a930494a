use futures::future::BoxFuture;

use crate::error::AdapterResult;
use crate::state::{LodgingOption, ScopeLabel, TripQuery, TripSummary, TripView};

/// Text-generation backend shared by the prompt-backed capabilities.
pub trait TextGenerator: Send + Sync + 'static {
    /// Run one system+user exchange and return the reply text.
    fn generate(&self, system: &str, user: &str) -> BoxFuture<'_, AdapterResult<String>>;
}

/// Decides whether an incoming request is in scope for trip planning.
///
/// The contract is binary: implementations must normalize the backend reply
/// into one of the two labels or report a malformed-output failure.
pub trait ScopeClassifier: Send + Sync + 'static {
    fn classify(&self, message: &str) -> BoxFuture<'_, AdapterResult<ScopeLabel>>;
}

/// Extracts the trip parameters from the latest request text.
pub trait TripAnalyzer: Send + Sync + 'static {
    fn analyze(&self, message: &str) -> BoxFuture<'_, AdapterResult<TripQuery>>;
}

/// Finds lodging options for the trip, normalized to the structured shape.
pub trait LodgingSearch: Send + Sync + 'static {
    fn search(&self, view: &TripView<'_>) -> BoxFuture<'_, AdapterResult<Vec<LodgingOption>>>;
}

/// Fetches a forecast summary for the destination.
pub trait WeatherLookup: Send + Sync + 'static {
    fn forecast(&self, view: &TripView<'_>) -> BoxFuture<'_, AdapterResult<String>>;
}

/// Finds attractions and cost estimates for the destination.
pub trait AttractionSearch: Send + Sync + 'static {
    fn find(&self, view: &TripView<'_>) -> BoxFuture<'_, AdapterResult<String>>;
}

/// Allocates the user's budget across the costs collected so far.
pub trait BudgetPlanner: Send + Sync + 'static {
    fn breakdown(&self, view: &TripView<'_>) -> BoxFuture<'_, AdapterResult<String>>;
}

/// Produces the final narrative summary and the optional regeneration signal.
pub trait SummaryWriter: Send + Sync + 'static {
    fn summarize(&self, view: &TripView<'_>) -> BoxFuture<'_, AdapterResult<TripSummary>>;
}
