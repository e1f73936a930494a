//! Stage implementations.
//!
//! The gate and the analyzer are structural prerequisites: their failures
//! abort the run. The domain stages (lodging, weather, attractions, budget)
//! are enrichments with safe defaults: their failures are absorbed. The
//! itinerary is a pure function of state, and the summary resolves the only
//! dynamic routing decision in the graph.

mod analyzer;
mod domain;
mod gate;
mod itinerary;
mod summary;

pub use analyzer::QueryAnalyzerStage;
pub use domain::{AttractionsStage, BudgetStage, LodgingStage, WeatherStage};
pub use gate::ScopeGateStage;
pub use itinerary::ItineraryStage;
pub use summary::SummaryStage;
