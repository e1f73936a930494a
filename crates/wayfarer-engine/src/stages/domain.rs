//! The four fail-soft domain stages.
//!
//! Each one invokes its capability with a narrowed view of the state and
//! writes its owned field. A capability failure is logged, recorded in the
//! trace, and replaced with the stage's safe default; a single malformed
//! backend must not abort the whole pipeline.

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{info, warn};

use wayfarer_core::error::{AdapterFailure, Result};
use wayfarer_core::state::{FieldWrite, StateDelta, TripState};
use wayfarer_core::traits::{AttractionSearch, BudgetPlanner, LodgingSearch, WeatherLookup};

use crate::stage::{Stage, StageId, StageOutput};

pub struct LodgingStage {
    search: Arc<dyn LodgingSearch>,
}

impl LodgingStage {
    pub fn new(search: Arc<dyn LodgingSearch>) -> Self {
        Self { search }
    }
}

impl Stage for LodgingStage {
    fn id(&self) -> StageId {
        StageId::Lodging
    }

    fn execute<'a>(&'a self, state: &'a TripState) -> BoxFuture<'a, Result<StageOutput>> {
        Box::pin(async move {
            match self.search.search(&state.view()).await {
                Ok(options) => {
                    info!(count = options.len(), "lodging search complete");
                    Ok(StageOutput::completed(StateDelta::write(
                        FieldWrite::Lodging(options),
                    )))
                }
                Err(failure) => {
                    warn!(error = %failure, "lodging search failed, continuing without results");
                    Ok(StageOutput::recovered(
                        StateDelta::write(FieldWrite::Lodging(Vec::new())),
                        failure,
                    ))
                }
            }
        })
    }

    fn on_timeout(&self) -> Option<StageOutput> {
        Some(StageOutput::recovered(
            StateDelta::write(FieldWrite::Lodging(Vec::new())),
            AdapterFailure::timeout("lodging_search", "stage timed out"),
        ))
    }
}

pub struct WeatherStage {
    lookup: Arc<dyn WeatherLookup>,
}

impl WeatherStage {
    pub fn new(lookup: Arc<dyn WeatherLookup>) -> Self {
        Self { lookup }
    }
}

impl Stage for WeatherStage {
    fn id(&self) -> StageId {
        StageId::Weather
    }

    fn execute<'a>(&'a self, state: &'a TripState) -> BoxFuture<'a, Result<StageOutput>> {
        Box::pin(async move {
            match self.lookup.forecast(&state.view()).await {
                Ok(forecast) => {
                    info!("forecast fetched");
                    Ok(StageOutput::completed(StateDelta::write(
                        FieldWrite::Weather(forecast),
                    )))
                }
                Err(failure) => {
                    warn!(error = %failure, "weather lookup failed, continuing without forecast");
                    Ok(StageOutput::recovered(StateDelta::none(), failure))
                }
            }
        })
    }

    fn on_timeout(&self) -> Option<StageOutput> {
        Some(StageOutput::recovered(
            StateDelta::none(),
            AdapterFailure::timeout("weather_lookup", "stage timed out"),
        ))
    }
}

pub struct AttractionsStage {
    search: Arc<dyn AttractionSearch>,
}

impl AttractionsStage {
    pub fn new(search: Arc<dyn AttractionSearch>) -> Self {
        Self { search }
    }
}

impl Stage for AttractionsStage {
    fn id(&self) -> StageId {
        StageId::Attractions
    }

    fn execute<'a>(&'a self, state: &'a TripState) -> BoxFuture<'a, Result<StageOutput>> {
        Box::pin(async move {
            match self.search.find(&state.view()).await {
                Ok(listing) => {
                    info!("attractions found");
                    Ok(StageOutput::completed(StateDelta::write(
                        FieldWrite::Attractions(listing),
                    )))
                }
                Err(failure) => {
                    warn!(error = %failure, "attraction search failed, continuing without listing");
                    Ok(StageOutput::recovered(StateDelta::none(), failure))
                }
            }
        })
    }

    fn on_timeout(&self) -> Option<StageOutput> {
        Some(StageOutput::recovered(
            StateDelta::none(),
            AdapterFailure::timeout("attraction_search", "stage timed out"),
        ))
    }
}

pub struct BudgetStage {
    planner: Arc<dyn BudgetPlanner>,
}

impl BudgetStage {
    pub fn new(planner: Arc<dyn BudgetPlanner>) -> Self {
        Self { planner }
    }
}

impl Stage for BudgetStage {
    fn id(&self) -> StageId {
        StageId::Budget
    }

    fn execute<'a>(&'a self, state: &'a TripState) -> BoxFuture<'a, Result<StageOutput>> {
        Box::pin(async move {
            match self.planner.breakdown(&state.view()).await {
                Ok(breakdown) => {
                    info!("budget breakdown computed");
                    Ok(StageOutput::completed(StateDelta::write(
                        FieldWrite::BudgetBreakdown(breakdown),
                    )))
                }
                Err(failure) => {
                    warn!(error = %failure, "budget planning failed, continuing without breakdown");
                    Ok(StageOutput::recovered(StateDelta::none(), failure))
                }
            }
        })
    }

    fn on_timeout(&self) -> Option<StageOutput> {
        Some(StageOutput::recovered(
            StateDelta::none(),
            AdapterFailure::timeout("budget_planner", "stage timed out"),
        ))
    }
}
