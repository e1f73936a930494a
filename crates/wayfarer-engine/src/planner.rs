use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use wayfarer_core::config::EngineConfig;
use wayfarer_core::error::Result;
use wayfarer_core::state::{RunId, TripState};
use wayfarer_core::traits::{
    AttractionSearch, BudgetPlanner, LodgingSearch, ScopeClassifier, SummaryWriter, TripAnalyzer,
    WeatherLookup,
};

use crate::executor::{Executor, RunReport};
use crate::routing::RoutingTable;
use crate::stage::{Stage, StageId};
use crate::stages::{
    AttractionsStage, BudgetStage, ItineraryStage, LodgingStage, QueryAnalyzerStage,
    ScopeGateStage, SummaryStage, WeatherStage,
};

/// One adapter per external collaborator, injected at construction. No
/// module-level singletons: lifecycle is the caller's concern.
pub struct PlannerCapabilities {
    pub scope: Arc<dyn ScopeClassifier>,
    pub analyzer: Arc<dyn TripAnalyzer>,
    pub lodging: Arc<dyn LodgingSearch>,
    pub weather: Arc<dyn WeatherLookup>,
    pub attractions: Arc<dyn AttractionSearch>,
    pub budget: Arc<dyn BudgetPlanner>,
    pub summary: Arc<dyn SummaryWriter>,
}

/// The entry surface: wires the stages and routing table to an executor and
/// runs one record per submission. Concurrent submissions share nothing
/// mutable; every run owns its own record and trace.
pub struct TripPlanner {
    executor: Executor,
}

impl TripPlanner {
    /// Build a planner. The routing table is validated here, so a
    /// misconfigured graph fails at construction rather than mid-run.
    pub fn new(caps: PlannerCapabilities, config: EngineConfig) -> Result<Self> {
        let routing = RoutingTable::standard()?;
        let stages: Vec<Arc<dyn Stage>> = vec![
            Arc::new(ScopeGateStage::new(caps.scope)),
            Arc::new(QueryAnalyzerStage::new(caps.analyzer)),
            Arc::new(LodgingStage::new(caps.lodging)),
            Arc::new(WeatherStage::new(caps.weather)),
            Arc::new(AttractionsStage::new(caps.attractions)),
            Arc::new(BudgetStage::new(caps.budget)),
            Arc::new(ItineraryStage::new()),
            Arc::new(SummaryStage::new(caps.summary)),
        ];
        Ok(Self {
            executor: Executor::new(stages, routing, config),
        })
    }

    /// Run the pipeline for one request.
    pub async fn submit(&self, message: impl Into<String>, run_id: RunId) -> Result<RunReport> {
        self.submit_with_cancel(message, run_id, CancellationToken::new())
            .await
    }

    /// Same as `submit`, with an external cancellation signal. Cancellation
    /// takes effect between stage boundaries.
    pub async fn submit_with_cancel(
        &self,
        message: impl Into<String>,
        run_id: RunId,
        cancel: CancellationToken,
    ) -> Result<RunReport> {
        let state = TripState::from_request(message.into());
        info!(run_id = %run_id, "submitting trip planning run");
        self.executor
            .run(run_id, state, StageId::ScopeGate, cancel)
            .await
    }
}
