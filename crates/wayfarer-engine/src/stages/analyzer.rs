use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::info;

use wayfarer_core::error::{Result, WayfarerError};
use wayfarer_core::state::{FieldWrite, StateDelta, TripState};
use wayfarer_core::traits::TripAnalyzer;

use crate::stage::{Stage, StageId, StageOutput};

/// Extracts the trip parameters from the latest message.
///
/// Every downstream stage depends on these, so any failure here (adapter
/// failure or a query without a destination) is fatal.
pub struct QueryAnalyzerStage {
    analyzer: Arc<dyn TripAnalyzer>,
}

impl QueryAnalyzerStage {
    pub fn new(analyzer: Arc<dyn TripAnalyzer>) -> Self {
        Self { analyzer }
    }
}

impl Stage for QueryAnalyzerStage {
    fn id(&self) -> StageId {
        StageId::QueryAnalyzer
    }

    fn execute<'a>(&'a self, state: &'a TripState) -> BoxFuture<'a, Result<StageOutput>> {
        Box::pin(async move {
            let message = state.latest_text().unwrap_or("");
            let query = self
                .analyzer
                .analyze(message)
                .await
                .map_err(|f| WayfarerError::ExtractionFailed(f.to_string()))?;
            query.validate().map_err(WayfarerError::ExtractionFailed)?;
            info!(
                destination = query.destination.as_deref().unwrap_or(""),
                days = query.days,
                budget = query.budget,
                "trip parameters extracted"
            );
            Ok(StageOutput::completed(StateDelta::write(
                FieldWrite::TripQuery(query),
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_capabilities::scripted::ScriptedAnalyzer;
    use wayfarer_core::error::AdapterFailure;
    use wayfarer_core::state::TripQuery;

    #[tokio::test]
    async fn writes_trip_parameters() {
        let stage = QueryAnalyzerStage::new(Arc::new(ScriptedAnalyzer::returning(TripQuery {
            destination: Some("Paris".into()),
            days: Some(3),
            ..Default::default()
        })));
        let state = TripState::from_request("Paris for 3 days");
        let output = stage.execute(&state).await.unwrap();
        match output.delta.write {
            Some(FieldWrite::TripQuery(q)) => assert_eq!(q.destination.as_deref(), Some("Paris")),
            other => panic!("unexpected write: {:?}", other),
        }
    }

    #[tokio::test]
    async fn adapter_failure_is_extraction_failed() {
        let stage = QueryAnalyzerStage::new(Arc::new(ScriptedAnalyzer::failing(
            AdapterFailure::malformed("trip_analyzer", "bad payload"),
        )));
        let state = TripState::from_request("???");
        let err = stage.execute(&state).await.unwrap_err();
        assert!(matches!(err, WayfarerError::ExtractionFailed(_)));
    }

    #[tokio::test]
    async fn missing_destination_is_extraction_failed() {
        let stage =
            QueryAnalyzerStage::new(Arc::new(ScriptedAnalyzer::returning(TripQuery::default())));
        let state = TripState::from_request("plan something");
        let err = stage.execute(&state).await.unwrap_err();
        assert!(matches!(err, WayfarerError::ExtractionFailed(_)));
    }

    #[test]
    fn timeout_is_fatal() {
        let stage =
            QueryAnalyzerStage::new(Arc::new(ScriptedAnalyzer::returning(TripQuery::default())));
        assert!(stage.on_timeout().is_none());
    }
}
