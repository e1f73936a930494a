use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::info;

use wayfarer_core::error::{FailureKind, Result, WayfarerError};
use wayfarer_core::state::{FieldWrite, StateDelta, TripState};
use wayfarer_core::traits::ScopeClassifier;

use crate::stage::{Stage, StageId, StageOutput};

/// Entry gate: classifies the latest message as travel-related or not.
///
/// The contract is strictly binary. An unrecognized label is a fatal
/// classification failure: the run aborts rather than guessing.
pub struct ScopeGateStage {
    classifier: Arc<dyn ScopeClassifier>,
}

impl ScopeGateStage {
    pub fn new(classifier: Arc<dyn ScopeClassifier>) -> Self {
        Self { classifier }
    }
}

impl Stage for ScopeGateStage {
    fn id(&self) -> StageId {
        StageId::ScopeGate
    }

    fn execute<'a>(&'a self, state: &'a TripState) -> BoxFuture<'a, Result<StageOutput>> {
        Box::pin(async move {
            let message = state.latest_text().unwrap_or("");
            match self.classifier.classify(message).await {
                Ok(label) => {
                    info!(label = ?label, "request classified");
                    Ok(StageOutput::completed(StateDelta::write(FieldWrite::Scope(
                        label,
                    ))))
                }
                Err(failure) if failure.kind == FailureKind::MalformedOutput => {
                    Err(WayfarerError::InvalidClassification(failure.message))
                }
                Err(failure) => Err(failure.into()),
            }
        })
    }
}
