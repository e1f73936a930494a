use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{info, warn};

use wayfarer_core::error::Result;
use wayfarer_core::state::{ChatMessage, FieldWrite, StateDelta, TripState, TripSummary};
use wayfarer_core::traits::SummaryWriter;

use crate::regen;
use crate::stage::{RouteHint, Stage, StageId, StageOutput};

/// Final narrative summary, and the only source of dynamic routing.
///
/// The resolver turns the summary's regeneration signal into a `Goto` back
/// to a legal target, or terminates. A failed summary is recoverable: the
/// record is already complete at this point, so the run ends with a fallback
/// text instead of aborting.
pub struct SummaryStage {
    writer: Arc<dyn SummaryWriter>,
}

impl SummaryStage {
    pub fn new(writer: Arc<dyn SummaryWriter>) -> Self {
        Self { writer }
    }
}

impl Stage for SummaryStage {
    fn id(&self) -> StageId {
        StageId::Summary
    }

    fn execute<'a>(&'a self, state: &'a TripState) -> BoxFuture<'a, Result<StageOutput>> {
        Box::pin(async move {
            match self.writer.summarize(&state.view()).await {
                Ok(summary) => {
                    let route = regen::resolve(&summary);
                    if let RouteHint::Goto(target) = route {
                        info!(stage = %target, "summary requested regeneration");
                    } else {
                        info!("summary complete");
                    }
                    let delta = StateDelta::write(FieldWrite::Summary(summary.clone()))
                        .with_message(ChatMessage::assistant(summary.text));
                    Ok(StageOutput::completed(delta).with_route(route))
                }
                Err(failure) => {
                    warn!(error = %failure, "summary generation failed, terminating with fallback");
                    let fallback = fallback_summary(state);
                    let delta = StateDelta::write(FieldWrite::Summary(fallback.clone()))
                        .with_message(ChatMessage::assistant(fallback.text));
                    Ok(StageOutput::recovered(delta, failure).with_route(RouteHint::Terminal))
                }
            }
        })
    }

    fn on_timeout(&self) -> Option<StageOutput> {
        let fallback = TripSummary {
            text: "Your trip plan is ready; see the itinerary for details.".to_string(),
            regenerate: None,
        };
        let delta = StateDelta::write(FieldWrite::Summary(fallback.clone()))
            .with_message(ChatMessage::assistant(fallback.text));
        Some(
            StageOutput::recovered(
                delta,
                wayfarer_core::error::AdapterFailure::timeout("summary_writer", "stage timed out"),
            )
            .with_route(RouteHint::Terminal),
        )
    }
}

fn fallback_summary(state: &TripState) -> TripSummary {
    let destination = state.destination.as_deref().unwrap_or("your destination");
    let text = match state.days {
        Some(days) => format!(
            "Trip plan for {} days in {}; see the itinerary for details.",
            days, destination
        ),
        None => format!("Trip plan for {}; see the itinerary for details.", destination),
    };
    TripSummary {
        text,
        regenerate: None,
    }
}
