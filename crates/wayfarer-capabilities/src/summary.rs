use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Deserialize;
use tracing::debug;

use wayfarer_core::error::{AdapterFailure, AdapterResult};
use wayfarer_core::state::{TripSummary, TripView};
use wayfarer_core::traits::{SummaryWriter, TextGenerator};

use crate::prompt::{extract_json, render_trip_context};

const CAPABILITY: &str = "summary_writer";

const SYSTEM_PROMPT: &str = "\
You are the trip plan supervisor. Write the final summary of the assembled trip plan for the user.
Respond with ONLY a JSON object:
{
  \"summary\": \"the narrative summary, ending with the word FINAL when the plan is complete\",
  \"regenerate\": null or one of \"attractions\", \"budget\", \"itinerary\"
}
Set \"regenerate\" only when that part of the plan is unusable and must be rebuilt; otherwise use null.";

#[derive(Deserialize)]
struct SummaryPayload {
    summary: String,
    #[serde(default)]
    regenerate: Option<String>,
}

/// Produces the narrative summary plus the optional structured regeneration
/// signal. A reply that is not valid JSON is kept as plain prose; the
/// resolver still scans it for a textual marker.
pub struct PromptSummaryWriter {
    generator: Arc<dyn TextGenerator>,
}

impl PromptSummaryWriter {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

impl SummaryWriter for PromptSummaryWriter {
    fn summarize(&self, view: &TripView<'_>) -> BoxFuture<'_, AdapterResult<TripSummary>> {
        let mut user = render_trip_context(view);
        if let Some(itinerary) = view.itinerary {
            user.push_str("Itinerary:\n");
            for day in &itinerary.days {
                user.push_str(&format!("Day {}: {}\n", day.day, day.activities.join("; ")));
            }
        }
        Box::pin(async move {
            let reply = self.generator.generate(SYSTEM_PROMPT, &user).await?;
            if reply.trim().is_empty() {
                return Err(AdapterFailure::malformed(CAPABILITY, "empty summary"));
            }
            let summary = match serde_json::from_str::<SummaryPayload>(extract_json(&reply)) {
                Ok(payload) => TripSummary {
                    text: payload.summary,
                    regenerate: payload.regenerate,
                },
                Err(e) => {
                    debug!(error = %e, "summary reply is not structured, keeping prose");
                    TripSummary {
                        text: reply.trim().to_string(),
                        regenerate: None,
                    }
                }
            };
            Ok(summary)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::canned;
    use wayfarer_core::state::TripState;

    #[tokio::test]
    async fn parses_structured_reply() {
        let reply = r#"{"summary": "A lovely 3 days in Paris. FINAL", "regenerate": null}"#;
        let writer = PromptSummaryWriter::new(canned(reply));
        let state = TripState::from_request("Paris");
        let summary = writer.summarize(&state.view()).await.unwrap();
        assert!(summary.text.contains("Paris"));
        assert!(summary.regenerate.is_none());
    }

    #[tokio::test]
    async fn parses_regeneration_signal() {
        let reply = r#"{"summary": "The attraction list is empty.", "regenerate": "attractions"}"#;
        let writer = PromptSummaryWriter::new(canned(reply));
        let state = TripState::from_request("Paris");
        let summary = writer.summarize(&state.view()).await.unwrap();
        assert_eq!(summary.regenerate.as_deref(), Some("attractions"));
    }

    #[tokio::test]
    async fn keeps_prose_replies() {
        let writer = PromptSummaryWriter::new(canned("Enjoy your trip! regenerate:budget"));
        let state = TripState::from_request("Paris");
        let summary = writer.summarize(&state.view()).await.unwrap();
        assert!(summary.text.contains("regenerate:budget"));
        assert!(summary.regenerate.is_none());
    }
}
