use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

use wayfarer_core::error::{AdapterFailure, AdapterResult};
use wayfarer_core::state::{LodgingOption, TripView};
use wayfarer_core::traits::{LodgingSearch, TextGenerator};

use crate::prompt::{extract_json, today};

const CAPABILITY: &str = "lodging_search";

/// Lodging search backed by the generation backend, held to a strict JSON
/// list contract.
pub struct PromptLodgingSearch {
    generator: Arc<dyn TextGenerator>,
}

impl PromptLodgingSearch {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    fn system_prompt() -> String {
        format!(
            "You are a hotel search expert. Your job is to find hotels and estimate costs. \
             Today is {}. Do not use dates in the past.\n\
             Always return a list of hotels in the following strict JSON format (no text, no summary):\n\
             [\n  {{\n    \"name\": \"...\",\n    \"price_per_night\": ...,\n    \"review_count\": ...,\n    \"rating\": ...,\n    \"url\": \"...\"\n  }}\n]\n\
             Do not include photos. Do not return any text or explanation, only the JSON list.",
            today()
        )
    }

    fn user_prompt(view: &TripView<'_>) -> String {
        let mut out = format!(
            "Find lodging in {}.\n",
            view.destination.unwrap_or("the requested destination")
        );
        if let Some(days) = view.days {
            out.push_str(&format!("Stay length: {} nights.\n", days));
        }
        if let Some(budget) = view.budget {
            out.push_str(&format!(
                "Total trip budget: {:.2} {}.\n",
                budget,
                view.native_currency.unwrap_or("USD")
            ));
        }
        if let Some(accommodation) = view.accommodation_type {
            out.push_str(&format!("Preferred accommodation type: {}.\n", accommodation));
        }
        if let Some(size) = view.group_size {
            out.push_str(&format!("Travelers: {}.\n", size));
        }
        out
    }
}

impl LodgingSearch for PromptLodgingSearch {
    fn search(&self, view: &TripView<'_>) -> BoxFuture<'_, AdapterResult<Vec<LodgingOption>>> {
        let system = Self::system_prompt();
        let user = Self::user_prompt(view);
        Box::pin(async move {
            let reply = self.generator.generate(&system, &user).await?;
            let payload = extract_json(&reply);
            let options: Vec<LodgingOption> = serde_json::from_str(payload).map_err(|e| {
                AdapterFailure::malformed(CAPABILITY, format!("expected a JSON list of hotels: {}", e))
            })?;
            debug!(count = options.len(), "lodging options parsed");
            Ok(options)
        })
    }
}
