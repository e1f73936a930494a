use std::sync::Arc;

use futures::future::BoxFuture;

use wayfarer_core::error::{AdapterFailure, AdapterResult};
use wayfarer_core::state::TripView;
use wayfarer_core::traits::{AttractionSearch, TextGenerator};

use crate::prompt::today;

const CAPABILITY: &str = "attraction_search";

/// Attraction search with cost estimates, as free text (one attraction per
/// line works best for the downstream itinerary assembly).
pub struct PromptAttractionSearch {
    generator: Arc<dyn TextGenerator>,
}

impl PromptAttractionSearch {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

impl AttractionSearch for PromptAttractionSearch {
    fn find(&self, view: &TripView<'_>) -> BoxFuture<'_, AdapterResult<String>> {
        let system = format!(
            "You are an attractions expert. Your job is to find attractions and estimate their \
             costs. List one attraction per line with a rough price. Today is {}. Do not use \
             dates in the past.",
            today()
        );
        let mut user = format!(
            "Find attractions in {}.\n",
            view.destination.unwrap_or("the requested destination")
        );
        if !view.activity_preferences.is_empty() {
            user.push_str(&format!(
                "The traveler prefers: {}.\n",
                view.activity_preferences.join(", ")
            ));
        }
        if let Some(days) = view.days {
            user.push_str(&format!("Enough to fill {} days.\n", days));
        }
        Box::pin(async move {
            let reply = self.generator.generate(&system, &user).await?;
            let text = reply.trim().to_string();
            if text.is_empty() {
                return Err(AdapterFailure::malformed(CAPABILITY, "empty attraction list"));
            }
            Ok(text)
        })
    }
}
