use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

use wayfarer_core::error::{AdapterFailure, AdapterResult};
use wayfarer_core::state::TripQuery;
use wayfarer_core::traits::{TextGenerator, TripAnalyzer};

use crate::prompt::extract_json;

const CAPABILITY: &str = "trip_analyzer";

const SYSTEM_PROMPT: &str = "\
You are a travel request analyzer. Extract the trip parameters from the user's message.
Respond with ONLY a JSON object using exactly these keys:
{
  \"destination\": string or null,
  \"budget\": number or null,
  \"native_currency\": string or null (ISO code, e.g. \"USD\"),
  \"days\": integer or null,
  \"group_size\": integer or null,
  \"activity_preferences\": list of strings or null,
  \"accommodation_type\": string or null,
  \"dietary_restrictions\": list of strings or null,
  \"transportation_preferences\": string or null
}
Use null for anything the message does not state. Do not guess. No text outside the JSON object.";

/// Extracts trip parameters by asking the generation backend for a strict
/// JSON object and deserializing it.
pub struct PromptTripAnalyzer {
    generator: Arc<dyn TextGenerator>,
}

impl PromptTripAnalyzer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

impl TripAnalyzer for PromptTripAnalyzer {
    fn analyze(&self, message: &str) -> BoxFuture<'_, AdapterResult<TripQuery>> {
        let message = message.to_string();
        Box::pin(async move {
            let reply = self.generator.generate(SYSTEM_PROMPT, &message).await?;
            let payload = extract_json(&reply);
            let query: TripQuery = serde_json::from_str(payload).map_err(|e| {
                AdapterFailure::malformed(CAPABILITY, format!("bad analysis payload: {}", e))
            })?;
            debug!(destination = ?query.destination, days = ?query.days, "trip parameters parsed");
            Ok(query)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::canned;
    use wayfarer_core::error::FailureKind;

    #[tokio::test]
    async fn parses_full_payload() {
        let reply = r#"{
            "destination": "Paris",
            "budget": 1000,
            "native_currency": "USD",
            "days": 3,
            "group_size": 2,
            "activity_preferences": ["art", "culture"],
            "accommodation_type": null,
            "dietary_restrictions": null,
            "transportation_preferences": null
        }"#;
        let analyzer = PromptTripAnalyzer::new(canned(reply));
        let query = analyzer.analyze("Paris for 3 days").await.unwrap();
        assert_eq!(query.destination.as_deref(), Some("Paris"));
        assert_eq!(query.budget, Some(1000.0));
        assert_eq!(query.days, Some(3));
        assert_eq!(
            query.activity_preferences,
            Some(vec!["art".to_string(), "culture".to_string()])
        );
    }

    #[tokio::test]
    async fn tolerates_code_fences() {
        let reply = "```json\n{\"destination\": \"Lima\"}\n```";
        let analyzer = PromptTripAnalyzer::new(canned(reply));
        let query = analyzer.analyze("Lima trip").await.unwrap();
        assert_eq!(query.destination.as_deref(), Some("Lima"));
    }

    #[tokio::test]
    async fn malformed_payload_is_reported() {
        let analyzer = PromptTripAnalyzer::new(canned("I couldn't parse that request."));
        let err = analyzer.analyze("???").await.unwrap_err();
        assert_eq!(err.kind, FailureKind::MalformedOutput);
    }
}
