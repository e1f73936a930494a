use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

use wayfarer_core::error::{AdapterFailure, AdapterResult};
use wayfarer_core::state::ScopeLabel;
use wayfarer_core::traits::{ScopeClassifier, TextGenerator};

const CAPABILITY: &str = "scope_classifier";

const SYSTEM_PROMPT: &str = "\
You are a travel query evaluator. Your job is to determine if a user message is travel-related.
A travel-related query should mention or imply:
- A destination or place to visit
- Travel dates or duration
- Travel activities, accommodation, or budget

Respond with ONLY \"TRAVEL\" if it's travel-related, or \"NOT_TRAVEL\" if it's not.";

/// Classifies requests by asking the generation backend for one of the two
/// literal labels.
pub struct PromptScopeClassifier {
    generator: Arc<dyn TextGenerator>,
}

impl PromptScopeClassifier {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

impl ScopeClassifier for PromptScopeClassifier {
    fn classify(&self, message: &str) -> BoxFuture<'_, AdapterResult<ScopeLabel>> {
        let message = message.to_string();
        Box::pin(async move {
            let reply = self.generator.generate(SYSTEM_PROMPT, &message).await?;
            debug!(reply = %reply.trim(), "scope classifier replied");
            ScopeLabel::parse(&reply).ok_or_else(|| {
                AdapterFailure::malformed(
                    CAPABILITY,
                    format!("expected TRAVEL or NOT_TRAVEL, got {:?}", reply.trim()),
                )
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::canned;
    use wayfarer_core::error::FailureKind;

    #[tokio::test]
    async fn accepts_travel_label() {
        let classifier = PromptScopeClassifier::new(canned("TRAVEL\n"));
        let label = classifier.classify("3 days in Rome").await.unwrap();
        assert_eq!(label, ScopeLabel::Travel);
    }

    #[tokio::test]
    async fn accepts_not_travel_label() {
        let classifier = PromptScopeClassifier::new(canned("NOT_TRAVEL"));
        let label = classifier.classify("what's 2+2?").await.unwrap();
        assert_eq!(label, ScopeLabel::NotTravel);
    }

    #[tokio::test]
    async fn rejects_anything_else() {
        let classifier = PromptScopeClassifier::new(canned("maybe travel?"));
        let err = classifier.classify("hm").await.unwrap_err();
        assert_eq!(err.kind, FailureKind::MalformedOutput);
    }
}
