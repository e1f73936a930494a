//! Capability adapters for the Wayfarer pipeline.
//!
//! Every external collaborator sits behind one adapter that either returns a
//! normalized value or raises an `AdapterFailure`; the engine's stages decide
//! what a failure means. The prompt-backed adapters share one
//! `TextGenerator` backend; the scripted adapters replay canned data for
//! tests and offline runs.

pub mod analyzer;
pub mod attractions;
pub mod budget;
pub mod client;
pub mod currency;
pub mod lodging;
pub mod prompt;
pub mod retry;
pub mod scope;
pub mod scripted;
pub mod summary;
pub mod weather;

pub use analyzer::PromptTripAnalyzer;
pub use attractions::PromptAttractionSearch;
pub use budget::PromptBudgetPlanner;
pub use client::HttpTextGenerator;
pub use currency::CurrencyConverter;
pub use lodging::PromptLodgingSearch;
pub use retry::RetryingGenerator;
pub use scope::PromptScopeClassifier;
pub use summary::PromptSummaryWriter;
pub use weather::PromptWeatherLookup;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use futures::future::BoxFuture;

    use wayfarer_core::error::AdapterResult;
    use wayfarer_core::traits::TextGenerator;

    pub struct CannedGenerator(String);

    impl TextGenerator for CannedGenerator {
        fn generate(&self, _system: &str, _user: &str) -> BoxFuture<'_, AdapterResult<String>> {
            let reply = self.0.clone();
            Box::pin(async move { Ok(reply) })
        }
    }

    pub fn canned(reply: &str) -> Arc<dyn TextGenerator> {
        Arc::new(CannedGenerator(reply.to_string()))
    }
}
