use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tracing::warn;

use wayfarer_core::config::RetryConfig;
use wayfarer_core::error::{AdapterFailure, AdapterResult};
use wayfarer_core::traits::TextGenerator;

/// A generation backend that retries transient failures with exponential
/// backoff before giving up. Malformed or refused replies are not retried.
pub struct RetryingGenerator {
    inner: Arc<dyn TextGenerator>,
    config: RetryConfig,
}

impl RetryingGenerator {
    pub fn new(inner: Arc<dyn TextGenerator>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

fn backoff(attempt: u32, config: &RetryConfig) -> Duration {
    let ms = (config.initial_backoff_ms * 2u64.pow(attempt)).min(config.max_backoff_ms);
    // Jitter: 0.8x to 1.2x
    let jitter = 0.8 + rand::random::<f64>() * 0.4;
    Duration::from_millis((ms as f64 * jitter) as u64)
}

impl TextGenerator for RetryingGenerator {
    fn generate(&self, system: &str, user: &str) -> BoxFuture<'_, AdapterResult<String>> {
        let system = system.to_string();
        let user = user.to_string();

        Box::pin(async move {
            let max_retries = self.config.max_retries;
            let mut last_err = None;
            for attempt in 0..=max_retries {
                match self.inner.generate(&system, &user).await {
                    Ok(text) => return Ok(text),
                    Err(e) if e.is_transient() && attempt < max_retries => {
                        let delay = backoff(attempt, &self.config);
                        warn!(
                            attempt = attempt + 1,
                            max_retries,
                            backoff_ms = delay.as_millis() as u64,
                            error = %e,
                            "retrying generation request"
                        );
                        tokio::time::sleep(delay).await;
                        last_err = Some(e);
                    }
                    Err(e) => return Err(e),
                }
            }
            Err(last_err
                .unwrap_or_else(|| AdapterFailure::transport("generation", "all retries failed")))
        })
    }
}
