use std::sync::Arc;

use futures::future::BoxFuture;

use wayfarer_core::error::{AdapterFailure, AdapterResult};
use wayfarer_core::state::TripView;
use wayfarer_core::traits::{TextGenerator, WeatherLookup};

use crate::prompt::today;

const CAPABILITY: &str = "weather_lookup";

/// Forecast summary for the destination, as free text.
pub struct PromptWeatherLookup {
    generator: Arc<dyn TextGenerator>,
}

impl PromptWeatherLookup {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

impl WeatherLookup for PromptWeatherLookup {
    fn forecast(&self, view: &TripView<'_>) -> BoxFuture<'_, AdapterResult<String>> {
        let system = format!(
            "You are a weather expert. Your job is to fetch weather forecasts for the trip \
             destination. Today is {}. Do not use dates in the past.",
            today()
        );
        let user = format!(
            "Give a short forecast for {} covering the next {} days.",
            view.destination.unwrap_or("the requested destination"),
            view.days.unwrap_or(3)
        );
        Box::pin(async move {
            let reply = self.generator.generate(&system, &user).await?;
            let text = reply.trim().to_string();
            if text.is_empty() {
                return Err(AdapterFailure::malformed(CAPABILITY, "empty forecast"));
            }
            Ok(text)
        })
    }
}
