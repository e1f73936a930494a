use std::sync::Arc;

use futures::future::BoxFuture;

use wayfarer_core::error::{AdapterFailure, AdapterResult};
use wayfarer_core::state::TripView;
use wayfarer_core::traits::{BudgetPlanner, TextGenerator};

use crate::currency::CurrencyConverter;
use crate::prompt::{render_trip_context, today};

const CAPABILITY: &str = "budget_planner";

/// Budget allocation expert: splits the user's budget across the costs the
/// earlier stages collected, with currency conversion pre-computed locally.
pub struct PromptBudgetPlanner {
    generator: Arc<dyn TextGenerator>,
    converter: CurrencyConverter,
}

impl PromptBudgetPlanner {
    pub fn new(generator: Arc<dyn TextGenerator>, converter: CurrencyConverter) -> Self {
        Self {
            generator,
            converter,
        }
    }

    /// Costs that can be computed without the backend, so the breakdown is
    /// anchored in real numbers rather than guesses.
    fn known_costs(&self, view: &TripView<'_>) -> String {
        let mut lines = String::new();
        if let Some(days) = view.days {
            if let Some(nightly) = view
                .lodging
                .iter()
                .map(|l| l.price_per_night)
                .min_by(|a, b| a.total_cmp(b))
            {
                lines.push_str(&format!(
                    "Cheapest lodging: {:.2} per night, {:.2} for {} nights\n",
                    nightly,
                    nightly * days as f64,
                    days
                ));
            }
        }
        if let (Some(budget), Some(currency)) = (view.budget, view.native_currency) {
            if !currency.eq_ignore_ascii_case("USD") {
                match self.converter.convert(budget, currency, "USD") {
                    Some(usd) => lines.push_str(&format!(
                        "Budget: {:.2} {} (~{:.2} USD)\n",
                        budget, currency, usd
                    )),
                    None => lines.push_str(&format!(
                        "Budget: {:.2} {} (no conversion rate available)\n",
                        budget, currency
                    )),
                }
            }
        }
        lines
    }
}

impl BudgetPlanner for PromptBudgetPlanner {
    fn breakdown(&self, view: &TripView<'_>) -> BoxFuture<'_, AdapterResult<String>> {
        let system = format!(
            "You are a calculator and budget allocation expert. Your job is to:\n\
             - Extract all costs you can find in the provided trip context (lodging prices, attraction costs, etc.).\n\
             - Split the user's budget across these costs and provide a clear, itemized breakdown.\n\
             - Estimate food and local transportation when they are missing.\n\
             - Note any currency conversions performed.\n\
             Today is {}. Do not use dates in the past.",
            today()
        );
        let mut user = render_trip_context(view);
        let known = self.known_costs(view);
        if !known.is_empty() {
            user.push_str("Pre-computed costs:\n");
            user.push_str(&known);
        }
        Box::pin(async move {
            let reply = self.generator.generate(&system, &user).await?;
            let text = reply.trim().to_string();
            if text.is_empty() {
                return Err(AdapterFailure::malformed(CAPABILITY, "empty breakdown"));
            }
            Ok(text)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::canned;
    use wayfarer_core::state::{LodgingOption, TripState};

    fn stocked_state() -> TripState {
        let mut state = TripState::from_request("Paris on a budget");
        state.destination = Some("Paris".into());
        state.budget = Some(1000.0);
        state.native_currency = Some("EUR".into());
        state.days = Some(3);
        state.lodging = vec![
            LodgingOption {
                name: "Hotel Lumiere".into(),
                price_per_night: 180.0,
                rating: 4.5,
                review_count: 2400,
                url: "https://example.com/lumiere".into(),
            },
            LodgingOption {
                name: "Le Petit Rêve".into(),
                price_per_night: 95.0,
                rating: 4.1,
                review_count: 800,
                url: "https://example.com/reve".into(),
            },
        ];
        state
    }

    #[test]
    fn known_costs_use_cheapest_lodging_and_conversion() {
        let planner = PromptBudgetPlanner::new(canned("x"), CurrencyConverter::new());
        let state = stocked_state();
        let costs = planner.known_costs(&state.view());
        assert!(costs.contains("95.00 per night"));
        assert!(costs.contains("285.00 for 3 nights"));
        assert!(costs.contains("1000.00 EUR"));
        assert!(costs.contains("USD"));
    }

    #[test]
    fn known_costs_flag_missing_rates() {
        let planner = PromptBudgetPlanner::new(canned("x"), CurrencyConverter::new());
        let mut state = stocked_state();
        state.native_currency = Some("ZZZ".into());
        let costs = planner.known_costs(&state.view());
        assert!(costs.contains("no conversion rate available"));
    }

    #[tokio::test]
    async fn returns_breakdown_text() {
        let planner = PromptBudgetPlanner::new(
            canned("Lodging: 285 EUR\nFood: 200 EUR\nAttractions: 100 EUR"),
            CurrencyConverter::new(),
        );
        let state = stocked_state();
        let breakdown = planner.breakdown(&state.view()).await.unwrap();
        assert!(breakdown.contains("Lodging: 285 EUR"));
    }
}
