use futures::future::BoxFuture;
use tracing::info;

use wayfarer_core::error::Result;
use wayfarer_core::state::{DayPlan, FieldWrite, Itinerary, StateDelta, TripState};

use crate::stage::{Stage, StageId, StageOutput};

/// Assembles the day-by-day plan from everything collected so far.
///
/// Pure function of state, with no capability call and no failure mode.
/// Works with whatever is present: missing lodging, weather, or attractions
/// just thin out the plan.
pub struct ItineraryStage;

impl ItineraryStage {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ItineraryStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for ItineraryStage {
    fn id(&self) -> StageId {
        StageId::Itinerary
    }

    fn execute<'a>(&'a self, state: &'a TripState) -> BoxFuture<'a, Result<StageOutput>> {
        Box::pin(async move {
            let itinerary = build_itinerary(state);
            info!(days = itinerary.days.len(), "itinerary assembled");
            Ok(StageOutput::completed(StateDelta::write(
                FieldWrite::Itinerary(itinerary),
            )))
        })
    }
}

fn build_itinerary(state: &TripState) -> Itinerary {
    let total_days = state.days.unwrap_or(1).max(1);
    let destination = state.destination.as_deref().unwrap_or("your destination");

    // Best-rated lodging wins; ties go to the cheaper one.
    let lodging = state.lodging.iter().max_by(|a, b| {
        a.rating
            .total_cmp(&b.rating)
            .then(b.price_per_night.total_cmp(&a.price_per_night))
    });

    let attractions: Vec<&str> = state
        .attractions
        .as_deref()
        .map(|text| {
            text.lines()
                .map(|line| line.trim().trim_start_matches(['-', '*', ' ']))
                .filter(|line| !line.is_empty())
                .collect()
        })
        .unwrap_or_default();
    // Spread attractions evenly; earlier days get the remainder.
    let per_day = attractions.len().div_ceil(total_days as usize).max(1);

    let mut days = Vec::with_capacity(total_days as usize);
    for day in 1..=total_days {
        let mut activities = Vec::new();
        if day == 1 {
            match lodging {
                Some(option) => activities.push(format!(
                    "Arrive in {} and check in at {}",
                    destination, option.name
                )),
                None => activities.push(format!("Arrive in {}", destination)),
            }
            if let Some(weather) = state.weather.as_deref() {
                activities.push(format!("Expected weather: {}", weather));
            }
        }

        let start = (day as usize - 1) * per_day;
        for attraction in attractions.iter().skip(start).take(per_day) {
            activities.push(format!("Visit {}", attraction));
        }

        if day == total_days {
            activities.push(format!("Depart from {}", destination));
        }
        days.push(DayPlan { day, activities });
    }

    Itinerary { days }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_capabilities::scripted::sample_lodging;

    fn stocked_state() -> TripState {
        let mut state = TripState::from_request("Paris for 3 days");
        state.destination = Some("Paris".into());
        state.days = Some(3);
        state.lodging = sample_lodging();
        state.weather = Some("Mild, occasional rain".into());
        state.attractions = Some("- Louvre\n- Seine cruise\n- Montmartre\n\n- Musée d'Orsay".into());
        state
    }

    #[test]
    fn covers_every_day() {
        let itinerary = build_itinerary(&stocked_state());
        assert_eq!(itinerary.days.len(), 3);
        assert_eq!(itinerary.days[0].day, 1);
        assert!(itinerary.days[0].activities[0].contains("check in"));
        assert!(itinerary
            .days
            .last()
            .unwrap()
            .activities
            .last()
            .unwrap()
            .contains("Depart"));
    }

    #[test]
    fn distributes_attractions_across_days() {
        let itinerary = build_itinerary(&stocked_state());
        let visits: usize = itinerary
            .days
            .iter()
            .flat_map(|d| &d.activities)
            .filter(|a| a.starts_with("Visit "))
            .count();
        assert_eq!(visits, 4);
    }

    #[test]
    fn picks_best_rated_lodging() {
        let itinerary = build_itinerary(&stocked_state());
        // Hotel Lumiere is rated 4.5, above Le Petit Rêve's 4.1
        assert!(itinerary.days[0].activities[0].contains("Hotel Lumiere"));
    }

    #[test]
    fn works_from_an_empty_record() {
        let mut state = TripState::from_request("trip");
        state.destination = Some("Oslo".into());
        let itinerary = build_itinerary(&state);
        assert_eq!(itinerary.days.len(), 1);
        assert!(itinerary.days[0].activities[0].contains("Arrive in Oslo"));
    }

    #[test]
    fn defaults_missing_day_count_to_one() {
        let state = TripState::from_request("somewhere nice");
        let itinerary = build_itinerary(&state);
        assert_eq!(itinerary.days.len(), 1);
    }
}
