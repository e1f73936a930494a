//! Turns the summary stage's output into a routing decision.
//!
//! The structured `regenerate` field wins; otherwise the prose is scanned
//! for a `regenerate:<stage>` marker. Anything unrecognized degrades to
//! termination; a bad signal must never livelock or abort the run.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use wayfarer_core::state::TripSummary;

use crate::stage::{RouteHint, StageId};

/// Stages the summary may send the run back to.
pub const REGENERATION_TARGETS: [StageId; 3] =
    [StageId::Attractions, StageId::Budget, StageId::Itinerary];

/// Resolve a summary into the next routing decision.
pub fn resolve(summary: &TripSummary) -> RouteHint {
    if let Some(target) = summary.regenerate.as_deref() {
        return resolve_target(target);
    }
    if let Some(target) = prose_marker(&summary.text) {
        return resolve_target(&target);
    }
    if summary.text.to_lowercase().contains("final") {
        debug!("summary is final, terminating");
        return RouteHint::Terminal;
    }
    // No recognizable signal either way
    RouteHint::Terminal
}

fn resolve_target(name: &str) -> RouteHint {
    match StageId::parse(name.trim()) {
        Some(id) if REGENERATION_TARGETS.contains(&id) => RouteHint::Goto(id),
        Some(id) => {
            warn!(stage = %id, "stage is not a legal regeneration target, terminating");
            RouteHint::Terminal
        }
        None => {
            warn!(requested = name, "unknown regeneration target, terminating");
            RouteHint::Terminal
        }
    }
}

fn prose_marker(text: &str) -> Option<String> {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    let re = MARKER.get_or_init(|| {
        Regex::new(r"regenerate:([a-z_]+)").expect("valid regeneration marker pattern")
    });
    re.captures(text).map(|c| c[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(text: &str, regenerate: Option<&str>) -> TripSummary {
        TripSummary {
            text: text.to_string(),
            regenerate: regenerate.map(|s| s.to_string()),
        }
    }

    #[test]
    fn structured_signal_routes_back() {
        let hint = resolve(&summary("attractions were thin", Some("attractions")));
        assert_eq!(hint, RouteHint::Goto(StageId::Attractions));
    }

    #[test]
    fn prose_marker_routes_back() {
        let hint = resolve(&summary("needs work. regenerate:budget", None));
        assert_eq!(hint, RouteHint::Goto(StageId::Budget));
    }

    #[test]
    fn structured_signal_wins_over_prose() {
        let hint = resolve(&summary("regenerate:budget", Some("itinerary")));
        assert_eq!(hint, RouteHint::Goto(StageId::Itinerary));
    }

    #[test]
    fn final_marker_terminates() {
        assert_eq!(resolve(&summary("all set. FINAL", None)), RouteHint::Terminal);
    }

    #[test]
    fn illegal_target_terminates() {
        // a real stage, but not in the regeneration set
        assert_eq!(
            resolve(&summary("x", Some("query_analyzer"))),
            RouteHint::Terminal
        );
        assert_eq!(
            resolve(&summary("regenerate:scope_gate", None)),
            RouteHint::Terminal
        );
    }

    #[test]
    fn unknown_target_terminates() {
        assert_eq!(resolve(&summary("x", Some("hotel_agent"))), RouteHint::Terminal);
    }

    #[test]
    fn no_signal_terminates() {
        assert_eq!(resolve(&summary("have a nice trip", None)), RouteHint::Terminal);
    }
}
