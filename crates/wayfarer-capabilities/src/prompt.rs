//! Shared helpers for the prompt-backed capabilities.

use chrono::Utc;

use wayfarer_core::state::TripView;

/// Today's date in YYYY-MM-DD, injected into prompts so backends do not plan
/// around past dates.
pub fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// Pull a JSON payload out of a reply that may wrap it in code fences or
/// surrounding prose. Returns the original text when no payload is found.
pub fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();

    for fence in ["```json", "```"] {
        if let Some(start) = trimmed.find(fence) {
            let after = &trimmed[start + fence.len()..];
            if let Some(end) = after.find("```") {
                return after[..end].trim();
            }
        }
    }

    // Bare object or list embedded in prose, whichever opens first.
    let object = trimmed
        .find('{')
        .and_then(|s| trimmed.rfind('}').map(|e| (s, e)));
    let list = trimmed
        .find('[')
        .and_then(|s| trimmed.rfind(']').map(|e| (s, e)));
    let span = match (object, list) {
        (Some(o), Some(l)) => Some(if l.0 < o.0 { l } else { o }),
        (o, l) => o.or(l),
    };
    if let Some((start, end)) = span {
        if start < end {
            return &trimmed[start..=end];
        }
    }

    trimmed
}

/// Render the known trip context as labeled lines for a prompt.
pub fn render_trip_context(view: &TripView<'_>) -> String {
    let mut out = String::new();
    if let Some(destination) = view.destination {
        out.push_str(&format!("Destination: {}\n", destination));
    }
    if let Some(days) = view.days {
        out.push_str(&format!("Trip length: {} days\n", days));
    }
    if let Some(budget) = view.budget {
        out.push_str(&format!(
            "Budget: {:.2} {}\n",
            budget,
            view.native_currency.unwrap_or("USD")
        ));
    }
    if let Some(size) = view.group_size {
        out.push_str(&format!("Group size: {}\n", size));
    }
    if !view.activity_preferences.is_empty() {
        out.push_str(&format!(
            "Activity preferences: {}\n",
            view.activity_preferences.join(", ")
        ));
    }
    if let Some(accommodation) = view.accommodation_type {
        out.push_str(&format!("Accommodation type: {}\n", accommodation));
    }
    if !view.dietary_restrictions.is_empty() {
        out.push_str(&format!(
            "Dietary restrictions: {}\n",
            view.dietary_restrictions.join(", ")
        ));
    }
    if let Some(transport) = view.transportation_preferences {
        out.push_str(&format!("Transportation preferences: {}\n", transport));
    }
    if !view.lodging.is_empty() {
        out.push_str("Lodging options:\n");
        for option in view.lodging {
            out.push_str(&format!(
                "- {} ({:.2}/night, rated {:.1} over {} reviews)\n",
                option.name, option.price_per_night, option.rating, option.review_count
            ));
        }
    }
    if let Some(weather) = view.weather {
        out.push_str(&format!("Weather: {}\n", weather));
    }
    if let Some(attractions) = view.attractions {
        out.push_str(&format!("Attractions:\n{}\n", attractions));
    }
    if let Some(breakdown) = view.budget_breakdown {
        out.push_str(&format!("Budget breakdown:\n{}\n", breakdown));
    }
    out
}
