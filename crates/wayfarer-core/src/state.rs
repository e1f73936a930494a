use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one pipeline run.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_str(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role in the conversation threaded through the run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A conversation turn. The first message of a run is the triggering request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            timestamp: Some(Utc::now()),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            timestamp: Some(Utc::now()),
        }
    }
}

/// Verdict of the scope gate. Only these two labels are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeLabel {
    #[serde(rename = "TRAVEL")]
    Travel,
    #[serde(rename = "NOT_TRAVEL")]
    NotTravel,
}

impl ScopeLabel {
    /// Parse the literal classifier labels. Anything else is unrecognized.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "TRAVEL" => Some(Self::Travel),
            "NOT_TRAVEL" => Some(Self::NotTravel),
            _ => None,
        }
    }
}

/// Trip parameters extracted from the user's request.
///
/// Every field is optional at the parse layer; `validate` enforces the
/// minimum needed for downstream stages to do anything useful.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TripQuery {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub native_currency: Option<String>,
    #[serde(default)]
    pub days: Option<u32>,
    #[serde(default)]
    pub group_size: Option<u32>,
    #[serde(default)]
    pub activity_preferences: Option<Vec<String>>,
    #[serde(default)]
    pub accommodation_type: Option<String>,
    #[serde(default)]
    pub dietary_restrictions: Option<Vec<String>>,
    #[serde(default)]
    pub transportation_preferences: Option<String>,
}

impl TripQuery {
    /// A destination is required; everything else can be filled with defaults
    /// by downstream stages.
    pub fn validate(&self) -> std::result::Result<(), String> {
        match self.destination.as_deref() {
            Some(d) if !d.trim().is_empty() => Ok(()),
            _ => Err("no destination found in the request".to_string()),
        }
    }
}

/// One lodging search result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LodgingOption {
    pub name: String,
    pub price_per_night: f64,
    pub rating: f64,
    pub review_count: u64,
    pub url: String,
}

/// A single day of the assembled plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayPlan {
    pub day: u32,
    pub activities: Vec<String>,
}

/// Day-by-day plan assembled from everything the domain stages collected.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Itinerary {
    pub days: Vec<DayPlan>,
}

impl Itinerary {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Final narrative summary, with the optional structured regeneration signal.
///
/// `regenerate` names the stage the supervisor wants re-run; the prose in
/// `text` may also carry a `regenerate:<stage>` marker for backends that
/// cannot be constrained to structured output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripSummary {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regenerate: Option<String>,
}

/// The shared state record for one run.
///
/// Created once per incoming request and mutated only by the executor's merge
/// function. Each non-message field has exactly one writing stage; the typed
/// `FieldWrite` delta makes cross-stage writes unrepresentable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripState {
    pub messages: Vec<ChatMessage>,
    pub scope: Option<ScopeLabel>,
    pub destination: Option<String>,
    pub budget: Option<f64>,
    pub native_currency: Option<String>,
    pub days: Option<u32>,
    pub group_size: Option<u32>,
    pub activity_preferences: Option<Vec<String>>,
    pub accommodation_type: Option<String>,
    pub dietary_restrictions: Option<Vec<String>>,
    pub transportation_preferences: Option<String>,
    pub lodging: Vec<LodgingOption>,
    pub weather: Option<String>,
    pub attractions: Option<String>,
    pub budget_breakdown: Option<String>,
    pub itinerary: Option<Itinerary>,
    pub summary: Option<TripSummary>,
}

impl TripState {
    /// Build the initial record for an incoming request.
    pub fn from_request(text: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::user(text)],
            ..Default::default()
        }
    }

    /// The most recent conversation turn's text, if any.
    pub fn latest_text(&self) -> Option<&str> {
        self.messages.last().map(|m| m.text.as_str())
    }

    /// Narrowed read-only projection handed to capability adapters.
    pub fn view(&self) -> TripView<'_> {
        TripView {
            latest_message: self.latest_text().unwrap_or(""),
            destination: self.destination.as_deref(),
            budget: self.budget,
            native_currency: self.native_currency.as_deref(),
            days: self.days,
            group_size: self.group_size,
            activity_preferences: self.activity_preferences.as_deref().unwrap_or(&[]),
            accommodation_type: self.accommodation_type.as_deref(),
            dietary_restrictions: self.dietary_restrictions.as_deref().unwrap_or(&[]),
            transportation_preferences: self.transportation_preferences.as_deref(),
            lodging: &self.lodging,
            weather: self.weather.as_deref(),
            attractions: self.attractions.as_deref(),
            budget_breakdown: self.budget_breakdown.as_deref(),
            itinerary: self.itinerary.as_ref(),
        }
    }

    /// Apply a single field write. Callers go through the executor's merge;
    /// this is the only assignment path for stage-owned fields.
    pub fn apply(&mut self, write: FieldWrite) {
        match write {
            FieldWrite::Scope(label) => self.scope = Some(label),
            FieldWrite::TripQuery(q) => {
                self.destination = q.destination;
                self.budget = q.budget;
                self.native_currency = q.native_currency;
                self.days = q.days;
                self.group_size = q.group_size;
                self.activity_preferences = q.activity_preferences;
                self.accommodation_type = q.accommodation_type;
                self.dietary_restrictions = q.dietary_restrictions;
                self.transportation_preferences = q.transportation_preferences;
            }
            FieldWrite::Lodging(options) => self.lodging = options,
            FieldWrite::Weather(text) => self.weather = Some(text),
            FieldWrite::Attractions(text) => self.attractions = Some(text),
            FieldWrite::BudgetBreakdown(text) => self.budget_breakdown = Some(text),
            FieldWrite::Itinerary(it) => self.itinerary = Some(it),
            FieldWrite::Summary(s) => self.summary = Some(s),
        }
    }
}

/// Read-only view of the state, narrowed to what capabilities may see.
#[derive(Debug, Clone, Copy)]
pub struct TripView<'a> {
    pub latest_message: &'a str,
    pub destination: Option<&'a str>,
    pub budget: Option<f64>,
    pub native_currency: Option<&'a str>,
    pub days: Option<u32>,
    pub group_size: Option<u32>,
    pub activity_preferences: &'a [String],
    pub accommodation_type: Option<&'a str>,
    pub dietary_restrictions: &'a [String],
    pub transportation_preferences: Option<&'a str>,
    pub lodging: &'a [LodgingOption],
    pub weather: Option<&'a str>,
    pub attractions: Option<&'a str>,
    pub budget_breakdown: Option<&'a str>,
    pub itinerary: Option<&'a Itinerary>,
}

/// A write to the single stage-owned field of the writing stage.
///
/// One variant per owned field, so a stage cannot express a write to another
/// stage's field. A re-entered stage overwrites only its own variant's field.
#[derive(Debug, Clone)]
pub enum FieldWrite {
    Scope(ScopeLabel),
    TripQuery(TripQuery),
    Lodging(Vec<LodgingOption>),
    Weather(String),
    Attractions(String),
    BudgetBreakdown(String),
    Itinerary(Itinerary),
    Summary(TripSummary),
}

impl FieldWrite {
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Scope(_) => "scope",
            Self::TripQuery(_) => "trip_parameters",
            Self::Lodging(_) => "lodging",
            Self::Weather(_) => "weather",
            Self::Attractions(_) => "attractions",
            Self::BudgetBreakdown(_) => "budget_breakdown",
            Self::Itinerary(_) => "itinerary",
            Self::Summary(_) => "summary",
        }
    }
}

/// What a stage hands back to the executor instead of mutating state itself.
#[derive(Debug, Clone, Default)]
pub struct StateDelta {
    /// Turns to append to the conversation. Never removes existing entries.
    pub messages: Vec<ChatMessage>,
    /// At most one write, to the producing stage's own field.
    pub write: Option<FieldWrite>,
}

impl StateDelta {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn write(write: FieldWrite) -> Self {
        Self {
            messages: Vec::new(),
            write: Some(write),
        }
    }

    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_label_parses_only_known_literals() {
        assert_eq!(ScopeLabel::parse("TRAVEL"), Some(ScopeLabel::Travel));
        assert_eq!(ScopeLabel::parse("  NOT_TRAVEL\n"), Some(ScopeLabel::NotTravel));
        assert_eq!(ScopeLabel::parse("travel"), None);
        assert_eq!(ScopeLabel::parse(""), None);
        assert_eq!(ScopeLabel::parse("MAYBE"), None);
    }

    #[test]
    fn query_validation_requires_destination() {
        let mut q = TripQuery::default();
        assert!(q.validate().is_err());

        q.destination = Some("   ".into());
        assert!(q.validate().is_err());

        q.destination = Some("Paris".into());
        assert!(q.validate().is_ok());
    }

    #[test]
    fn from_request_seeds_conversation() {
        let state = TripState::from_request("3 days in Lisbon");
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].role, Role::User);
        assert_eq!(state.latest_text(), Some("3 days in Lisbon"));
        assert!(state.scope.is_none());
        assert!(state.lodging.is_empty());
    }

    #[test]
    fn apply_trip_query_populates_parameters() {
        let mut state = TripState::from_request("plan a trip");
        state.apply(FieldWrite::TripQuery(TripQuery {
            destination: Some("Kyoto".into()),
            budget: Some(2500.0),
            native_currency: Some("USD".into()),
            days: Some(5),
            ..Default::default()
        }));
        assert_eq!(state.destination.as_deref(), Some("Kyoto"));
        assert_eq!(state.budget, Some(2500.0));
        assert_eq!(state.days, Some(5));
        assert!(state.group_size.is_none());
    }

    #[test]
    fn view_defaults_empty_slices() {
        let state = TripState::from_request("hello");
        let view = state.view();
        assert_eq!(view.latest_message, "hello");
        assert!(view.activity_preferences.is_empty());
        assert!(view.lodging.is_empty());
        assert!(view.itinerary.is_none());
    }

    #[test]
    fn trip_query_deserializes_with_missing_fields() {
        let q: TripQuery =
            serde_json::from_str(r#"{"destination": "Rome", "days": 4}"#).unwrap();
        assert_eq!(q.destination.as_deref(), Some("Rome"));
        assert_eq!(q.days, Some(4));
        assert!(q.budget.is_none());
        assert!(q.activity_preferences.is_none());
    }
}
