//! Deterministic adapters for tests and offline runs.
//!
//! Each adapter replays a canned response (or failure) and counts its
//! invocations, so tests can assert which capabilities a run touched.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use futures::future::BoxFuture;

use wayfarer_core::error::{AdapterFailure, AdapterResult};
use wayfarer_core::state::{LodgingOption, ScopeLabel, TripQuery, TripSummary, TripView};
use wayfarer_core::traits::{
    AttractionSearch, BudgetPlanner, LodgingSearch, ScopeClassifier, SummaryWriter, TextGenerator,
    TripAnalyzer, WeatherLookup,
};

/// Replies with a fixed raw label, exercising the same normalization path as
/// the prompt-backed classifier.
pub struct ScriptedClassifier {
    reply: String,
    calls: AtomicUsize,
}

impl ScriptedClassifier {
    pub fn replying(raw: impl Into<String>) -> Self {
        Self {
            reply: raw.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ScopeClassifier for ScriptedClassifier {
    fn classify(&self, _message: &str) -> BoxFuture<'_, AdapterResult<ScopeLabel>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = ScopeLabel::parse(&self.reply).ok_or_else(|| {
            AdapterFailure::malformed(
                "scope_classifier",
                format!("expected TRAVEL or NOT_TRAVEL, got {:?}", self.reply),
            )
        });
        Box::pin(async move { result })
    }
}

pub struct ScriptedAnalyzer {
    response: AdapterResult<TripQuery>,
    calls: AtomicUsize,
}

impl ScriptedAnalyzer {
    pub fn returning(query: TripQuery) -> Self {
        Self {
            response: Ok(query),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(failure: AdapterFailure) -> Self {
        Self {
            response: Err(failure),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TripAnalyzer for ScriptedAnalyzer {
    fn analyze(&self, _message: &str) -> BoxFuture<'_, AdapterResult<TripQuery>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = self.response.clone();
        Box::pin(async move { response })
    }
}

pub struct ScriptedLodging {
    response: AdapterResult<Vec<LodgingOption>>,
    calls: AtomicUsize,
}

impl ScriptedLodging {
    pub fn returning(options: Vec<LodgingOption>) -> Self {
        Self {
            response: Ok(options),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(failure: AdapterFailure) -> Self {
        Self {
            response: Err(failure),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LodgingSearch for ScriptedLodging {
    fn search(&self, _view: &TripView<'_>) -> BoxFuture<'_, AdapterResult<Vec<LodgingOption>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = self.response.clone();
        Box::pin(async move { response })
    }
}

pub struct ScriptedWeather {
    response: AdapterResult<String>,
    calls: AtomicUsize,
}

impl ScriptedWeather {
    pub fn returning(forecast: impl Into<String>) -> Self {
        Self {
            response: Ok(forecast.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(failure: AdapterFailure) -> Self {
        Self {
            response: Err(failure),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl WeatherLookup for ScriptedWeather {
    fn forecast(&self, _view: &TripView<'_>) -> BoxFuture<'_, AdapterResult<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = self.response.clone();
        Box::pin(async move { response })
    }
}

pub struct ScriptedAttractions {
    response: AdapterResult<String>,
    calls: AtomicUsize,
}

impl ScriptedAttractions {
    pub fn returning(listing: impl Into<String>) -> Self {
        Self {
            response: Ok(listing.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(failure: AdapterFailure) -> Self {
        Self {
            response: Err(failure),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AttractionSearch for ScriptedAttractions {
    fn find(&self, _view: &TripView<'_>) -> BoxFuture<'_, AdapterResult<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = self.response.clone();
        Box::pin(async move { response })
    }
}

pub struct ScriptedBudget {
    response: AdapterResult<String>,
    calls: AtomicUsize,
}

impl ScriptedBudget {
    pub fn returning(breakdown: impl Into<String>) -> Self {
        Self {
            response: Ok(breakdown.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(failure: AdapterFailure) -> Self {
        Self {
            response: Err(failure),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BudgetPlanner for ScriptedBudget {
    fn breakdown(&self, _view: &TripView<'_>) -> BoxFuture<'_, AdapterResult<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = self.response.clone();
        Box::pin(async move { response })
    }
}

/// Replays a sequence of summaries; the last entry repeats once the script
/// runs out. One entry that always signals regeneration produces an
/// unbounded loop, which is what the executor's cycle guard is for.
pub struct ScriptedSummary {
    responses: Mutex<VecDeque<AdapterResult<TripSummary>>>,
    calls: AtomicUsize,
}

impl ScriptedSummary {
    pub fn sequence(summaries: Vec<TripSummary>) -> Self {
        Self {
            responses: Mutex::new(summaries.into_iter().map(Ok).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn finishing(text: impl Into<String>) -> Self {
        Self::sequence(vec![TripSummary {
            text: text.into(),
            regenerate: None,
        }])
    }

    pub fn failing(failure: AdapterFailure) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from([Err(failure)])),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SummaryWriter for ScriptedSummary {
    fn summarize(&self, _view: &TripView<'_>) -> BoxFuture<'_, AdapterResult<TripSummary>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = {
            let mut responses = self.responses.lock().expect("scripted summary lock");
            if responses.len() > 1 {
                responses.pop_front().expect("non-empty script")
            } else {
                responses
                    .front()
                    .cloned()
                    .unwrap_or_else(|| Err(AdapterFailure::malformed("summary_writer", "empty script")))
            }
        };
        Box::pin(async move { response })
    }
}

/// A generator replying with fixed text, for wiring prompt-backed adapters
/// into offline runs.
pub struct ScriptedGenerator {
    reply: String,
}

impl ScriptedGenerator {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate(&self, _system: &str, _user: &str) -> BoxFuture<'_, AdapterResult<String>> {
        let reply = self.reply.clone();
        Box::pin(async move { Ok(reply) })
    }
}

/// Canned lodging results shared by offline runs and tests.
pub fn sample_lodging() -> Vec<LodgingOption> {
    vec![
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
    ]
}
