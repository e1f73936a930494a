use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use wayfarer_capabilities::scripted::{
    sample_lodging, ScriptedAnalyzer, ScriptedAttractions, ScriptedBudget, ScriptedClassifier,
    ScriptedLodging, ScriptedSummary, ScriptedWeather,
};
use wayfarer_capabilities::{
    CurrencyConverter, HttpTextGenerator, PromptAttractionSearch, PromptBudgetPlanner,
    PromptLodgingSearch, PromptScopeClassifier, PromptSummaryWriter, PromptTripAnalyzer,
    PromptWeatherLookup, RetryingGenerator,
};
use wayfarer_core::config::AppConfig;
use wayfarer_core::state::{RunId, ScopeLabel, TripQuery};
use wayfarer_core::traits::TextGenerator;
use wayfarer_engine::executor::RunReport;
use wayfarer_engine::{PlannerCapabilities, TripPlanner};

#[derive(Parser)]
#[command(name = "wayfarer", version, about = "Multi-stage trip planning pipeline")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "wayfarer.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a trip from a free-form request
    Plan {
        /// The request, e.g. "3 days in Paris, 1000 USD, I like art"
        #[arg(trailing_var_arg = true)]
        request: Vec<String>,
        /// Use deterministic built-in capabilities instead of the HTTP backend
        #[arg(long)]
        offline: bool,
        /// Run identifier (auto-generated if not provided)
        #[arg(long)]
        run_id: Option<String>,
    },
    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Plan {
            request,
            offline,
            run_id,
        } => {
            if request.is_empty() {
                anyhow::bail!("empty request; tell me where you want to go");
            }
            let caps = if offline {
                offline_capabilities()
            } else {
                http_capabilities(&config)
            };
            let planner = TripPlanner::new(caps, config.engine.clone())?;
            let run_id = run_id.map(|s| RunId::from_str(&s)).unwrap_or_default();

            // Ctrl-C aborts the run between stage boundaries.
            let cancel = CancellationToken::new();
            let guard = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupt received, cancelling run");
                    guard.cancel();
                }
            });

            match planner
                .submit_with_cancel(request.join(" "), run_id, cancel)
                .await
            {
                Ok(report) => print_report(&report),
                Err(e) => {
                    error!(error = %e, "run failed");
                    return Err(e.into());
                }
            }
        }
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn http_capabilities(config: &AppConfig) -> PlannerCapabilities {
    let mut generator_config = config.generator.clone();
    if generator_config.api_key.is_none() {
        generator_config.api_key = std::env::var("WAYFARER_API_KEY").ok();
    }
    let generator: Arc<dyn TextGenerator> = Arc::new(RetryingGenerator::new(
        Arc::new(HttpTextGenerator::new(&generator_config)),
        config.retry.clone(),
    ));
    let converter = CurrencyConverter::with_overrides(&config.currency.rates);
    PlannerCapabilities {
        scope: Arc::new(PromptScopeClassifier::new(generator.clone())),
        analyzer: Arc::new(PromptTripAnalyzer::new(generator.clone())),
        lodging: Arc::new(PromptLodgingSearch::new(generator.clone())),
        weather: Arc::new(PromptWeatherLookup::new(generator.clone())),
        attractions: Arc::new(PromptAttractionSearch::new(generator.clone())),
        budget: Arc::new(PromptBudgetPlanner::new(generator.clone(), converter)),
        summary: Arc::new(PromptSummaryWriter::new(generator)),
    }
}

/// Canned sample data, so the whole pipeline can be exercised without a
/// backend.
fn offline_capabilities() -> PlannerCapabilities {
    PlannerCapabilities {
        scope: Arc::new(ScriptedClassifier::replying("TRAVEL")),
        analyzer: Arc::new(ScriptedAnalyzer::returning(TripQuery {
            destination: Some("Paris".into()),
            budget: Some(1000.0),
            native_currency: Some("USD".into()),
            days: Some(3),
            group_size: Some(2),
            activity_preferences: Some(vec!["art".into(), "culture".into()]),
            ..Default::default()
        })),
        lodging: Arc::new(ScriptedLodging::returning(sample_lodging())),
        weather: Arc::new(ScriptedWeather::returning(
            "Mild, 18-24C, occasional showers",
        )),
        attractions: Arc::new(ScriptedAttractions::returning(
            "- Louvre Museum (22 EUR)\n- Seine river cruise (16 EUR)\n- Montmartre walk (free)\n- Musée d'Orsay (16 EUR)",
        )),
        budget: Arc::new(ScriptedBudget::returning(
            "Lodging: 285 USD\nAttractions: 60 USD\nFood: 300 USD\nTransit: 55 USD\nRemaining: 300 USD",
        )),
        summary: Arc::new(ScriptedSummary::finishing(
            "Three days of art and culture in Paris, within a 1000 USD budget. FINAL",
        )),
    }
}

fn print_report(report: &RunReport) {
    let state = &report.state;
    println!("run {}", report.run_id);

    if state.scope == Some(ScopeLabel::NotTravel) {
        println!("\nThat doesn't look like a travel request, so no plan was made.");
        return;
    }

    if let Some(destination) = &state.destination {
        let days = state
            .days
            .map(|d| format!("{} days in ", d))
            .unwrap_or_default();
        println!("\n== {}{} ==", days, destination);
    }
    if let Some(itinerary) = &state.itinerary {
        for day in &itinerary.days {
            println!("\nDay {}:", day.day);
            for activity in &day.activities {
                println!("  - {}", activity);
            }
        }
    }
    if let Some(breakdown) = &state.budget_breakdown {
        println!("\nBudget:\n{}", breakdown);
    }
    if let Some(summary) = &state.summary {
        println!("\n{}", summary.text);
    }

    println!("\nStages:");
    for entry in report.trace.entries() {
        let note = match &entry.outcome {
            wayfarer_core::trace::StageOutcome::Completed => "ok".to_string(),
            wayfarer_core::trace::StageOutcome::Recovered(f) => format!("recovered: {}", f),
        };
        println!("  {} [{}]", entry.stage, note);
    }
}
