pub mod config;
pub mod error;
pub mod state;
pub mod trace;
pub mod traits;

pub use config::AppConfig;
pub use error::{AdapterFailure, AdapterResult, FailureKind, Result, WayfarerError};
pub use state::*;
pub use trace::{RunTrace, StageOutcome, TraceEntry};
