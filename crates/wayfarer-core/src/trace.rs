use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AdapterFailure;

/// Outcome of one stage invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageOutcome {
    /// The stage produced its result normally.
    Completed,
    /// A capability failure was absorbed and a safe default written.
    Recovered(AdapterFailure),
}

impl StageOutcome {
    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered(_))
    }
}

/// One entry of the per-run execution trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    pub stage: String,
    pub at: DateTime<Utc>,
    pub outcome: StageOutcome,
}

/// Ordered record of every stage invocation in a run, in execution order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunTrace {
    entries: Vec<TraceEntry>,
}

impl RunTrace {
    pub fn record(&mut self, stage: impl Into<String>, outcome: StageOutcome) {
        self.entries.push(TraceEntry {
            stage: stage.into(),
            at: Utc::now(),
            outcome,
        });
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    /// How many times a stage appears in the trace.
    pub fn visits(&self, stage: &str) -> usize {
        self.entries.iter().filter(|e| e.stage == stage).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdapterFailure;

    #[test]
    fn visits_counts_reentries() {
        let mut trace = RunTrace::default();
        trace.record("attractions", StageOutcome::Completed);
        trace.record("budget", StageOutcome::Completed);
        trace.record("attractions", StageOutcome::Completed);
        assert_eq!(trace.visits("attractions"), 2);
        assert_eq!(trace.visits("budget"), 1);
        assert_eq!(trace.visits("lodging"), 0);
    }

    #[test]
    fn recovered_entries_keep_the_failure() {
        let mut trace = RunTrace::default();
        trace.record(
            "lodging",
            StageOutcome::Recovered(AdapterFailure::malformed("lodging_search", "bad list")),
        );
        assert_eq!(trace.entries().len(), 1);
        assert!(trace.entries()[0].outcome.is_recovered());
    }
}
