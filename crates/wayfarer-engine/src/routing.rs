use std::collections::HashMap;

use wayfarer_core::error::{Result, WayfarerError};
use wayfarer_core::state::{ScopeLabel, TripState};

use crate::stage::StageId;

/// Routing target: another stage, or the distinguished terminal marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Stage(StageId),
    Terminal,
}

/// A predicate over the shared state with a declared branch domain, so the
/// table can be validated when it is built rather than when it is walked.
pub struct BranchPredicate {
    name: &'static str,
    domain: &'static [&'static str],
    eval: fn(&TripState) -> &'static str,
}

impl BranchPredicate {
    pub fn new(
        name: &'static str,
        domain: &'static [&'static str],
        eval: fn(&TripState) -> &'static str,
    ) -> Self {
        Self { name, domain, eval }
    }

    /// Branches on the gate's verdict. The gate either wrote a label or the
    /// run already aborted, so an unset label conservatively ends the run.
    pub fn scope() -> Self {
        Self::new("scope", &["travel", "not_travel"], |state| {
            match state.scope {
                Some(ScopeLabel::Travel) => "travel",
                _ => "not_travel",
            }
        })
    }
}

/// One outgoing transition of a stage.
pub enum Transition {
    Fixed(Target),
    Conditional {
        predicate: BranchPredicate,
        branches: HashMap<&'static str, Target>,
    },
}

/// Static map of every legal transition in the pipeline.
pub struct RoutingTable {
    edges: HashMap<StageId, Transition>,
}

impl RoutingTable {
    /// Build a table, failing fast when a conditional edge's declared branch
    /// domain is not fully mapped. That is a configuration bug, not a
    /// runtime condition.
    pub fn new(edges: Vec<(StageId, Transition)>) -> Result<Self> {
        for (stage, transition) in &edges {
            if let Transition::Conditional { predicate, branches } = transition {
                for branch in predicate.domain {
                    if !branches.contains_key(branch) {
                        return Err(WayfarerError::RoutingTable(format!(
                            "stage '{}': branch '{}' of predicate '{}' has no target",
                            stage, branch, predicate.name
                        )));
                    }
                }
            }
        }
        Ok(Self {
            edges: edges.into_iter().collect(),
        })
    }

    /// The full pipeline: gate branches into the linear chain or terminal,
    /// the chain runs to the summary, the summary's static edge is terminal
    /// (regeneration overrides it dynamically).
    pub fn standard() -> Result<Self> {
        let mut gate_branches = HashMap::new();
        gate_branches.insert("travel", Target::Stage(StageId::QueryAnalyzer));
        gate_branches.insert("not_travel", Target::Terminal);

        Self::new(vec![
            (
                StageId::ScopeGate,
                Transition::Conditional {
                    predicate: BranchPredicate::scope(),
                    branches: gate_branches,
                },
            ),
            (
                StageId::QueryAnalyzer,
                Transition::Fixed(Target::Stage(StageId::Lodging)),
            ),
            (
                StageId::Lodging,
                Transition::Fixed(Target::Stage(StageId::Weather)),
            ),
            (
                StageId::Weather,
                Transition::Fixed(Target::Stage(StageId::Attractions)),
            ),
            (
                StageId::Attractions,
                Transition::Fixed(Target::Stage(StageId::Budget)),
            ),
            (
                StageId::Budget,
                Transition::Fixed(Target::Stage(StageId::Itinerary)),
            ),
            (
                StageId::Itinerary,
                Transition::Fixed(Target::Stage(StageId::Summary)),
            ),
            (StageId::Summary, Transition::Fixed(Target::Terminal)),
        ])
    }

    /// Resolve the next target for a stage that asked to follow the table.
    pub fn next(&self, from: StageId, state: &TripState) -> Result<Target> {
        match self.edges.get(&from) {
            None => Err(WayfarerError::RoutingTable(format!(
                "stage '{}' has no outgoing transition",
                from
            ))),
            Some(Transition::Fixed(target)) => Ok(*target),
            Some(Transition::Conditional { predicate, branches }) => {
                let branch = (predicate.eval)(state);
                branches.get(branch).copied().ok_or_else(|| {
                    WayfarerError::RoutingTable(format!(
                        "stage '{}': predicate '{}' produced unmapped branch '{}'",
                        from, predicate.name, branch
                    ))
                })
            }
        }
    }
}
