use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use wayfarer_core::config::EngineConfig;
use wayfarer_core::error::{AdapterFailure, Result, WayfarerError};
use wayfarer_core::state::{RunId, StateDelta, TripState};
use wayfarer_core::trace::RunTrace;

use crate::routing::{RoutingTable, Target};
use crate::stage::{RouteHint, Stage, StageId};

/// Everything a finished run hands back: the final record plus the ordered
/// trace of stage invocations.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: RunId,
    pub state: TripState,
    pub trace: RunTrace,
}

/// The run loop.
///
/// Owns the shared state record for the duration of a run; stages only ever
/// see `&TripState` and return deltas. Merging a delta and resolving the
/// next stage are the only two things that happen between invocations, so a
/// cancellation or a fatal failure always lands on a consistent record.
pub struct Executor {
    stages: HashMap<StageId, Arc<dyn Stage>>,
    routing: RoutingTable,
    config: EngineConfig,
}

impl Executor {
    pub fn new(stages: Vec<Arc<dyn Stage>>, routing: RoutingTable, config: EngineConfig) -> Self {
        let stages = stages.into_iter().map(|s| (s.id(), s)).collect();
        Self {
            stages,
            routing,
            config,
        }
    }

    pub async fn run(
        &self,
        run_id: RunId,
        initial_state: TripState,
        entry: StageId,
        cancel: CancellationToken,
    ) -> Result<RunReport> {
        let mut state = initial_state;
        let mut trace = RunTrace::default();
        let mut visits: HashMap<StageId, u32> = HashMap::new();
        let mut current = entry;

        loop {
            // Cancellation lands between stages only, never mid-stage.
            if cancel.is_cancelled() {
                info!(run_id = %run_id, stage = %current, "run cancelled");
                return Err(WayfarerError::Cancelled);
            }

            let seen = visits.entry(current).or_insert(0);
            *seen += 1;
            // First visit is free; the bound counts re-entries.
            if *seen > self.config.cycle_limit + 1 {
                return Err(WayfarerError::CycleLimitExceeded {
                    stage: current.to_string(),
                    limit: self.config.cycle_limit,
                });
            }

            let stage = self.stages.get(&current).ok_or_else(|| {
                WayfarerError::RoutingTable(format!("no stage registered for '{}'", current))
            })?;

            info!(run_id = %run_id, stage = %current, "executing stage");
            let budget = Duration::from_secs(self.config.stage_timeout_secs);
            let output = match tokio::time::timeout(budget, stage.execute(&state)).await {
                Ok(result) => result?,
                Err(_) => match stage.on_timeout() {
                    Some(fallback) => {
                        warn!(
                            stage = %current,
                            timeout_secs = self.config.stage_timeout_secs,
                            "stage timed out, using its fallback"
                        );
                        fallback
                    }
                    None => {
                        return Err(AdapterFailure::timeout(
                            current.as_str(),
                            format!("stage timed out after {}s", self.config.stage_timeout_secs),
                        )
                        .into())
                    }
                },
            };

            trace.record(current.as_str(), output.outcome.clone());
            Self::merge(&mut state, output.delta);

            let target = match output.route {
                RouteHint::Terminal => Target::Terminal,
                RouteHint::Goto(next) => Target::Stage(next),
                RouteHint::Next => self.routing.next(current, &state)?,
            };
            match target {
                Target::Terminal => {
                    info!(run_id = %run_id, stage = %current, "run reached terminal");
                    return Ok(RunReport {
                        run_id,
                        state,
                        trace,
                    });
                }
                Target::Stage(next) => {
                    debug!(from = %current, to = %next, "advancing");
                    current = next;
                }
            }
        }
    }

    /// The single mutation path for the shared state record.
    fn merge(state: &mut TripState, delta: StateDelta) {
        if !delta.messages.is_empty() {
            state.messages.extend(delta.messages);
        }
        if let Some(write) = delta.write {
            debug!(field = write.field_name(), "merging stage delta");
            state.apply(write);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;
    use wayfarer_core::state::{ChatMessage, FieldWrite, ScopeLabel};
    use wayfarer_core::trace::StageOutcome;

    use crate::stage::StageOutput;

    /// Minimal stage for executor-level tests.
    struct FixedStage {
        id: StageId,
        route: RouteHint,
        write: Option<FieldWrite>,
        delay: Option<Duration>,
        timeout_fallback: bool,
    }

    impl FixedStage {
        fn new(id: StageId, route: RouteHint) -> Self {
            Self {
                id,
                route,
                write: None,
                delay: None,
                timeout_fallback: false,
            }
        }

        fn writing(mut self, write: FieldWrite) -> Self {
            self.write = Some(write);
            self
        }

        fn slow(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        fn recoverable(mut self) -> Self {
            self.timeout_fallback = true;
            self
        }
    }

    impl Stage for FixedStage {
        fn id(&self) -> StageId {
            self.id
        }

        fn execute<'a>(&'a self, _state: &'a TripState) -> BoxFuture<'a, Result<StageOutput>> {
            Box::pin(async move {
                if let Some(delay) = self.delay {
                    tokio::time::sleep(delay).await;
                }
                let mut delta = StateDelta::none();
                delta.messages.push(ChatMessage::assistant(self.id.as_str()));
                delta.write = self.write.clone();
                Ok(StageOutput::completed(delta).with_route(self.route))
            })
        }

        fn on_timeout(&self) -> Option<StageOutput> {
            if self.timeout_fallback {
                Some(StageOutput::recovered(
                    StateDelta::none(),
                    AdapterFailure::timeout(self.id.as_str(), "stage timed out"),
                ))
            } else {
                None
            }
        }
    }

    fn tight_config() -> EngineConfig {
        EngineConfig {
            stage_timeout_secs: 1,
            cycle_limit: 3,
        }
    }

    #[tokio::test]
    async fn follows_goto_and_terminal_hints() {
        let stages: Vec<Arc<dyn Stage>> = vec![
            Arc::new(
                FixedStage::new(StageId::ScopeGate, RouteHint::Goto(StageId::Summary))
                    .writing(FieldWrite::Scope(ScopeLabel::Travel)),
            ),
            Arc::new(FixedStage::new(StageId::Summary, RouteHint::Terminal)),
        ];
        let routing = RoutingTable::standard().unwrap();
        let executor = Executor::new(stages, routing, tight_config());
        let report = executor
            .run(
                RunId::new(),
                TripState::from_request("x"),
                StageId::ScopeGate,
                CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(report.trace.entries().len(), 2);
        assert_eq!(report.state.scope, Some(ScopeLabel::Travel));
        // each stage appended one assistant message
        assert_eq!(report.state.messages.len(), 3);
    }

    #[tokio::test]
    async fn cycle_limit_caps_reentries() {
        // summary loops back to itself forever via Goto
        let stages: Vec<Arc<dyn Stage>> = vec![Arc::new(FixedStage::new(
            StageId::Summary,
            RouteHint::Goto(StageId::Summary),
        ))];
        let routing = RoutingTable::standard().unwrap();
        let executor = Executor::new(stages, routing, tight_config());
        let err = executor
            .run(
                RunId::new(),
                TripState::from_request("x"),
                StageId::Summary,
                CancellationToken::new(),
            )
            .await
            .unwrap_err();
        match err {
            WayfarerError::CycleLimitExceeded { stage, limit } => {
                assert_eq!(stage, "summary");
                assert_eq!(limit, 3);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn cancellation_stops_before_next_stage() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let stages: Vec<Arc<dyn Stage>> =
            vec![Arc::new(FixedStage::new(StageId::Summary, RouteHint::Terminal))];
        let routing = RoutingTable::standard().unwrap();
        let executor = Executor::new(stages, routing, tight_config());
        let err = executor
            .run(
                RunId::new(),
                TripState::from_request("x"),
                StageId::Summary,
                cancel,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, WayfarerError::Cancelled));
    }

    #[tokio::test]
    async fn timeout_without_fallback_is_fatal() {
        let stages: Vec<Arc<dyn Stage>> = vec![Arc::new(
            FixedStage::new(StageId::ScopeGate, RouteHint::Terminal)
                .slow(Duration::from_secs(5)),
        )];
        let routing = RoutingTable::standard().unwrap();
        let executor = Executor::new(stages, routing, tight_config());
        let err = executor
            .run(
                RunId::new(),
                TripState::from_request("x"),
                StageId::ScopeGate,
                CancellationToken::new(),
            )
            .await
            .unwrap_err();
        match err {
            WayfarerError::Adapter(f) => assert!(f.is_transient()),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn timeout_with_fallback_recovers() {
        // recoverable stage times out, its fallback routes via the table:
        // summary's static edge is terminal
        let stages: Vec<Arc<dyn Stage>> = vec![Arc::new(
            FixedStage::new(StageId::Summary, RouteHint::Terminal)
                .slow(Duration::from_secs(5))
                .recoverable(),
        )];
        let routing = RoutingTable::standard().unwrap();
        let executor = Executor::new(stages, routing, tight_config());
        let report = executor
            .run(
                RunId::new(),
                TripState::from_request("x"),
                StageId::Summary,
                CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(report.trace.entries().len(), 1);
        assert!(matches!(
            report.trace.entries()[0].outcome,
            StageOutcome::Recovered(_)
        ));
    }

    #[tokio::test]
    async fn unregistered_stage_is_a_routing_error() {
        let routing = RoutingTable::standard().unwrap();
        let executor = Executor::new(Vec::new(), routing, tight_config());
        let err = executor
            .run(
                RunId::new(),
                TripState::from_request("x"),
                StageId::ScopeGate,
                CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, WayfarerError::RoutingTable(_)));
    }
}
