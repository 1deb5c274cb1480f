use std::sync::Arc;

use engine_logging::{engine_debug, engine_error, engine_trace};
use preview_core::{
    update, DiscardReason, Effect, Msg, PreviewResult, PreviewState, PreviewViewModel, RunToken,
    SourceText,
};
use tokio::time::Instant;

use crate::{Debouncer, EngineError, TransformChain};

/// Callback invoked with every accepted result, in run start order.
pub type Observer = Box<dyn FnMut(RunToken, &PreviewResult) + Send>;

/// A started run: the token it was allocated and the snapshot it must use.
#[derive(Debug, Clone)]
pub(crate) struct RunTicket {
    pub(crate) token: RunToken,
    pub(crate) source: SourceText,
}

impl RunTicket {
    pub(crate) fn execute(&self, chain: &TransformChain) -> PreviewResult {
        let _scope = engine_logging::enter_run(self.token.get());
        let started = std::time::Instant::now();
        let result = chain.execute(&self.source);
        match &result {
            PreviewResult::Rendered { text } => engine_debug!(
                "rendered {} bytes in {:?}",
                text.len(),
                started.elapsed()
            ),
            PreviewResult::Failed {
                stage_index,
                stage_name,
                ..
            } => engine_debug!(
                "stage {} ({}) faulted after {:?}",
                stage_index,
                stage_name,
                started.elapsed()
            ),
        }
        result
    }
}

/// Owns the latest snapshot and decides when the transform chain runs.
///
/// Single-threaded: `submit` records the snapshot and arms the debouncer,
/// `poll` runs the chain once the trailing edge has passed. Results are
/// published only for the most recently started run.
pub struct PreviewEngine {
    state: PreviewState,
    chain: Arc<TransformChain>,
    debouncer: Debouncer,
    observers: Vec<Observer>,
}

impl PreviewEngine {
    pub fn new(chain: TransformChain, debouncer: Debouncer) -> Self {
        Self {
            state: PreviewState::new(),
            chain: Arc::new(chain),
            debouncer,
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: impl FnMut(RunToken, &PreviewResult) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn submit(&mut self, source: impl Into<SourceText>) {
        self.submit_at(source, Instant::now());
    }

    pub fn submit_at(&mut self, source: impl Into<SourceText>, now: Instant) {
        let source = source.into();
        engine_trace!("source changed: {} bytes", source.len());
        for effect in self.dispatch(Msg::SourceChanged(source)) {
            if effect == Effect::ScheduleRun {
                self.debouncer.notify(now);
            }
        }
    }

    /// Records `source` and runs immediately, bypassing the debounce window.
    pub fn seed(&mut self, source: impl Into<SourceText>) -> Result<bool, EngineError> {
        match self.begin_seed(source) {
            Some(ticket) => self.finish(ticket),
            None => Ok(false),
        }
    }

    /// Runs the chain if the trailing edge is due at `now`.
    ///
    /// Returns whether a result was published.
    pub fn poll(&mut self, now: Instant) -> Result<bool, EngineError> {
        if self.debouncer.fire_if_due(now) {
            self.run()
        } else {
            Ok(false)
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn current_result(&self) -> Option<&PreviewResult> {
        self.state.current_result()
    }

    pub fn latest_source(&self) -> Option<&SourceText> {
        self.state.latest_source()
    }

    pub fn view(&self) -> PreviewViewModel {
        self.state.view()
    }

    pub fn chain(&self) -> &TransformChain {
        &self.chain
    }

    /// Cancels the pending trailing edge, if any.
    pub fn shutdown(&mut self) {
        if self.debouncer.is_pending() {
            engine_debug!("cancelling pending debounced run");
        }
        self.debouncer.cancel();
    }

    pub(crate) fn shared_chain(&self) -> Arc<TransformChain> {
        Arc::clone(&self.chain)
    }

    /// Disarms the trailing edge if it is due at `now`, without starting a run.
    pub(crate) fn fire_due(&mut self, now: Instant) -> bool {
        self.debouncer.fire_if_due(now)
    }

    /// Records a seed snapshot and drops any pending trailing edge.
    pub(crate) fn record_seed(&mut self, source: impl Into<SourceText>) {
        self.dispatch(Msg::SourceChanged(source.into()));
        self.debouncer.cancel();
    }

    pub(crate) fn begin_seed(&mut self, source: impl Into<SourceText>) -> Option<RunTicket> {
        self.record_seed(source);
        self.begin_run()
    }

    /// Whether `token` has been overtaken by a later started run.
    pub(crate) fn is_stale(&self, token: RunToken) -> bool {
        self.state.last_started().is_some_and(|latest| token < latest)
    }

    pub(crate) fn begin_run(&mut self) -> Option<RunTicket> {
        let ticket = self
            .dispatch(Msg::RunRequested)
            .into_iter()
            .find_map(|effect| match effect {
                Effect::StartRun { token, source } => Some(RunTicket { token, source }),
                _ => None,
            });
        if let Some(ticket) = &ticket {
            engine_debug!(
                "starting run {} over {} bytes",
                ticket.token,
                ticket.source.len()
            );
        }
        ticket
    }

    /// Reconciles a finished run; returns whether it was published.
    pub(crate) fn complete_run(
        &mut self,
        token: RunToken,
        result: PreviewResult,
    ) -> Result<bool, EngineError> {
        let mut published = false;
        for effect in self.dispatch(Msg::RunFinished { token, result }) {
            match effect {
                Effect::Publish { token, result } => {
                    for observer in &mut self.observers {
                        observer(token, &result);
                    }
                    published = true;
                }
                Effect::Discard {
                    token,
                    reason: DiscardReason::Stale { current },
                } => {
                    engine_debug!("discarding stale run {} (current {})", token, current);
                }
                Effect::Discard {
                    token,
                    reason: DiscardReason::UnknownRun,
                } => {
                    engine_error!("run {} completed but is not outstanding", token);
                    if cfg!(debug_assertions) {
                        panic!("run {token} completed but is not outstanding");
                    }
                    return Err(EngineError::InvariantViolation {
                        token,
                        detail: "completion for a run that is not outstanding".to_string(),
                    });
                }
                Effect::ScheduleRun | Effect::StartRun { .. } => {}
            }
        }
        Ok(published)
    }

    /// Starts a run over the latest snapshot and completes it inline.
    pub(crate) fn run(&mut self) -> Result<bool, EngineError> {
        match self.begin_run() {
            Some(ticket) => self.finish(ticket),
            None => Ok(false),
        }
    }

    fn finish(&mut self, ticket: RunTicket) -> Result<bool, EngineError> {
        let result = ticket.execute(&self.chain);
        self.complete_run(ticket.token, result)
    }

    fn dispatch(&mut self, msg: Msg) -> Vec<Effect> {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        effects
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use preview_core::PreviewResult;
    use tokio::time::Instant;

    use super::PreviewEngine;
    use crate::{Debouncer, EngineError, FnStage, StageFault, TransformChain};

    fn upper_chain() -> TransformChain {
        TransformChain::new().with_stage(FnStage::new("upper", |s: &str| {
            if s == "bad" {
                Err(StageFault::new("err at stage 0"))
            } else {
                Ok(s.to_uppercase())
            }
        }))
    }

    fn recording(engine: &mut PreviewEngine) -> Arc<Mutex<Vec<PreviewResult>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        engine.subscribe(move |_, result| sink.lock().unwrap().push(result.clone()));
        seen
    }

    #[test]
    fn run_twice_without_edits_is_idempotent() {
        let mut engine = PreviewEngine::new(upper_chain(), Debouncer::default());
        engine.submit_at("same", Instant::now());

        assert!(engine.run().unwrap());
        let first = engine.current_result().cloned();
        assert!(engine.run().unwrap());
        let second = engine.current_result().cloned();

        assert_eq!(first, Some(PreviewResult::rendered("SAME")));
        assert_eq!(first, second);
    }

    #[test]
    fn run_without_source_publishes_nothing() {
        let mut engine = PreviewEngine::new(upper_chain(), Debouncer::default());
        assert!(!engine.run().unwrap());
        assert_eq!(engine.current_result(), None);
    }

    #[test]
    fn slow_older_run_never_overwrites_newer_one() {
        let mut engine = PreviewEngine::new(upper_chain(), Debouncer::default());
        let seen = recording(&mut engine);
        let chain = engine.shared_chain();

        engine.submit_at("s1", Instant::now());
        let run_a = engine.begin_run().unwrap();
        engine.submit_at("s2", Instant::now());
        let run_b = engine.begin_run().unwrap();

        let result_b = run_b.execute(&chain);
        assert!(engine.complete_run(run_b.token, result_b).unwrap());
        let result_a = run_a.execute(&chain);
        assert!(!engine.complete_run(run_a.token, result_a).unwrap());

        assert_eq!(engine.current_result(), Some(&PreviewResult::rendered("S2")));
        assert_eq!(*seen.lock().unwrap(), vec![PreviewResult::rendered("S2")]);
    }

    #[test]
    fn started_run_overtakes_older_tokens() {
        let mut engine = PreviewEngine::new(upper_chain(), Debouncer::default());
        engine.submit_at("s1", Instant::now());
        let run_a = engine.begin_run().unwrap();
        assert!(!engine.is_stale(run_a.token));

        engine.submit_at("s2", Instant::now());
        let run_b = engine.begin_run().unwrap();

        assert!(engine.is_stale(run_a.token));
        assert!(!engine.is_stale(run_b.token));
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "is not outstanding"))]
    fn invariant_violation_keeps_previous_result() {
        let mut engine = PreviewEngine::new(upper_chain(), Debouncer::default());
        let seen = recording(&mut engine);
        engine.submit_at("ok", Instant::now());
        let ticket = engine.begin_run().unwrap();
        let result = ticket.execute(engine.chain());
        engine.complete_run(ticket.token, result.clone()).unwrap();

        let err = engine
            .complete_run(ticket.token, PreviewResult::rendered("malformed"))
            .unwrap_err();

        assert!(matches!(err, EngineError::InvariantViolation { .. }));
        assert_eq!(engine.current_result(), Some(&result));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn seed_runs_immediately_and_cancels_pending_edge() {
        let mut engine = PreviewEngine::new(upper_chain(), Debouncer::default());
        let t0 = Instant::now();
        engine.submit_at("typed", t0);
        assert!(engine.next_deadline().is_some());

        assert!(engine.seed("sample").unwrap());

        assert_eq!(engine.current_result(), Some(&PreviewResult::rendered("SAMPLE")));
        assert_eq!(engine.next_deadline(), None);
    }
}
