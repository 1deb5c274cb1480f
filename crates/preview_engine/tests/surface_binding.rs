use std::sync::Once;
use std::time::Duration;

use pretty_assertions::assert_eq;
use preview_core::OutputRetention;
use preview_engine::{
    forward_edit, Debouncer, FnStage, MemorySurface, PreviewEngine, StageFault, SurfaceBinding,
    TransformChain,
};
use tokio::time::Instant;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn upper_or_fail() -> TransformChain {
    TransformChain::new().with_stage(FnStage::new("compile", |s: &str| {
        if s == "bad" {
            Err(StageFault::new("err at stage 0"))
        } else {
            Ok(s.to_uppercase())
        }
    }))
}

struct Harness {
    engine: PreviewEngine,
    output: MemorySurface,
    error: MemorySurface,
    now: Instant,
}

impl Harness {
    fn new(retention: OutputRetention) -> Self {
        init_logging();
        let mut engine = PreviewEngine::new(
            upper_or_fail(),
            Debouncer::new(Duration::from_millis(100)),
        );
        let output = MemorySurface::new();
        let error = MemorySurface::new();
        SurfaceBinding::new(output.clone(), error.clone(), retention).attach(&mut engine);
        Self {
            engine,
            output,
            error,
            now: Instant::now(),
        }
    }

    /// Delivers an edit and lets the debounce window elapse.
    fn type_and_wait(&mut self, text: &str) {
        self.engine.submit_at(text, self.now);
        self.now += Duration::from_millis(100);
        assert!(self.engine.poll(self.now).unwrap());
    }
}

#[test]
fn failure_keeps_last_good_output() {
    let mut h = Harness::new(OutputRetention::KeepLastRendered);

    h.type_and_wait("good");
    assert_eq!(h.output.text(), "GOOD");
    assert_eq!(h.error.text(), "");

    h.type_and_wait("bad");
    assert_eq!(h.output.text(), "GOOD");
    assert_eq!(h.error.text(), "err at stage 0");

    h.type_and_wait("fixed");
    assert_eq!(h.output.text(), "FIXED");
    assert_eq!(h.error.text(), "");
}

#[test]
fn output_stays_empty_until_first_success() {
    let mut h = Harness::new(OutputRetention::KeepLastRendered);

    h.type_and_wait("bad");

    assert_eq!(h.output.text(), "");
    assert_eq!(h.error.text(), "err at stage 0");
}

#[test]
fn clear_on_failure_blanks_output() {
    let mut h = Harness::new(OutputRetention::ClearOnFailure);

    h.type_and_wait("good");
    h.type_and_wait("bad");

    assert_eq!(h.output.text(), "");
    assert_eq!(h.error.text(), "err at stage 0");
}

#[test]
fn seeded_engine_is_never_blank() {
    let mut h = Harness::new(OutputRetention::KeepLastRendered);

    assert!(h.engine.seed("hello").unwrap());

    assert_eq!(h.output.text(), "HELLO");
}

#[test]
fn forwarded_edits_go_through_the_debouncer() {
    let mut h = Harness::new(OutputRetention::KeepLastRendered);

    forward_edit(&mut h.engine, "typed");

    assert!(h.engine.next_deadline().is_some());
    assert_eq!(h.output.text(), "");
    assert_eq!(h.engine.latest_source().map(|s| s.as_str()), Some("typed"));
}
