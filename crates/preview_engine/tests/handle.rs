use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;
use preview_core::PreviewResult;
use preview_engine::{EngineConfig, EngineEvent, EngineHandle, FnStage, TransformChain};

const WAIT: Duration = Duration::from_secs(5);

fn config(debounce_ms: u64) -> EngineConfig {
    EngineConfig {
        debounce_ms,
        ..EngineConfig::default()
    }
}

fn upper() -> TransformChain {
    TransformChain::new().with_stage(FnStage::new("upper", |s: &str| Ok(s.to_uppercase())))
}

fn published(event: Option<EngineEvent>) -> PreviewResult {
    match event {
        Some(EngineEvent::Published { result, .. }) => result,
        other => panic!("expected a published result, got {other:?}"),
    }
}

#[test]
fn burst_publishes_only_final_text() {
    let handle = EngineHandle::spawn(upper(), &config(30)).unwrap();

    handle.submit("a");
    handle.submit("ab");
    handle.submit("abc");

    assert_eq!(
        published(handle.recv_timeout(WAIT)),
        PreviewResult::rendered("ABC")
    );
    assert_eq!(handle.recv_timeout(Duration::from_millis(200)), None);
}

#[test]
fn configured_seed_renders_without_edits() {
    let cfg = EngineConfig {
        seed: Some("sample".to_string()),
        ..config(1_000)
    };
    let handle = EngineHandle::spawn(upper(), &cfg).unwrap();

    assert_eq!(
        published(handle.recv_timeout(WAIT)),
        PreviewResult::rendered("SAMPLE")
    );
}

#[test]
fn edits_during_slow_run_publish_only_newest_text() {
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let gate = Mutex::new(release_rx);
    let chain = TransformChain::new().with_stage(FnStage::new("slow", move |s: &str| {
        if s == "s1" {
            let _ = gate.lock().unwrap().recv();
        }
        Ok(s.to_uppercase())
    }));
    let handle = EngineHandle::spawn(chain, &config(20)).unwrap();

    handle.submit("s1");
    // Let run 1 start and block inside the stage.
    thread::sleep(Duration::from_millis(150));
    handle.submit("s2");
    // The trailing edge for s2 fires while run 1 is still busy.
    thread::sleep(Duration::from_millis(150));
    release_tx.send(()).unwrap();

    match handle.recv_timeout(WAIT) {
        Some(EngineEvent::Published { token, result }) => {
            assert_eq!(token.get(), 2);
            assert_eq!(result, PreviewResult::rendered("S2"));
        }
        other => panic!("expected run 2 to publish, got {other:?}"),
    }
    assert_eq!(handle.recv_timeout(Duration::from_millis(300)), None);
}

#[test]
fn slow_chain_never_runs_concurrently() {
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let calls = Arc::new(AtomicUsize::new(0));
    let chain = {
        let (active, peak, calls) = (Arc::clone(&active), Arc::clone(&peak), Arc::clone(&calls));
        TransformChain::new().with_stage(FnStage::new("slow", move |s: &str| {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(120));
            active.fetch_sub(1, Ordering::SeqCst);
            Ok(s.to_string())
        }))
    };
    let handle = EngineHandle::spawn(chain, &config(10)).unwrap();

    let mut text = String::new();
    for i in 0..12 {
        text.push_str(&i.to_string());
        handle.submit(text.clone());
        thread::sleep(Duration::from_millis(25));
    }

    let mut last = None;
    while let Some(event) = handle.recv_timeout(Duration::from_secs(1)) {
        last = Some(published(Some(event)));
    }

    assert_eq!(last, Some(PreviewResult::rendered(text)));
    assert_eq!(peak.load(Ordering::SeqCst), 1);
    assert!(calls.load(Ordering::SeqCst) < 12);
}

#[test]
fn fault_in_overtaken_run_is_dropped() {
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let gate = Mutex::new(release_rx);
    let chain = TransformChain::new().with_stage(FnStage::new("fragile", move |s: &str| {
        if s == "panic" {
            let _ = gate.lock().unwrap().recv();
            panic!("stage bug");
        }
        Ok(s.to_uppercase())
    }));
    let handle = EngineHandle::spawn(chain, &config(20)).unwrap();

    handle.submit("panic");
    thread::sleep(Duration::from_millis(150));
    handle.submit("fixed");
    thread::sleep(Duration::from_millis(150));
    release_tx.send(()).unwrap();

    match handle.recv_timeout(WAIT) {
        Some(EngineEvent::Published { token, result }) => {
            assert_eq!(token.get(), 2);
            assert_eq!(result, PreviewResult::rendered("FIXED"));
        }
        other => panic!("expected the newer run to publish, got {other:?}"),
    }
    assert_eq!(handle.recv_timeout(Duration::from_millis(300)), None);
}

#[test]
fn panicking_stage_is_reported_as_engine_fault() {
    let chain = TransformChain::new().with_stage(FnStage::new("fragile", |s: &str| {
        if s == "panic" {
            panic!("stage bug");
        }
        Ok(s.to_string())
    }));
    let handle = EngineHandle::spawn(chain, &config(20)).unwrap();

    handle.seed("fine");
    assert_eq!(
        published(handle.recv_timeout(WAIT)),
        PreviewResult::rendered("fine")
    );

    handle.submit("panic");
    match handle.recv_timeout(WAIT) {
        Some(EngineEvent::Faulted { token, .. }) => assert_eq!(token.get(), 2),
        other => panic!("expected a fault event, got {other:?}"),
    }

    handle.submit("recovered");
    assert_eq!(
        published(handle.recv_timeout(WAIT)),
        PreviewResult::rendered("recovered")
    );
}

#[test]
fn shutdown_cancels_pending_run() {
    let calls = Arc::new(AtomicUsize::new(0));
    let spy = Arc::clone(&calls);
    let chain = TransformChain::new().with_stage(FnStage::new("count", move |s: &str| {
        spy.fetch_add(1, Ordering::SeqCst);
        Ok(s.to_string())
    }));
    let handle = EngineHandle::spawn(chain, &config(100)).unwrap();

    handle.submit("pending");
    handle.shutdown();
    thread::sleep(Duration::from_millis(250));

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
