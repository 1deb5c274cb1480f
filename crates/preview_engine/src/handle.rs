use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info};
use preview_core::{PreviewResult, RunToken};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinError;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::engine::RunTicket;
use crate::{Debouncer, EngineConfig, EngineError, PreviewEngine, TransformChain};

enum EngineCommand {
    Submit(String),
    Seed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The newest started run finished and its result is now current.
    Published {
        token: RunToken,
        result: PreviewResult,
    },
    /// A run was aborted by an engine-internal fault; the previous result stands.
    Faulted { token: RunToken, message: String },
}

type Completion = (RunToken, Result<PreviewResult, JoinError>);

/// Runs a [`PreviewEngine`] on its own thread.
///
/// The engine's fields are owned by that thread alone; callers talk to it
/// through a command mailbox and read published results from an event queue.
/// The chain executes on the blocking pool with at most one run in flight.
/// Trailing edges that land meanwhile collapse into a single rerun over the
/// latest snapshot, started as soon as the in-flight run returns.
pub struct EngineHandle {
    cmd_tx: UnboundedSender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    cancel: CancellationToken,
    worker: Option<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn spawn(chain: TransformChain, config: &EngineConfig) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();
        let cancel = CancellationToken::new();

        engine_info!(
            "preview engine starting: stages={:?} debounce={}ms",
            chain.stage_names(),
            config.debounce_ms
        );
        let mut engine = PreviewEngine::new(chain, Debouncer::new(config.debounce_interval()));
        let publish_tx = event_tx.clone();
        engine.subscribe(move |token, result| {
            let _ = publish_tx.send(EngineEvent::Published {
                token,
                result: result.clone(),
            });
        });

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        let loop_cancel = cancel.clone();
        let worker = thread::Builder::new()
            .name("preview-engine".to_string())
            .spawn(move || {
                runtime.block_on(drive(engine, cmd_rx, event_tx, loop_cancel));
                // Stages still running on the blocking pool are abandoned.
                runtime.shutdown_background();
            })?;

        let handle = Self {
            cmd_tx,
            event_rx,
            cancel,
            worker: Some(worker),
        };
        if let Some(seed) = &config.seed {
            handle.seed(seed.clone());
        }
        Ok(handle)
    }

    /// Delivers the full current text of the editable surface.
    pub fn submit(&self, text: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Submit(text.into()));
    }

    /// Records `text` and runs immediately, without waiting for the debounce.
    pub fn seed(&self, text: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Seed(text.into()));
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Cancels any pending debounced run and joins the engine thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                engine_error!("preview engine thread panicked");
            }
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn drive(
    mut engine: PreviewEngine,
    mut cmd_rx: UnboundedReceiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
    cancel: CancellationToken,
) {
    let (done_tx, mut done_rx) = unbounded_channel::<Completion>();
    let mut runs = RunSlot::new(engine.shared_chain(), done_tx);

    loop {
        let deadline = engine.next_deadline();
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            Some((token, outcome)) = done_rx.recv() => {
                runs.finished();
                // Start the rerun before reconciling so the finished run is
                // already stale when it is compared.
                runs.resume(&mut engine);
                complete(&mut engine, &event_tx, token, outcome);
            }
            () = sleep_until_deadline(deadline) => {
                if engine.fire_due(Instant::now()) {
                    runs.request(&mut engine);
                }
            }
            cmd = cmd_rx.recv() => match cmd {
                Some(EngineCommand::Submit(text)) => engine.submit(text),
                Some(EngineCommand::Seed(text)) => {
                    engine.record_seed(text);
                    runs.request(&mut engine);
                }
                None => break,
            },
        }
    }

    engine.shutdown();
    engine_info!("preview engine stopped");
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Serializes chain executions: one run in flight, at most one rerun queued.
struct RunSlot {
    chain: Arc<TransformChain>,
    done_tx: UnboundedSender<Completion>,
    in_flight: Option<RunToken>,
    rerun_pending: bool,
}

impl RunSlot {
    fn new(chain: Arc<TransformChain>, done_tx: UnboundedSender<Completion>) -> Self {
        Self {
            chain,
            done_tx,
            in_flight: None,
            rerun_pending: false,
        }
    }

    /// Starts a run over the latest snapshot, or queues one if a run is busy.
    fn request(&mut self, engine: &mut PreviewEngine) {
        match self.in_flight {
            Some(busy) => {
                engine_debug!("run {} still in flight; rerun queued", busy);
                self.rerun_pending = true;
            }
            None => {
                if let Some(ticket) = engine.begin_run() {
                    self.start(ticket);
                }
            }
        }
    }

    fn finished(&mut self) {
        self.in_flight = None;
    }

    fn resume(&mut self, engine: &mut PreviewEngine) {
        if std::mem::take(&mut self.rerun_pending) {
            self.request(engine);
        }
    }

    fn start(&mut self, ticket: RunTicket) {
        self.in_flight = Some(ticket.token);
        let chain = Arc::clone(&self.chain);
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let token = ticket.token;
            let outcome = tokio::task::spawn_blocking(move || ticket.execute(&chain)).await;
            let _ = done_tx.send((token, outcome));
        });
    }
}

fn complete(
    engine: &mut PreviewEngine,
    event_tx: &mpsc::Sender<EngineEvent>,
    token: RunToken,
    outcome: Result<PreviewResult, JoinError>,
) {
    let fault = match outcome {
        Ok(result) => match engine.complete_run(token, result) {
            Ok(published) => {
                engine_debug!("run {} completed, published={}", token, published);
                return;
            }
            Err(err) => err.to_string(),
        },
        Err(err) if engine.is_stale(token) => {
            engine_debug!("stale run {} aborted: {}", token, err);
            return;
        }
        Err(err) => {
            engine_error!("run {} aborted: {}", token, err);
            err.to_string()
        }
    };
    let _ = event_tx.send(EngineEvent::Faulted {
        token,
        message: fault,
    });
}
