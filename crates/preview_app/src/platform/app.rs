use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use engine_logging::{engine_error, engine_info, engine_warn};
use preview_engine::{chain_from_names, EngineEvent, EngineHandle, SurfaceBinding};

use super::buffer::{parse_line, EditBuffer, EditCommand};
use super::config::AppConfig;
use super::terminal::{TerminalError, TerminalOutput};

const TICK: Duration = Duration::from_millis(25);
/// Extra wait on end of input so the final trailing-edge run can land.
const FLUSH_GRACE: Duration = Duration::from_millis(500);

pub const SAMPLE: &str = r#"// Start typing and see the changes!
Preview(
    greeting: "Hello, 世界",
    debounce_ms: 100,
    stages: ["ron-to-json", "json-pretty"],
)"#;

pub fn run_app(config: AppConfig) -> anyhow::Result<()> {
    let chain = chain_from_names(&config.engine.stages)?;

    let mut engine_config = config.engine.clone();
    let seed = engine_config
        .seed
        .take()
        .or_else(|| config.seed_sample.then(|| SAMPLE.to_string()));
    let handle = EngineHandle::spawn(chain, &engine_config)?;

    let mut buffer = EditBuffer::default();
    if let Some(seed) = seed {
        buffer = EditBuffer::from_text(&seed);
        handle.seed(seed);
    }

    let mut binding = SurfaceBinding::new(
        TerminalOutput,
        TerminalError,
        config.engine.retention,
    );
    print_banner(&config);

    let input_rx = spawn_stdin_reader();
    loop {
        match input_rx.recv_timeout(TICK) {
            Ok(line) => {
                if !handle_line(&line, &mut buffer, &handle) {
                    break;
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                engine_info!("End of input; flushing pending preview");
                while let Some(event) =
                    handle.recv_timeout(engine_config.debounce_interval() + FLUSH_GRACE)
                {
                    render_event(&mut binding, event);
                }
                break;
            }
        }
        while let Some(event) = handle.try_recv() {
            render_event(&mut binding, event);
        }
    }

    handle.shutdown();
    Ok(())
}

/// Returns false when the user asked to quit.
fn handle_line(line: &str, buffer: &mut EditBuffer, handle: &EngineHandle) -> bool {
    let command = parse_line(line);
    match &command {
        EditCommand::Quit => return false,
        EditCommand::Show => {
            println!("{}\n({} lines)", buffer.text(), buffer.line_count());
            return true;
        }
        EditCommand::Unknown(raw) => {
            eprintln!("unknown command: {raw} (try :pop, :clear, :load <path>, :show, :quit)");
            return true;
        }
        _ => {}
    }
    match buffer.apply(&command) {
        Ok(Some(text)) => handle.submit(text),
        Ok(None) => {}
        Err(err) => {
            engine_warn!("Edit {:?} failed: {}", command, err);
            eprintln!("edit failed: {err}");
        }
    }
    true
}

fn render_event(binding: &mut SurfaceBinding<TerminalOutput, TerminalError>, event: EngineEvent) {
    match event {
        EngineEvent::Published { result, .. } => binding.apply(&result),
        EngineEvent::Faulted { token, message } => {
            // Engine bugs are for developers; the error pane is reserved for stage faults.
            engine_error!("Run {} aborted by internal fault: {}", token, message);
            eprintln!("internal error in run {token}: {message}");
        }
    }
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn print_banner(config: &AppConfig) {
    eprintln!(
        "preview: stages [{}], debounce {}ms. Type lines to append; :pop :clear :load <path> :show :quit",
        config.engine.stages.join(" → "),
        config.engine.debounce_ms
    );
}
