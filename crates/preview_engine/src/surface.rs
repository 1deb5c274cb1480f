//! Binding between published results and the host's text surfaces.

use std::sync::{Arc, Mutex, PoisonError};

use preview_core::{OutputRetention, PreviewResult, SourceText, SurfaceCommand, SurfaceProjector};

use crate::PreviewEngine;

/// Read-only surface showing the rendered text.
pub trait OutputSink: Send {
    fn set_text(&mut self, text: &str);
}

/// Surface showing the failing stage's message.
pub trait ErrorSink: Send {
    fn set_text(&mut self, text: &str);
    fn clear(&mut self);
}

/// Projects each published result onto an output and an error sink.
pub struct SurfaceBinding<O, E> {
    projector: SurfaceProjector,
    output: O,
    error: E,
}

impl<O: OutputSink, E: ErrorSink> SurfaceBinding<O, E> {
    pub fn new(output: O, error: E, retention: OutputRetention) -> Self {
        Self {
            projector: SurfaceProjector::new(retention),
            output,
            error,
        }
    }

    pub fn apply(&mut self, result: &PreviewResult) {
        for cmd in self.projector.project(result) {
            match cmd {
                SurfaceCommand::SetOutput(text) => self.output.set_text(&text),
                SurfaceCommand::ClearOutput => self.output.set_text(""),
                SurfaceCommand::SetError(message) => self.error.set_text(&message),
                SurfaceCommand::ClearError => self.error.clear(),
            }
        }
    }

    pub fn projector(&self) -> &SurfaceProjector {
        &self.projector
    }

    /// Registers the binding as an observer so every published result
    /// reaches the sinks.
    pub fn attach(mut self, engine: &mut PreviewEngine)
    where
        O: 'static,
        E: 'static,
    {
        engine.subscribe(move |_, result| self.apply(result));
    }
}

/// Forwards an editable-surface change notification (full text) to the engine.
pub fn forward_edit(engine: &mut PreviewEngine, text: impl Into<SourceText>) {
    engine.submit(text);
}

/// In-memory surface whose clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    text: Arc<Mutex<String>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        self.text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, text: &str) {
        let mut guard = self.text.lock().unwrap_or_else(PoisonError::into_inner);
        guard.clear();
        guard.push_str(text);
    }
}

impl OutputSink for MemorySurface {
    fn set_text(&mut self, text: &str) {
        self.replace(text);
    }
}

impl ErrorSink for MemorySurface {
    fn set_text(&mut self, text: &str) {
        self.replace(text);
    }

    fn clear(&mut self) {
        self.replace("");
    }
}
