//! Projection of published results onto the output and error surfaces.
//!
//! The projector remembers what each surface currently shows so that a
//! repeated result produces no commands and the surfaces never flicker.

use serde::{Deserialize, Serialize};

use crate::PreviewResult;

/// What the output surface shows while the latest result is a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputRetention {
    /// Keep the last successfully rendered text (empty if none yet).
    #[default]
    KeepLastRendered,
    /// Blank the output whenever a stage faults.
    ClearOnFailure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCommand {
    SetOutput(String),
    ClearOutput,
    SetError(String),
    ClearError,
}

#[derive(Debug, Clone, Default)]
pub struct SurfaceProjector {
    retention: OutputRetention,
    output: Option<String>,
    error: Option<String>,
}

impl SurfaceProjector {
    pub fn new(retention: OutputRetention) -> Self {
        Self {
            retention,
            output: None,
            error: None,
        }
    }

    pub fn retention(&self) -> OutputRetention {
        self.retention
    }

    /// Text the output surface currently shows.
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Text the error surface currently shows.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn project(&mut self, result: &PreviewResult) -> Vec<SurfaceCommand> {
        let mut cmds = Vec::new();
        match result {
            PreviewResult::Rendered { text } => {
                if self.output.as_deref() != Some(text.as_str()) {
                    self.output = Some(text.clone());
                    cmds.push(SurfaceCommand::SetOutput(text.clone()));
                }
                if self.error.take().is_some() {
                    cmds.push(SurfaceCommand::ClearError);
                }
            }
            PreviewResult::Failed { message, .. } => {
                if self.retention == OutputRetention::ClearOnFailure
                    && self.output.take().is_some()
                {
                    cmds.push(SurfaceCommand::ClearOutput);
                }
                if self.error.as_deref() != Some(message.as_str()) {
                    self.error = Some(message.clone());
                    cmds.push(SurfaceCommand::SetError(message.clone()));
                }
            }
        }
        cmds
    }
}
