use std::io;

use preview_core::RunToken;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown transform stage: {0}")]
    UnknownStage(String),
    /// A completion the engine has no record of; indicates an engine bug.
    #[error("engine invariant violated by run {token}: {detail}")]
    InvariantViolation { token: RunToken, detail: String },
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] io::Error),
}
