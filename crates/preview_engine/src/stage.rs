use std::fmt;
use std::sync::Arc;

use engine_logging::engine_trace;
use preview_core::{PreviewResult, SourceText};
use thiserror::Error;

/// Fault raised by a stage when its input is invalid for that stage.
///
/// Displays as the bare message so it can be shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StageFault {
    pub message: String,
}

impl StageFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One fallible, deterministic step from source text towards rendered text.
pub trait TransformStage: Send + Sync {
    fn name(&self) -> &str;
    fn apply(&self, input: &str) -> Result<String, StageFault>;
}

/// Adapts a named closure into a [`TransformStage`].
pub struct FnStage<F> {
    name: String,
    func: F,
}

impl<F> FnStage<F>
where
    F: Fn(&str) -> Result<String, StageFault> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> TransformStage for FnStage<F>
where
    F: Fn(&str) -> Result<String, StageFault> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, input: &str) -> Result<String, StageFault> {
        (self.func)(input)
    }
}

/// Ordered list of stages; position in the list is a stage's identity.
#[derive(Clone, Default)]
pub struct TransformChain {
    stages: Vec<Arc<dyn TransformStage>>,
}

impl TransformChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage(mut self, stage: impl TransformStage + 'static) -> Self {
        self.push(stage);
        self
    }

    pub fn push(&mut self, stage: impl TransformStage + 'static) {
        self.stages.push(Arc::new(stage));
    }

    /// Inserts `stage` before the stage currently at `index`.
    pub fn insert(&mut self, index: usize, stage: impl TransformStage + 'static) {
        self.stages.insert(index, Arc::new(stage));
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Runs every stage in order from stage 0, stopping at the first fault.
    pub fn execute(&self, source: &SourceText) -> PreviewResult {
        let mut current = source.as_str().to_owned();
        for (index, stage) in self.stages.iter().enumerate() {
            match stage.apply(&current) {
                Ok(next) => {
                    engine_trace!(
                        "stage {} ({}) produced {} bytes",
                        index,
                        stage.name(),
                        next.len()
                    );
                    current = next;
                }
                Err(fault) => {
                    return PreviewResult::failed(fault.message, index, stage.name());
                }
            }
        }
        PreviewResult::rendered(current)
    }
}

impl fmt::Debug for TransformChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformChain")
            .field("stages", &self.stage_names())
            .finish()
    }
}
