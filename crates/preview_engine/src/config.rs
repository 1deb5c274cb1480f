use std::time::Duration;

use preview_core::OutputRetention;
use serde::{Deserialize, Serialize};

use crate::debounce::DEFAULT_INTERVAL;
use crate::stages::default_stage_names;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Quiet period after the last edit before the chain runs.
    pub debounce_ms: u64,
    /// Built-in stage names, in execution order.
    pub stages: Vec<String>,
    pub retention: OutputRetention,
    /// Text rendered once on startup, before any edit.
    pub seed: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_INTERVAL.as_millis() as u64,
            stages: default_stage_names(),
            retention: OutputRetention::default(),
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn debounce_interval(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
