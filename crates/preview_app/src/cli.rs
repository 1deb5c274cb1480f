use std::path::PathBuf;

use clap::Parser;
use preview_core::OutputRetention;

use crate::platform::config::AppConfig;
use crate::platform::logging::LogDestination;

/// Live transform preview: edit text on stdin, watch the rendered result.
#[derive(Debug, Parser)]
#[command(name = "preview", version)]
pub struct Cli {
    /// RON configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Quiet period after the last edit before re-rendering.
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// Transform stage to run, in order. Repeat to build a chain.
    #[arg(long = "stage", value_name = "NAME")]
    pub stages: Vec<String>,

    /// Start with an empty buffer instead of the sample document.
    #[arg(long)]
    pub no_seed: bool,

    /// Blank the output pane whenever a stage fails.
    #[arg(long)]
    pub clear_on_failure: bool,

    /// Where log output goes.
    #[arg(long, value_enum)]
    pub log: Option<LogDestination>,

    /// Print the built-in stage names and exit.
    #[arg(long)]
    pub list_stages: bool,
}

impl Cli {
    /// Layers command-line overrides on top of the file configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(ms) = self.debounce_ms {
            config.engine.debounce_ms = ms;
        }
        if !self.stages.is_empty() {
            config.engine.stages = self.stages.clone();
        }
        if self.no_seed {
            config.seed_sample = false;
            config.engine.seed = None;
        }
        if self.clear_on_failure {
            config.engine.retention = OutputRetention::ClearOnFailure;
        }
        if let Some(log) = self.log {
            config.log = log;
        }
    }
}
